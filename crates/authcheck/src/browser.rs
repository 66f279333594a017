//! Chromium-backed sessions over the Chrome DevTools Protocol.
//!
//! Every [`Selector`] is resolved by evaluating the script produced by
//! [`Selector::to_query`] in the page. Actions first tag the target with a
//! one-off `data-authcheck-id` marker ([`Selector::to_mark_query`]) and
//! then drive that exact element through CDP, so clicks and typing are
//! real input events rather than synthetic DOM calls.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page as CdpPage;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::RunConfig;
use crate::driver::{ElementHandle, Session, SessionFactory};
use crate::locator::Selector;
use crate::result::{AuthCheckError, AuthCheckResult};

const MARKER_ATTR: &str = "data-authcheck-id";

/// Launch options for Chromium
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Run without a window
    pub headless: bool,
    /// Disable the sandbox (needed in most containers)
    pub sandbox: bool,
    /// Chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: false,
            chromium_path: None,
        }
    }
}

impl From<&RunConfig> for LaunchOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            headless: config.headless,
            chromium_path: config.chromium_path.clone(),
            ..Self::default()
        }
    }
}

/// One Chromium process; every [`open`](SessionFactory::open) creates a new page
#[derive(Debug)]
pub struct ChromiumFactory {
    inner: Arc<Mutex<CdpBrowser>>,
    handle: JoinHandle<()>,
}

impl ChromiumFactory {
    /// Launch Chromium
    ///
    /// # Errors
    ///
    /// Returns error if the browser cannot be launched
    pub async fn launch(options: LaunchOptions) -> AuthCheckResult<Self> {
        let mut builder = CdpConfig::builder();
        if !options.headless {
            builder = builder.with_head();
        }
        if !options.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = options.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder
            .build()
            .map_err(|message| AuthCheckError::BrowserLaunchError { message })?;

        let (browser, handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
            AuthCheckError::BrowserLaunchError {
                message: e.to_string(),
            }
        })?;

        let handle = spawn_handler(handler);
        tracing::info!(headless = options.headless, "chromium launched");

        Ok(Self {
            inner: Arc::new(Mutex::new(browser)),
            handle,
        })
    }

    /// Close the browser and every page it owns
    ///
    /// The CDP handler task is stopped even when closing fails.
    pub async fn close(&self) -> AuthCheckResult<()> {
        let mut browser = self.inner.lock().await;
        let closed = browser.close().await.map(|_| ()).map_err(session_err);
        self.handle.abort();
        closed
    }
}

/// Drive CDP events until the connection ends or reports an error
fn spawn_handler<H, E>(mut handler: H) -> JoinHandle<()>
where
    H: Stream<Item = Result<(), E>> + Send + Unpin + 'static,
    E: std::fmt::Display + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::debug!(error = %e, "cdp handler stopped");
                break;
            }
        }
    })
}

#[async_trait]
impl SessionFactory for ChromiumFactory {
    type Session = ChromiumSession;

    async fn open(&self) -> AuthCheckResult<ChromiumSession> {
        let browser = self.inner.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AuthCheckError::BrowserLaunchError {
                message: e.to_string(),
            })?;
        Ok(ChromiumSession { page })
    }
}

/// One browser page
#[derive(Debug)]
pub struct ChromiumSession {
    page: CdpPage,
}

impl ChromiumSession {
    async fn evaluate<T: serde::de::DeserializeOwned>(&self, script: String) -> AuthCheckResult<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(session_err)?
            .into_value()
            .map_err(session_err)
    }

    /// Tag the `index`-th match and return it as a CDP element
    async fn target(&self, selector: &Selector, index: usize) -> AuthCheckResult<Element> {
        let marker = Uuid::new_v4().to_string();
        let found: bool = self.evaluate(selector.to_mark_query(index, &marker)).await?;
        if !found {
            return Err(AuthCheckError::session(format!(
                "{selector} has no element at index {index}"
            )));
        }
        self.page
            .find_element(format!("[{MARKER_ATTR}=\"{marker}\"]"))
            .await
            .map_err(session_err)
    }
}

#[async_trait]
impl Session for ChromiumSession {
    async fn goto(&self, url: &str) -> AuthCheckResult<()> {
        let _ = self.page.goto(url).await.map_err(session_err)?;
        Ok(())
    }

    async fn query_all(&self, selector: &Selector) -> AuthCheckResult<Vec<ElementHandle>> {
        self.evaluate(selector.to_query()).await
    }

    async fn click(&self, selector: &Selector, index: usize) -> AuthCheckResult<()> {
        let element = self.target(selector, index).await?;
        let _ = element.click().await.map_err(session_err)?;
        Ok(())
    }

    async fn fill(&self, selector: &Selector, index: usize, text: &str) -> AuthCheckResult<()> {
        let element = self.target(selector, index).await?;
        let _ = element
            .call_js_fn(
                "function() { this.value = ''; this.dispatchEvent(new Event('input', { bubbles: true })); }",
                false,
            )
            .await
            .map_err(session_err)?;
        let _ = element.click().await.map_err(session_err)?;
        let _ = element.type_str(text).await.map_err(session_err)?;
        Ok(())
    }

    async fn current_url(&self) -> AuthCheckResult<String> {
        Ok(self
            .page
            .url()
            .await
            .map_err(session_err)?
            .unwrap_or_default())
    }

    async fn screenshot(&self) -> AuthCheckResult<Vec<u8>> {
        use base64::Engine;

        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let shot = self.page.execute(params).await.map_err(session_err)?;
        base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(session_err)
    }

    async fn close(&self) -> AuthCheckResult<()> {
        self.page.clone().close().await.map_err(session_err)
    }
}

fn session_err(e: impl std::fmt::Display) -> AuthCheckError {
    AuthCheckError::session(e.to_string())
}
