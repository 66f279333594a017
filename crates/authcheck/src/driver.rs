//! Driving session abstraction.
//!
//! Page objects never talk to a browser directly. They go through a
//! [`Session`], the external collaborator that can navigate, resolve a
//! [`Selector`] against the live document, click, and fill.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Session (Abstract Trait)                                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────┐      ┌──────────────────────────┐  │
//! │  │  ChromiumSession     │      │  FakeAuthApp             │  │
//! │  │  (feature = browser) │      │  (in-memory, for tests)  │  │
//! │  │  CDP via             │      │  simulated sign-in and   │  │
//! │  │  chromiumoxide       │      │  sign-up screens         │  │
//! │  └──────────────────────┘      └──────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sessions take `&self` everywhere: a page object holds a read-only
//! capability to drive the UI and never mutates the session itself.
//! A session is not meant to be driven by two operations at once.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::locator::Selector;
use crate::result::AuthCheckResult;

/// Snapshot of one matched element at query time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Element tag name
    pub tag: String,
    /// Rendered text, whitespace as laid out by the page
    pub text: String,
    /// Whether the element is rendered and visible
    pub visible: bool,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(tag: impl Into<String>, text: impl Into<String>, visible: bool) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
            visible,
        }
    }
}

/// Abstract driver for one isolated browsing context.
///
/// Implementations re-resolve `selector` on every call.
#[async_trait]
pub trait Session: Send + Sync {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> AuthCheckResult<()>;

    /// Resolve all elements matching `selector`, in document order
    async fn query_all(&self, selector: &Selector) -> AuthCheckResult<Vec<ElementHandle>>;

    /// Click the `index`-th element matching `selector`
    async fn click(&self, selector: &Selector, index: usize) -> AuthCheckResult<()>;

    /// Replace the value of the `index`-th element matching `selector`
    async fn fill(&self, selector: &Selector, index: usize, text: &str) -> AuthCheckResult<()>;

    /// Current URL
    async fn current_url(&self) -> AuthCheckResult<String>;

    /// PNG screenshot of the viewport; empty when unsupported
    async fn screenshot(&self) -> AuthCheckResult<Vec<u8>> {
        Ok(Vec::new())
    }

    /// Release the session
    async fn close(&self) -> AuthCheckResult<()> {
        Ok(())
    }
}

/// Opens one fresh, isolated session per scenario attempt
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Session type produced by this factory
    type Session: Session + 'static;

    /// Open a new session
    async fn open(&self) -> AuthCheckResult<Self::Session>;
}
