//! Session context: a driving session plus the deadlines that govern it.
//!
//! Page objects receive a [`Context`] instead of a bare session. It owns
//! the explicit [`Timeouts`] for every wait, so no page object ever
//! changes a process-wide default, and it implements the auto-waiting
//! primitives every page object shares:
//!
//! - actions (`click`, `fill`) wait for exactly one visible match
//! - `is_visible` is a strict, non-throwing check
//! - `wait_visible` blocks until the first match is visible
//! - `expect` starts a retrying assertion

use std::sync::Arc;
use std::time::Duration;

use crate::assertion::Expect;
use crate::config::{resolve_url, Timeouts};
use crate::driver::{ElementHandle, Session};
use crate::locator::Locator;
use crate::result::{AuthCheckError, AuthCheckResult};
use crate::wait::{wait_until, WaitOptions, WaitResult};

/// Session handle shared by the page objects of one scenario
pub struct Context<S: Session> {
    session: Arc<S>,
    timeouts: Timeouts,
    base_url: String,
}

impl<S: Session> Clone for Context<S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            timeouts: self.timeouts,
            base_url: self.base_url.clone(),
        }
    }
}

impl<S: Session> std::fmt::Debug for Context<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("base_url", &self.base_url)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl<S: Session> Context<S> {
    /// Create a context around a session
    #[must_use]
    pub fn new(session: Arc<S>, timeouts: Timeouts, base_url: impl Into<String>) -> Self {
        Self {
            session,
            timeouts,
            base_url: base_url.into(),
        }
    }

    /// Same session, different deadlines
    #[must_use]
    pub fn with_timeouts(&self, timeouts: Timeouts) -> Self {
        Self {
            timeouts,
            ..self.clone()
        }
    }

    /// The underlying session
    #[must_use]
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Configured deadlines
    #[must_use]
    pub const fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Wait options for a deadline in milliseconds
    #[must_use]
    pub const fn wait_options(&self, timeout_ms: u64) -> WaitOptions {
        WaitOptions::new(timeout_ms).with_poll_interval(self.timeouts.poll_interval_ms)
    }

    /// Navigate to `path` relative to the base URL; returns the full URL.
    ///
    /// A navigation that exceeds the deadline surfaces as
    /// [`AuthCheckError::NavigationTimeout`].
    pub async fn navigate(&self, path: &str) -> AuthCheckResult<String> {
        let url = resolve_url(&self.base_url, path);
        tracing::debug!(%url, "navigate");
        match tokio::time::timeout(self.timeouts.navigation(), self.session.goto(&url)).await {
            Ok(result) => result.map(|()| url),
            Err(_) => Err(AuthCheckError::NavigationTimeout {
                url,
                waited_for: "page load".to_string(),
                ms: self.timeouts.navigation_ms,
            }),
        }
    }

    /// Snapshot every current match
    pub async fn query(&self, locator: &Locator) -> AuthCheckResult<Vec<ElementHandle>> {
        self.session.query_all(locator.selector()).await
    }

    /// Is the single match visible right now?
    ///
    /// Strict like the actions: more than one match counts as "not
    /// visible", and so does any failure.
    pub async fn is_visible(&self, locator: &Locator) -> bool {
        match self.query(locator).await {
            Ok(els) if els.len() > 1 => {
                tracing::debug!(%locator, count = els.len(), "ambiguous visibility check");
                false
            }
            Ok(els) => els.first().is_some_and(|el| el.visible),
            Err(e) => {
                tracing::debug!(%locator, error = %e, "visibility check failed");
                false
            }
        }
    }

    /// Poll until the first match is visible or `timeout_ms` elapses
    pub async fn wait_visible(&self, locator: &Locator, timeout_ms: u64) -> AuthCheckResult<WaitResult> {
        let this = self;
        let description = locator.to_string();
        wait_until(self.wait_options(timeout_ms), &description, move || async move {
            Ok(this
                .query(locator)
                .await?
                .first()
                .is_some_and(|el| el.visible))
        })
        .await
    }

    /// Click the single visible match, waiting up to the action deadline
    pub async fn click(&self, locator: &Locator) -> AuthCheckResult<()> {
        self.wait_actionable("click", locator).await?;
        tracing::debug!(%locator, "click");
        self.session.click(locator.selector(), 0).await
    }

    /// Fill the single visible match, waiting up to the action deadline
    pub async fn fill(&self, locator: &Locator, text: &str) -> AuthCheckResult<()> {
        self.wait_actionable("fill", locator).await?;
        tracing::debug!(%locator, chars = text.chars().count(), "fill");
        self.session.fill(locator.selector(), 0, text).await
    }

    /// Start an assertion on `locator` with the expect deadline
    #[must_use]
    pub fn expect<'a>(&'a self, locator: &'a Locator) -> Expect<'a, S> {
        Expect::new(self, locator, Duration::from_millis(self.timeouts.expect_ms))
    }

    /// Strict auto-wait: exactly one match, and it is visible
    async fn wait_actionable(&self, action: &str, locator: &Locator) -> AuthCheckResult<()> {
        let this = self;
        let description = locator.to_string();
        let desc = description.as_str();
        let result = wait_until(
            self.wait_options(self.timeouts.action_ms),
            desc,
            move || async move {
                let els = this.query(locator).await?;
                if els.len() > 1 {
                    return Err(AuthCheckError::StrictModeViolation {
                        locator: desc.to_string(),
                        count: els.len(),
                    });
                }
                Ok(els.first().is_some_and(|el| el.visible))
            },
        )
        .await?;

        if result.success {
            Ok(())
        } else {
            Err(AuthCheckError::ActionTimeout {
                action: action.to_string(),
                locator: description,
                ms: self.timeouts.action_ms,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Role;
    use crate::mock::{FakeAuthApp, Screen};

    fn ctx(app: FakeAuthApp) -> Context<FakeAuthApp> {
        Context::new(Arc::new(app), Timeouts::uniform(50), "http://fake.local/")
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_navigate_resolves_against_base() {
            let c = ctx(FakeAuthApp::new());
            let url = c.navigate("/").await.unwrap();
            assert_eq!(url, "http://fake.local/");
            assert_eq!(c.session().current_url().await.unwrap(), "http://fake.local/");
        }
    }

    mod visibility_tests {
        use super::*;

        #[tokio::test]
        async fn test_is_visible_true_on_login_screen() {
            let c = ctx(FakeAuthApp::new());
            c.navigate("/").await.unwrap();
            assert!(c.is_visible(&Locator::css("input[type=\"email\"]")).await);
        }

        #[tokio::test]
        async fn test_is_visible_false_for_missing() {
            let c = ctx(FakeAuthApp::new());
            c.navigate("/").await.unwrap();
            assert!(!c.is_visible(&Locator::role(Role::Button).name("Logout")).await);
        }

        #[tokio::test]
        async fn test_is_visible_swallows_errors() {
            let c = ctx(FakeAuthApp::new());
            c.navigate("/").await.unwrap();
            assert!(!c.is_visible(&Locator::css("[[[")).await);
        }

        #[tokio::test]
        async fn test_is_visible_false_when_ambiguous() {
            let c = ctx(FakeAuthApp::new());
            c.navigate("/").await.unwrap();
            // email and password inputs are both visible
            assert_eq!(c.query(&Locator::css("input")).await.unwrap().len(), 2);
            assert!(!c.is_visible(&Locator::css("input")).await);
        }
    }

    mod action_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_and_click() {
            let c = ctx(FakeAuthApp::new());
            c.navigate("/").await.unwrap();
            c.fill(&Locator::css("input[type=\"email\"]"), "user@example.com")
                .await
                .unwrap();
            c.click(&Locator::role(Role::Button).name("Sign In").exact())
                .await
                .unwrap();
            assert!(c.session().was_called("click"));
        }

        #[tokio::test]
        async fn test_click_missing_is_action_timeout() {
            let c = ctx(FakeAuthApp::new());
            c.navigate("/").await.unwrap();
            let err = c
                .click(&Locator::role(Role::Button).name("Nope"))
                .await
                .unwrap_err();
            assert!(matches!(err, AuthCheckError::ActionTimeout { ref action, .. } if action == "click"));
        }

        #[tokio::test]
        async fn test_click_ambiguous_is_strict_violation() {
            let c = ctx(FakeAuthApp::new());
            c.navigate("/").await.unwrap();
            let err = c.click(&Locator::css("input")).await.unwrap_err();
            assert!(matches!(err, AuthCheckError::StrictModeViolation { count: 2, .. }));
        }

        #[tokio::test]
        async fn test_locator_re_resolves_after_rerender() {
            let app = FakeAuthApp::new();
            let c = ctx(app);
            c.navigate("/").await.unwrap();
            let first_name = Locator::css("app-input")
                .filter_has_text("First Name")
                .get_by_role(Role::Textbox);
            assert!(!c.is_visible(&first_name).await);
            c.session().set_screen(Screen::SignUp);
            assert!(c.is_visible(&first_name).await);
        }
    }

    #[tokio::test]
    async fn test_wait_visible_times_out() {
        let c = ctx(FakeAuthApp::new());
        c.navigate("/").await.unwrap();
        let result = c
            .wait_visible(&Locator::role(Role::Alert), 20)
            .await
            .unwrap();
        assert!(!result.success);
    }

    #[test]
    fn test_with_timeouts_keeps_session() {
        let c = ctx(FakeAuthApp::new());
        let d = c.with_timeouts(Timeouts::uniform(1));
        assert_eq!(d.timeouts().action_ms, 1);
        assert_eq!(d.base_url(), c.base_url());
    }
}
