//! Sign-in screen page object.

use std::fmt;

use crate::context::Context;
use crate::driver::Session;
use crate::locator::{Locator, Role};
use crate::normalize::{normalize_all, Expected, NormalizeMode};
use crate::page_object::{LocatorRegistry, PageObject};
use crate::pages::labelled_textbox;
use crate::result::{AuthCheckError, AuthCheckResult};

/// Locators of the sign-in screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthElements {
    /// E-mail input
    pub email_input: Locator,
    /// Password input
    pub password_input: Locator,
    /// "Sign In" button (exact name)
    pub submit_button: Locator,
    /// "Logout" button shown once signed in
    pub logout_button: Locator,
    /// Validation messages under the inputs
    pub error_messages: Locator,
    /// Dedicated "Sign Up Now" entry point
    pub sign_up_now_button: Locator,
}

impl Default for AuthElements {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthElements {
    /// Create the sign-in locators
    #[must_use]
    pub fn new() -> Self {
        Self {
            email_input: Locator::css("input[type=\"email\"]"),
            password_input: Locator::css("input[type=\"password\"]"),
            submit_button: Locator::role(Role::Button).name("Sign In").exact(),
            logout_button: Locator::role(Role::Button).name("Logout"),
            error_messages: Locator::css(".__error"),
            sign_up_now_button: Locator::role(Role::Button).name("Sign Up Now"),
        }
    }
}

/// Which control opened the registration form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpEntry {
    /// The dedicated "Sign Up Now" button
    Primary,
    /// Any button whose name matches /sign up/i
    ButtonFallback,
    /// Any link whose name matches /sign up/i
    LinkFallback,
}

impl SignUpEntry {
    /// Short name for logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::ButtonFallback => "button-fallback",
            Self::LinkFallback => "link-fallback",
        }
    }
}

impl fmt::Display for SignUpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sign-in screen
#[derive(Debug)]
pub struct AuthPage<S: Session> {
    ctx: Context<S>,
    els: AuthElements,
    mode: NormalizeMode,
}

impl<S: Session> Clone for AuthPage<S> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            els: self.els.clone(),
            mode: self.mode,
        }
    }
}

impl<S: Session> AuthPage<S> {
    /// Create a new sign-in page object on `ctx`
    #[must_use]
    pub fn new(ctx: Context<S>) -> Self {
        Self {
            ctx,
            els: AuthElements::new(),
            mode: NormalizeMode::default(),
        }
    }

    /// Compare error messages with a different normalization
    #[must_use]
    pub const fn with_normalize_mode(mut self, mode: NormalizeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Locators of this page
    #[must_use]
    pub const fn elements(&self) -> &AuthElements {
        &self.els
    }

    /// Session context
    #[must_use]
    pub const fn context(&self) -> &Context<S> {
        &self.ctx
    }

    /// Navigate to `path` and wait for the e-mail input.
    ///
    /// Fails with [`AuthCheckError::NavigationTimeout`] when the input is
    /// not visible within the page default deadline.
    pub async fn open(&self, path: &str) -> AuthCheckResult<()> {
        let url = self.ctx.navigate(path).await?;
        let ms = self.ctx.timeouts().page_default_ms;
        let waited = self.ctx.wait_visible(&self.els.email_input, ms).await?;
        if waited.success {
            Ok(())
        } else {
            Err(AuthCheckError::NavigationTimeout {
                url,
                waited_for: waited.waited_for,
                ms,
            })
        }
    }

    /// Type both credentials; empty strings are allowed
    pub async fn fill_credentials(&self, email: &str, password: &str) -> AuthCheckResult<()> {
        self.ctx.fill(&self.els.email_input, email).await?;
        self.ctx.fill(&self.els.password_input, password).await
    }

    /// Click "Sign In" without waiting for the outcome
    pub async fn submit(&self) -> AuthCheckResult<()> {
        self.ctx.click(&self.els.submit_button).await
    }

    /// Fill the credentials, then submit
    pub async fn login(&self, email: &str, password: &str) -> AuthCheckResult<()> {
        self.fill_credentials(email, password).await?;
        self.submit().await
    }

    /// Open the registration form from the sign-in screen.
    ///
    /// Uses the "Sign Up Now" button when it is visible, otherwise any
    /// button and then any link named like "sign up". Returns once the
    /// first-name field of the form is visible.
    pub async fn open_sign_up_form(&self) -> AuthCheckResult<SignUpEntry> {
        let ms = self.ctx.timeouts().page_default_ms;
        let button_fallback = Locator::role(Role::Button).name_matching("sign up");
        let link_fallback = Locator::role(Role::Link).name_matching("sign up");

        let (entry, control) = if self.ctx.is_visible(&self.els.sign_up_now_button).await {
            (SignUpEntry::Primary, &self.els.sign_up_now_button)
        } else if self.ctx.is_visible(&button_fallback).await {
            (SignUpEntry::ButtonFallback, &button_fallback)
        } else {
            if !self.ctx.wait_visible(&link_fallback, ms).await?.success {
                return Err(AuthCheckError::FormNotOpened { ms });
            }
            (SignUpEntry::LinkFallback, &link_fallback)
        };
        if entry != SignUpEntry::Primary {
            tracing::warn!(%entry, "\"Sign Up Now\" not visible, using fallback entry point");
        }
        self.ctx.click(control).await?;

        if self
            .ctx
            .wait_visible(&labelled_textbox("First Name"), ms)
            .await?
            .success
        {
            tracing::debug!(%entry, "sign-up form open");
            Ok(entry)
        } else {
            Err(AuthCheckError::FormNotOpened { ms })
        }
    }

    /// The logout control is visible and reads "Logout"
    pub async fn verify_logout_btn(&self) -> AuthCheckResult<()> {
        self.ctx.expect(&self.els.logout_button).to_be_visible().await?;
        self.ctx
            .expect(&self.els.logout_button)
            .to_contain_text("Logout")
            .await
    }

    /// Every expected message is among the visible validation messages.
    ///
    /// Order-independent and tolerant of extra messages; fails when no
    /// message is visible at all.
    pub async fn verify_error_messages(&self, expected: impl Into<Expected>) -> AuthCheckResult<()> {
        let expected = expected.into();
        tracing::debug!(expected = ?expected.messages(), "verify error messages");
        self.ctx
            .expect(&self.els.error_messages)
            .to_include_texts(&expected, self.mode)
            .await
    }

    /// Normalized text of every visible validation message
    pub async fn error_messages(&self) -> AuthCheckResult<Vec<String>> {
        let texts: Vec<String> = self
            .ctx
            .query(&self.els.error_messages)
            .await?
            .into_iter()
            .filter(|el| el.visible)
            .map(|el| el.text)
            .collect();
        Ok(normalize_all(texts, self.mode))
    }
}

impl<S: Session> PageObject for AuthPage<S> {
    fn url_pattern(&self) -> &str {
        "/"
    }

    fn registry(&self) -> LocatorRegistry {
        let els = &self.els;
        LocatorRegistry::new("auth")
            .with_locator("emailInput", els.email_input.clone())
            .with_locator("passwordInput", els.password_input.clone())
            .with_locator("submitButton", els.submit_button.clone())
            .with_locator("logoutButton", els.logout_button.clone())
            .with_locator("errorMessages", els.error_messages.clone())
            .with_locator("signUpNowButton", els.sign_up_now_button.clone())
    }

    fn page_name(&self) -> &str {
        "AuthPage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timeouts;
    use crate::mock::{EntryPoint, FakeAuthApp, Screen};
    use std::sync::Arc;

    fn page(app: FakeAuthApp) -> AuthPage<FakeAuthApp> {
        AuthPage::new(Context::new(Arc::new(app), Timeouts::uniform(60), "http://fake.local/"))
    }

    mod open_tests {
        use super::*;

        #[tokio::test]
        async fn test_open_waits_for_email_input() {
            let auth = page(FakeAuthApp::new());
            auth.open("/").await.unwrap();
            assert_eq!(auth.context().session().screen(), Screen::Login);
        }

        #[tokio::test]
        async fn test_open_unresponsive_is_navigation_timeout() {
            let auth = page(FakeAuthApp::new().unresponsive());
            let err = auth.open("/").await.unwrap_err();
            match err {
                AuthCheckError::NavigationTimeout { url, waited_for, ms } => {
                    assert_eq!(url, "http://fake.local/");
                    assert_eq!(waited_for, "input[type=\"email\"]");
                    assert_eq!(ms, 60);
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    mod sign_up_entry_tests {
        use super::*;

        async fn open_with(entry: EntryPoint) -> AuthCheckResult<SignUpEntry> {
            let auth = page(FakeAuthApp::new().with_entry_point(entry));
            auth.open("/").await?;
            auth.open_sign_up_form().await
        }

        #[tokio::test]
        async fn test_primary_entry() {
            assert_eq!(open_with(EntryPoint::SignUpNow).await.unwrap(), SignUpEntry::Primary);
        }

        #[tokio::test]
        async fn test_button_fallback() {
            assert_eq!(
                open_with(EntryPoint::SignUpButton).await.unwrap(),
                SignUpEntry::ButtonFallback
            );
        }

        #[tokio::test]
        async fn test_link_fallback() {
            assert_eq!(
                open_with(EntryPoint::SignUpLink).await.unwrap(),
                SignUpEntry::LinkFallback
            );
        }

        #[tokio::test]
        async fn test_absent_entry_is_form_not_opened() {
            let err = open_with(EntryPoint::Absent).await.unwrap_err();
            assert!(matches!(err, AuthCheckError::FormNotOpened { ms: 60 }));
        }
    }

    mod verify_tests {
        use super::*;

        #[tokio::test]
        async fn test_empty_login_errors() {
            let auth = page(FakeAuthApp::new());
            auth.open("/").await.unwrap();
            auth.login("", "").await.unwrap();
            auth.verify_error_messages(["Please, enter your email address", "The Password is required"])
                .await
                .unwrap();
            assert_eq!(
                auth.error_messages().await.unwrap(),
                vec![
                    "please, enter your email address".to_string(),
                    "the password is required".to_string()
                ]
            );
        }

        #[tokio::test]
        async fn test_no_messages_fails() {
            let auth = page(FakeAuthApp::new());
            auth.open("/").await.unwrap();
            let err = auth
                .verify_error_messages("The Password is required")
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Assertion error: No error messages visible");
        }

        #[tokio::test]
        async fn test_missing_message_fails() {
            let auth = page(FakeAuthApp::new());
            auth.open("/").await.unwrap();
            auth.login("", "secret").await.unwrap();
            let err = auth
                .verify_error_messages("The Password is required")
                .await
                .unwrap_err();
            assert!(err.to_string().contains("the password is required"));
        }

        #[tokio::test]
        async fn test_case_sensitive_mode() {
            let auth = page(FakeAuthApp::new()).with_normalize_mode(NormalizeMode::CaseSensitive);
            auth.open("/").await.unwrap();
            auth.login("", "").await.unwrap();
            auth.verify_error_messages("The Password is required").await.unwrap();
            assert!(auth.verify_error_messages("the password is required").await.is_err());
        }

        #[tokio::test]
        async fn test_logout_missing_is_assertion_error() {
            let auth = page(FakeAuthApp::new());
            auth.open("/").await.unwrap();
            let err = auth.verify_logout_btn().await.unwrap_err();
            assert!(matches!(err, AuthCheckError::AssertionError { .. }));
        }
    }

    #[test]
    fn test_registry_names() {
        let auth = page(FakeAuthApp::new());
        let registry = auth.registry();
        assert_eq!(
            registry.names(),
            vec![
                "emailInput",
                "passwordInput",
                "submitButton",
                "logoutButton",
                "errorMessages",
                "signUpNowButton"
            ]
        );
        assert_eq!(auth.page_name(), "AuthPage");
    }
}
