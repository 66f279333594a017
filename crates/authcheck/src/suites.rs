//! The sign-in and registration suites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::driver::Session;
use crate::fixture::CredentialSet;
use crate::pages::{SignUpForm, SignUpOptions, REJECTED_TOAST};
use crate::result::AuthCheckError;
use crate::scenario::Suite;

/// Address already registered with the application
pub const EXISTING_EMAIL: &str = "turbo2387@mailinator.com";

/// Messages shown when the registration form is submitted empty
pub const REQUIRED_FIELD_MESSAGES: [&str; 6] = [
    "The First Name is required",
    "The Last Name is required",
    "The Company Name is required",
    "Please, enter your email address",
    "The Phone is required",
    "The Password is required",
];

/// Form data used by the registration scenarios
#[must_use]
pub fn sample_sign_up_form() -> SignUpForm {
    SignUpForm::new("TestFirstName", "TestLastName", "TestCompany", "Qwerty123!", "664089599")
}

/// Login flow: valid, empty and malformed credentials
#[must_use]
pub fn login_suite<S: Session + 'static>() -> Suite<S> {
    Suite::describe("Login flow")
        .before_each(|w| async move { w.auth.open("/").await })
        .test("Test 1 - Successful login", |w| async move {
            let (email, password) = w.credentials.set(CredentialSet::Valid);
            w.step("Perform login", w.auth.login(email, password)).await?;
            w.step("Verify logout button after login", w.auth.verify_logout_btn())
                .await
        })
        .test("Test 2 - Login with empty fields", |w| async move {
            let (email, password) = w.credentials.set(CredentialSet::Empty);
            w.step("Perform login with empty fields", w.auth.login(email, password))
                .await?;
            w.step(
                "Verify validation error messages are displayed",
                w.auth.verify_error_messages([
                    "Please, enter your email address",
                    "The Password is required",
                ]),
            )
            .await
        })
        .test("Test 3 - Invalid email format in login", |w| async move {
            let (email, password) = w.credentials.set(CredentialSet::InvalidFormat);
            w.step("Perform login with invalid email format", w.auth.login(email, password))
                .await?;
            w.step(
                "Verify error message is displayed",
                w.auth.verify_error_messages(["Invalid email address"]),
            )
            .await
        })
}

/// Registration flow: new account, empty form, duplicate e-mail
#[must_use]
pub fn registration_suite<S: Session + 'static>() -> Suite<S> {
    Suite::describe("Registration flow")
        .before_each(|w| async move {
            w.auth.open("/").await?;
            let _ = w.auth.open_sign_up_form().await?;
            Ok(())
        })
        .test("Test 1 - Successful registration with valid data", |w| async move {
            let form = sample_sign_up_form();
            let _ = w
                .step(
                    "Fill registration form",
                    w.registration.fill_sign_up_form(&form, &SignUpOptions::unique()),
                )
                .await?;
            w.step(
                "Verify logout button after registration and login",
                w.auth.verify_logout_btn(),
            )
            .await
        })
        .test("Test 2 - Empty form submission", |w| async move {
            w.step("Send empty form", w.registration.click_sign_up_btn())
                .await?;
            w.step(
                "Verify error messages for empty fields",
                w.auth.verify_error_messages(REQUIRED_FIELD_MESSAGES),
            )
            .await
        })
        .test("Test 3 - Registration with existing email", |w| async move {
            let form = sample_sign_up_form();
            let _ = w
                .step(
                    "Fill registration form with existing email",
                    w.registration
                        .fill_sign_up_form(&form, &SignUpOptions::with_email(EXISTING_EMAIL)),
                )
                .await?;
            w.step(
                "Verify toast message after registration with existing email",
                w.registration.verify_toast_message(REJECTED_TOAST),
            )
            .await
        })
}

/// Which suites to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteKind {
    /// Login flow only
    Login,
    /// Registration flow only
    Registration,
    /// Both, login first
    #[default]
    All,
}

impl SuiteKind {
    /// Build the selected suites in run order
    #[must_use]
    pub fn suites<S: Session + 'static>(self) -> Vec<Suite<S>> {
        match self {
            Self::Login => vec![login_suite()],
            Self::Registration => vec![registration_suite()],
            Self::All => vec![login_suite(), registration_suite()],
        }
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Registration => "registration",
            Self::All => "all",
        }
    }
}

impl fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuiteKind {
    type Err = AuthCheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "login" => Ok(Self::Login),
            "registration" | "reg" => Ok(Self::Registration),
            "all" => Ok(Self::All),
            other => Err(AuthCheckError::config(format!("unknown suite: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::FakeAuthApp;

    #[test]
    fn test_suite_shapes() {
        let login = login_suite::<FakeAuthApp>();
        assert_eq!(login.name(), "Login flow");
        assert_eq!(login.tests().len(), 3);
        assert!(!login.has_only());

        let reg = registration_suite::<FakeAuthApp>();
        let names: Vec<_> = reg.tests().iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec![
                "Test 1 - Successful registration with valid data",
                "Test 2 - Empty form submission",
                "Test 3 - Registration with existing email",
            ]
        );
    }

    #[test]
    fn test_suite_kind_parsing() {
        assert_eq!("login".parse::<SuiteKind>().unwrap(), SuiteKind::Login);
        assert_eq!("Registration".parse::<SuiteKind>().unwrap(), SuiteKind::Registration);
        assert!("checkout".parse::<SuiteKind>().is_err());
        assert_eq!(SuiteKind::All.suites::<FakeAuthApp>().len(), 2);
        assert_eq!(SuiteKind::default().to_string(), "all");
    }
}
