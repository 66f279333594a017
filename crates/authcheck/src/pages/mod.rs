//! Page objects for the sign-in and registration screens.
//!
//! Each page object wraps a [`Context`](crate::context::Context) and one
//! [`LocatorRegistry`](crate::page_object::LocatorRegistry), and exposes
//! intention-revealing operations (open, fill, submit, verify) that hide
//! the DOM structure from scenarios.

pub mod auth;
pub mod registration;

pub use auth::{AuthElements, AuthPage, SignUpEntry};
pub use registration::{
    generate_unique_email, generate_unique_email_with, resolve_email, RegistrationElements,
    RegistrationPage, SignUpForm, SignUpOptions, COUNTRY_CODE, DEFAULT_EMAIL_BASE, FIXED_EMAIL,
    INDUSTRIES, REJECTED_TOAST,
};

use crate::locator::{Locator, Role};

/// Text input inside the `<app-input>` whose label contains `label`
#[must_use]
pub fn labelled_textbox(label: &str) -> Locator {
    Locator::css("app-input")
        .filter_has_text(label)
        .get_by_role(Role::Textbox)
}
