//! Registration form page object.
//!
//! The e-mail used for a registration is resolved with a fixed precedence:
//!
//! 1. an explicit `options.email`
//! 2. [`FIXED_EMAIL`] when `options.unique_email == Some(false)`
//! 3. otherwise a fresh address from [`generate_unique_email`]

use rand::seq::SliceRandom;
use rand::Rng;

use crate::context::Context;
use crate::driver::Session;
use crate::locator::{Locator, Role};
use crate::page_object::{LocatorRegistry, PageObject};
use crate::pages::labelled_textbox;
use crate::result::{AuthCheckError, AuthCheckResult};

/// Industries offered by the registration form
pub const INDUSTRIES: [&str; 10] = [
    "Distributor",
    "Food & Beverage",
    "Insurance & Benefits",
    "Manufacturer",
    "Medical",
    "Pharmaceutical",
    "Professional Services",
    "Rep Agency",
    "Equipment Rental",
    "Other Industry",
];

/// Phone prefix selected for every registration
pub const COUNTRY_CODE: &str = "+380";

/// Base address for generated e-mails
pub const DEFAULT_EMAIL_BASE: &str = "test@gmail.com";

/// Known-existing address used when unique e-mails are turned off
pub const FIXED_EMAIL: &str = "test@gmail.com";

/// Toast name the registration page watches for
pub const REJECTED_TOAST: &str = "Invalid to sign up";

/// Derive `name+NNNNNN@domain` from `base` with a random six-digit suffix.
///
/// Uniqueness is probabilistic only. A base without `@` gets the suffix
/// appended.
#[must_use]
pub fn generate_unique_email(base: &str) -> String {
    generate_unique_email_with(&mut rand::thread_rng(), base)
}

/// [`generate_unique_email`] with an explicit random source
#[must_use]
pub fn generate_unique_email_with<R: Rng + ?Sized>(rng: &mut R, base: &str) -> String {
    let suffix: u32 = rng.gen_range(100_000..=999_999);
    match base.rsplit_once('@') {
        Some((name, domain)) => format!("{name}+{suffix}@{domain}"),
        None => format!("{base}+{suffix}"),
    }
}

/// Pick the address a registration uses; `generate` runs only when needed
#[must_use]
pub fn resolve_email(options: &SignUpOptions, generate: impl FnOnce() -> String) -> String {
    match (&options.email, options.unique_email) {
        (Some(email), _) => email.clone(),
        (None, Some(false)) => FIXED_EMAIL.to_string(),
        (None, _) => generate(),
    }
}

/// Text fields of the registration form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpForm {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Company name
    pub company_name: String,
    /// Password
    pub password: String,
    /// Phone number without country code
    pub phone: String,
}

impl SignUpForm {
    /// Create a new form
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        company_name: impl Into<String>,
        password: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            company_name: company_name.into(),
            password: password.into(),
            phone: phone.into(),
        }
    }
}

/// How the registration e-mail is chosen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpOptions {
    /// Use exactly this address
    pub email: Option<String>,
    /// `Some(false)` selects [`FIXED_EMAIL`]; anything else generates one
    pub unique_email: Option<bool>,
}

impl SignUpOptions {
    /// Generate a unique address
    #[must_use]
    pub const fn unique() -> Self {
        Self {
            email: None,
            unique_email: Some(true),
        }
    }

    /// Use [`FIXED_EMAIL`]
    #[must_use]
    pub const fn fixed() -> Self {
        Self {
            email: None,
            unique_email: Some(false),
        }
    }

    /// Use exactly `email`
    #[must_use]
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            unique_email: Some(false),
        }
    }
}

/// Locators of the registration form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationElements {
    /// First name input
    pub first_name_field: Locator,
    /// Last name input
    pub last_name_field: Locator,
    /// Company name input
    pub company_name_field: Locator,
    /// E-mail input
    pub email_field: Locator,
    /// Password input
    pub password_field: Locator,
    /// Phone input
    pub phone_field: Locator,
    /// "Sign Up" button (exact name)
    pub sign_up_button: Locator,
    /// Rejection toast
    pub toast_message: Locator,
    /// Industry menu trigger
    pub industry_select: Locator,
    /// Country code menu trigger
    pub country_select: Locator,
}

impl Default for RegistrationElements {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationElements {
    /// Create the registration locators
    #[must_use]
    pub fn new() -> Self {
        Self {
            first_name_field: labelled_textbox("First Name"),
            last_name_field: labelled_textbox("Last Name"),
            company_name_field: labelled_textbox("Company Name"),
            email_field: Locator::css("input[type=\"email\"]"),
            password_field: Locator::css("input[type=\"password\"]"),
            phone_field: labelled_textbox("Phone"),
            sign_up_button: Locator::role(Role::Button).name("Sign Up").exact(),
            toast_message: Locator::role(Role::Alert).name(REJECTED_TOAST),
            industry_select: Locator::css("[formcontrolname=\"industry\"]"),
            country_select: Locator::css("[placeholder=\"Country\"]"),
        }
    }
}

/// Registration form
#[derive(Debug)]
pub struct RegistrationPage<S: Session> {
    ctx: Context<S>,
    els: RegistrationElements,
}

impl<S: Session> Clone for RegistrationPage<S> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            els: self.els.clone(),
        }
    }
}

impl<S: Session> RegistrationPage<S> {
    /// Create a new registration page object on `ctx`
    #[must_use]
    pub fn new(ctx: Context<S>) -> Self {
        Self {
            ctx,
            els: RegistrationElements::new(),
        }
    }

    /// Locators of this page
    #[must_use]
    pub const fn elements(&self) -> &RegistrationElements {
        &self.els
    }

    /// Session context
    #[must_use]
    pub const fn context(&self) -> &Context<S> {
        &self.ctx
    }

    /// Random address derived from `base`
    #[must_use]
    pub fn generate_unique_email(&self, base: &str) -> String {
        generate_unique_email(base)
    }

    async fn wait_for_form(&self) -> AuthCheckResult<()> {
        let ms = self.ctx.timeouts().page_default_ms;
        if self
            .ctx
            .wait_visible(&self.els.first_name_field, ms)
            .await?
            .success
        {
            Ok(())
        } else {
            Err(AuthCheckError::FormNotOpened { ms })
        }
    }

    /// Fill and submit the whole form; returns the e-mail that was used.
    ///
    /// A random industry and the [`COUNTRY_CODE`] phone prefix are picked
    /// from their option menus.
    pub async fn fill_sign_up_form(
        &self,
        form: &SignUpForm,
        options: &SignUpOptions,
    ) -> AuthCheckResult<String> {
        let email = resolve_email(options, || generate_unique_email(DEFAULT_EMAIL_BASE));
        tracing::info!(%email, "filling sign-up form");

        self.wait_for_form().await?;
        self.ctx.fill(&self.els.first_name_field, &form.first_name).await?;
        self.ctx.fill(&self.els.last_name_field, &form.last_name).await?;
        self.ctx
            .fill(&self.els.company_name_field, &form.company_name)
            .await?;
        self.ctx.fill(&self.els.email_field, &email).await?;
        self.ctx.fill(&self.els.password_field, &form.password).await?;
        let industry = self.select_random_industry().await?;
        tracing::debug!(industry, "industry selected");
        self.select_country().await?;
        self.ctx.fill(&self.els.phone_field, &form.phone).await?;
        self.click_sign_up_btn().await?;
        Ok(email)
    }

    /// Pick one of [`INDUSTRIES`] at random; returns the choice
    pub async fn select_random_industry(&self) -> AuthCheckResult<&'static str> {
        let industry = INDUSTRIES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(INDUSTRIES[0]);
        self.select_industry(industry).await?;
        Ok(industry)
    }

    /// Pick a named industry
    pub async fn select_industry(&self, industry: &str) -> AuthCheckResult<()> {
        self.select_option(&self.els.industry_select, industry).await
    }

    /// Pick the [`COUNTRY_CODE`] phone prefix
    pub async fn select_country(&self) -> AuthCheckResult<()> {
        self.select_option(&self.els.country_select, COUNTRY_CODE).await
    }

    /// Open a menu and click the option named `option`.
    ///
    /// Fails with [`AuthCheckError::OptionNotFound`] when no such option
    /// becomes visible within the page default deadline.
    async fn select_option(&self, trigger: &Locator, option: &str) -> AuthCheckResult<()> {
        self.ctx.click(trigger).await?;
        let choice = Locator::role(Role::Option).name(option);
        let ms = self.ctx.timeouts().page_default_ms;
        if !self.ctx.wait_visible(&choice, ms).await?.success {
            return Err(AuthCheckError::OptionNotFound {
                option: option.to_string(),
            });
        }
        tracing::debug!(%trigger, option, "select option");
        self.ctx.click(&choice).await
    }

    /// Click "Sign Up" without filling anything
    pub async fn click_sign_up_btn(&self) -> AuthCheckResult<()> {
        self.ctx.click(&self.els.sign_up_button).await
    }

    /// The rejection toast is visible and contains `text`
    pub async fn verify_toast_message(&self, text: &str) -> AuthCheckResult<()> {
        self.ctx.expect(&self.els.toast_message).to_be_visible().await?;
        self.ctx
            .expect(&self.els.toast_message)
            .to_contain_text(text)
            .await
    }
}

impl<S: Session> PageObject for RegistrationPage<S> {
    fn url_pattern(&self) -> &str {
        "/sign-up"
    }

    fn registry(&self) -> LocatorRegistry {
        let els = &self.els;
        LocatorRegistry::new("registration")
            .with_locator("firstNameField", els.first_name_field.clone())
            .with_locator("lastNameField", els.last_name_field.clone())
            .with_locator("companyNameField", els.company_name_field.clone())
            .with_locator("emailField", els.email_field.clone())
            .with_locator("passwordField", els.password_field.clone())
            .with_locator("phoneField", els.phone_field.clone())
            .with_locator("signUpButton", els.sign_up_button.clone())
            .with_locator("toastMessage", els.toast_message.clone())
            .with_locator("industrySelect", els.industry_select.clone())
            .with_locator("countrySelect", els.country_select.clone())
    }

    fn page_name(&self) -> &str {
        "RegistrationPage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timeouts;
    use crate::mock::{FakeAuthApp, Screen};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use regex::Regex;
    use std::sync::Arc;

    fn form() -> SignUpForm {
        SignUpForm::new("TestFirstName", "TestLastName", "TestCompany", "Qwerty123!", "664089599")
    }

    async fn on_form(app: FakeAuthApp) -> RegistrationPage<FakeAuthApp> {
        let ctx = Context::new(Arc::new(app), Timeouts::uniform(60), "http://fake.local/");
        ctx.navigate("/sign-up").await.unwrap();
        RegistrationPage::new(ctx)
    }

    mod email_tests {
        use super::*;

        #[test]
        fn test_generated_shape() {
            let re = Regex::new(r"^test\+\d{6}@gmail\.com$").unwrap();
            assert!(re.is_match(&generate_unique_email(DEFAULT_EMAIL_BASE)));
        }

        #[test]
        fn test_seeded_generation_is_deterministic() {
            let a = generate_unique_email_with(&mut StdRng::seed_from_u64(7), "qa@example.org");
            let b = generate_unique_email_with(&mut StdRng::seed_from_u64(7), "qa@example.org");
            assert_eq!(a, b);
        }

        #[test]
        fn test_base_without_at() {
            let email = generate_unique_email_with(&mut StdRng::seed_from_u64(1), "plain");
            assert!(Regex::new(r"^plain\+\d{6}$").unwrap().is_match(&email));
        }

        #[test]
        fn test_successive_calls_differ() {
            let mut rng = StdRng::seed_from_u64(42);
            let a = generate_unique_email_with(&mut rng, DEFAULT_EMAIL_BASE);
            let b = generate_unique_email_with(&mut rng, DEFAULT_EMAIL_BASE);
            assert_ne!(a, b);
        }

        proptest! {
            #[test]
            fn prop_suffix_in_range(seed in any::<u64>()) {
                let email = generate_unique_email_with(&mut StdRng::seed_from_u64(seed), "a@b.c");
                let suffix: u32 = email
                    .trim_start_matches("a+")
                    .trim_end_matches("@b.c")
                    .parse()
                    .unwrap();
                prop_assert!((100_000..=999_999).contains(&suffix));
            }
        }
    }

    mod resolve_email_tests {
        use super::*;

        #[test]
        fn test_default_generates() {
            let email = resolve_email(&SignUpOptions::default(), || generate_unique_email(DEFAULT_EMAIL_BASE));
            assert!(Regex::new(r"^test\+\d{6}@gmail\.com$").unwrap().is_match(&email));
        }

        #[test]
        fn test_unique_false_uses_fixed() {
            let email = resolve_email(&SignUpOptions::fixed(), || unreachable!("must not generate"));
            assert_eq!(email, "test@gmail.com");
        }

        #[test]
        fn test_explicit_wins() {
            let options = SignUpOptions {
                email: Some("x@y.com".to_string()),
                unique_email: Some(true),
            };
            assert_eq!(resolve_email(&options, || unreachable!("must not generate")), "x@y.com");
        }
    }

    mod form_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_with_unique_email_signs_in() {
            let reg = on_form(FakeAuthApp::new()).await;
            let email = reg.fill_sign_up_form(&form(), &SignUpOptions::unique()).await.unwrap();
            let app = reg.context().session();
            assert_eq!(app.screen(), Screen::Dashboard);
            assert_eq!(app.signed_in_user(), Some(email.clone()));
            assert!(app.backend().contains(&email));
        }

        #[tokio::test]
        async fn test_existing_email_shows_toast() {
            let reg = on_form(FakeAuthApp::new()).await;
            let email = reg
                .fill_sign_up_form(&form(), &SignUpOptions::with_email("turbo2387@mailinator.com"))
                .await
                .unwrap();
            assert_eq!(email, "turbo2387@mailinator.com");
            reg.verify_toast_message("Invalid to sign up").await.unwrap();
        }

        #[tokio::test]
        async fn test_fixed_email_is_taken() {
            let reg = on_form(FakeAuthApp::new()).await;
            let email = reg.fill_sign_up_form(&form(), &SignUpOptions::fixed()).await.unwrap();
            assert_eq!(email, FIXED_EMAIL);
            reg.verify_toast_message(REJECTED_TOAST).await.unwrap();
        }

        #[tokio::test]
        async fn test_missing_country_is_option_not_found() {
            let reg = on_form(FakeAuthApp::new().with_country_codes(["+1", "+44"])).await;
            let err = reg.select_country().await.unwrap_err();
            assert!(matches!(err, AuthCheckError::OptionNotFound { ref option } if option == "+380"));
        }

        #[derive(Clone, Default)]
        struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

        impl std::io::Write for LogBuffer {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        #[tokio::test]
        async fn test_fill_logs_selected_industry() {
            let logs = LogBuffer::default();
            let sink = logs.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::DEBUG)
                .with_ansi(false)
                .with_writer(move || sink.clone())
                .finish();
            let _guard = tracing::subscriber::set_default(subscriber);

            let reg = on_form(FakeAuthApp::new()).await;
            reg.fill_sign_up_form(&form(), &SignUpOptions::fixed()).await.unwrap();
            let picked = reg.context().session().selected_industry().unwrap();

            let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
            assert!(output.contains("industry selected"));
            assert!(output.contains(&format!("industry=\"{picked}\"")));
        }

        #[tokio::test]
        async fn test_random_industry_is_selected() {
            let reg = on_form(FakeAuthApp::new()).await;
            let picked = reg.select_random_industry().await.unwrap();
            assert!(INDUSTRIES.contains(&picked));
            assert_eq!(reg.context().session().selected_industry().as_deref(), Some(picked));
        }

        #[tokio::test]
        async fn test_form_not_visible_is_form_not_opened() {
            let ctx = Context::new(Arc::new(FakeAuthApp::new()), Timeouts::uniform(30), "http://fake.local/");
            ctx.navigate("/").await.unwrap();
            let reg = RegistrationPage::new(ctx);
            let err = reg.fill_sign_up_form(&form(), &SignUpOptions::unique()).await.unwrap_err();
            assert!(matches!(err, AuthCheckError::FormNotOpened { ms: 30 }));
        }
    }

    #[test]
    fn test_registry_lists_every_field() {
        let ctx = Context::new(Arc::new(FakeAuthApp::new()), Timeouts::default(), "http://fake.local/");
        let registry = RegistrationPage::new(ctx).registry();
        assert_eq!(registry.len(), 10);
        assert_eq!(
            registry.get("phoneField").unwrap().to_string(),
            "app-input >> has-text=\"Phone\" >> role=textbox"
        );
    }
}
