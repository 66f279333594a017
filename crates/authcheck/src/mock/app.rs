//! In-memory stand-in for the application under test.
//!
//! [`FakeAuthApp`] renders a sign-in screen, a sign-up form with industry
//! and country option menus, and a dashboard with a logout control. It
//! re-renders its element tree on every query, so stale element handles
//! cannot survive a state change, and it validates submissions the way the
//! real application does: per-field `.__error` messages, a toast for a
//! duplicate registration.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::dom::{Dom, Element, NodeId};
use crate::driver::{ElementHandle, Session, SessionFactory};
use crate::locator::Selector;
use crate::pages::registration::INDUSTRIES;
use crate::result::{AuthCheckError, AuthCheckResult};

/// Accounts every fresh [`Backend`] starts with
pub const DEFAULT_ACCOUNTS: [(&str, &str); 2] = [
    ("turbo2387@mailinator.com", "Qwerty123!"),
    ("test@gmail.com", "Qwerty123!"),
];

/// Country codes offered by the phone prefix menu
pub const DEFAULT_COUNTRY_CODES: [&str; 4] = ["+1", "+44", "+48", "+380"];

/// Toast shown when a registration is rejected
pub const SIGN_UP_REJECTED: &str = "Invalid to sign up";

/// Toast shown when sign-in credentials are wrong
pub const SIGN_IN_REJECTED: &str = "Invalid email or password";

/// Screen currently rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Nothing rendered (before navigation, or an unresponsive app)
    #[default]
    Blank,
    /// Sign-in form
    Login,
    /// Registration form
    SignUp,
    /// Signed-in landing page
    Dashboard,
}

/// How the sign-in screen links to registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryPoint {
    /// Dedicated "Sign Up Now" button
    #[default]
    SignUpNow,
    /// A differently worded button ("Sign up")
    SignUpButton,
    /// A link instead of a button
    SignUpLink,
    /// No entry point at all
    Absent,
}

/// Accounts shared by every session of one factory
#[derive(Debug, Default)]
pub struct Backend {
    accounts: Mutex<BTreeMap<String, String>>,
}

impl Backend {
    /// Backend seeded with [`DEFAULT_ACCOUNTS`]
    #[must_use]
    pub fn seeded() -> Self {
        let accounts = DEFAULT_ACCOUNTS
            .iter()
            .map(|(e, p)| ((*e).to_string(), (*p).to_string()))
            .collect();
        Self {
            accounts: Mutex::new(accounts),
        }
    }

    fn accounts(&self) -> AuthCheckResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.accounts
            .lock()
            .map_err(|_| AuthCheckError::session("account store poisoned"))
    }

    /// Whether an account exists
    #[must_use]
    pub fn contains(&self, email: &str) -> bool {
        self.accounts()
            .map(|a| a.contains_key(&email.to_lowercase()))
            .unwrap_or(false)
    }

    /// Create an account; false when the e-mail is taken
    pub fn register(&self, email: &str, password: &str) -> AuthCheckResult<bool> {
        let mut accounts = self.accounts()?;
        let key = email.to_lowercase();
        if accounts.contains_key(&key) {
            return Ok(false);
        }
        let _ = accounts.insert(key, password.to_string());
        Ok(true)
    }

    /// Check a credential pair
    pub fn authenticate(&self, email: &str, password: &str) -> AuthCheckResult<bool> {
        Ok(self
            .accounts()?
            .get(&email.to_lowercase())
            .is_some_and(|p| p == password))
    }

    /// Number of accounts
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts().map(|a| a.len()).unwrap_or(0)
    }

    /// Whether no account exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Menu {
    Industry,
    Country,
}

#[derive(Debug, Default)]
struct AppState {
    url: String,
    screen: Screen,
    fields: BTreeMap<&'static str, String>,
    errors: BTreeMap<&'static str, &'static str>,
    toast: Option<&'static str>,
    menu: Option<Menu>,
    industry: Option<String>,
    country: Option<String>,
    user: Option<String>,
    calls: Vec<String>,
}

impl AppState {
    fn reset_form(&mut self) {
        self.fields.clear();
        self.errors.clear();
        self.toast = None;
        self.menu = None;
        self.industry = None;
        self.country = None;
    }

    fn field(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", String::as_str)
    }
}

/// Simulated sign-in / sign-up application implementing [`Session`]
#[derive(Debug)]
pub struct FakeAuthApp {
    state: Mutex<AppState>,
    backend: Arc<Backend>,
    entry: EntryPoint,
    country_codes: Vec<String>,
    unresponsive: bool,
}

impl Default for FakeAuthApp {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeAuthApp {
    /// Create a new app with its own seeded backend
    #[must_use]
    pub fn new() -> Self {
        Self::with_backend(Arc::new(Backend::seeded()))
    }

    /// Create a new app sharing `backend`
    #[must_use]
    pub fn with_backend(backend: Arc<Backend>) -> Self {
        Self {
            state: Mutex::new(AppState::default()),
            backend,
            entry: EntryPoint::default(),
            country_codes: DEFAULT_COUNTRY_CODES.iter().map(|c| (*c).to_string()).collect(),
            unresponsive: false,
        }
    }

    /// Choose how the sign-in screen links to registration
    #[must_use]
    pub const fn with_entry_point(mut self, entry: EntryPoint) -> Self {
        self.entry = entry;
        self
    }

    /// Replace the country code menu
    #[must_use]
    pub fn with_country_codes<I, T>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.country_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Never render anything after navigation
    #[must_use]
    pub const fn unresponsive(mut self) -> Self {
        self.unresponsive = true;
        self
    }

    /// Shared account store
    #[must_use]
    pub fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }

    fn state(&self) -> AuthCheckResult<MutexGuard<'_, AppState>> {
        self.state
            .lock()
            .map_err(|_| AuthCheckError::session("app state poisoned"))
    }

    /// Force a screen, as if the application re-rendered on its own
    pub fn set_screen(&self, screen: Screen) {
        if let Ok(mut state) = self.state() {
            state.screen = screen;
        }
    }

    /// Screen currently rendered
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.state().map(|s| s.screen).unwrap_or_default()
    }

    /// Value typed into a form field (`email`, `first-name`, ...)
    #[must_use]
    pub fn field_value(&self, field: &str) -> Option<String> {
        self.state().ok().and_then(|s| s.fields.get(field).cloned())
    }

    /// Industry picked from the menu
    #[must_use]
    pub fn selected_industry(&self) -> Option<String> {
        self.state().ok().and_then(|s| s.industry.clone())
    }

    /// Country code picked from the menu
    #[must_use]
    pub fn selected_country(&self) -> Option<String> {
        self.state().ok().and_then(|s| s.country.clone())
    }

    /// E-mail of the signed-in user
    #[must_use]
    pub fn signed_in_user(&self) -> Option<String> {
        self.state().ok().and_then(|s| s.user.clone())
    }

    /// Every session call so far (`goto <url>`, `click <selector>`, ...)
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state().map(|s| s.calls.clone()).unwrap_or_default()
    }

    /// Whether a call starting with `prefix` was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    fn render(&self, state: &AppState) -> Dom {
        let body = match state.screen {
            Screen::Blank => Element::new("body"),
            Screen::Login => Element::new("body").child(self.render_login(state)),
            Screen::SignUp => Element::new("body")
                .child(render_sign_up(state))
                .child_opt(state.menu.map(|m| self.render_menu(m))),
            Screen::Dashboard => Element::new("body").child(render_dashboard(state)),
        };
        Dom::from_root(body.child_opt(state.toast.map(|t| {
            Element::new("div")
                .class("toast")
                .attr("role", "alert")
                .text(format!("\n    {t}\n  "))
        })))
    }

    fn render_login(&self, state: &AppState) -> Element {
        let entry = match self.entry {
            EntryPoint::SignUpNow => Some(
                Element::new("div").class("sign-up-cta").children([
                    Element::new("span").text("Don't have an account?"),
                    Element::new("button")
                        .attr("type", "button")
                        .attr("data-action", "open-sign-up")
                        .text("Sign Up Now"),
                ]),
            ),
            EntryPoint::SignUpButton => Some(
                Element::new("button")
                    .attr("type", "button")
                    .attr("data-action", "open-sign-up")
                    .text("Sign up"),
            ),
            EntryPoint::SignUpLink => Some(
                Element::new("a")
                    .attr("href", "/sign-up")
                    .attr("data-action", "open-sign-up")
                    .text("New here? Sign up"),
            ),
            EntryPoint::Absent => None,
        };

        Element::new("form")
            .class("sign-in")
            .children([
                Element::new("h1").text("Welcome back"),
                input_group(state, "Email", "email", "email"),
                input_group(state, "Password", "password", "password"),
                Element::new("button")
                    .attr("type", "submit")
                    .attr("data-action", "sign-in")
                    .text("Sign In"),
            ])
            .child_opt(entry)
    }

    fn render_menu(&self, menu: Menu) -> Element {
        let (action, options): (&str, Vec<String>) = match menu {
            Menu::Industry => (
                "pick-industry",
                INDUSTRIES.iter().map(|i| (*i).to_string()).collect(),
            ),
            Menu::Country => ("pick-country", self.country_codes.clone()),
        };
        Element::new("div")
            .class("cdk-overlay-pane")
            .attr("role", "listbox")
            .children(options.into_iter().map(|o| {
                Element::new("mat-option")
                    .attr("role", "option")
                    .attr("data-action", action)
                    .attr("data-value", o.clone())
                    .text(o)
            }))
    }

    fn dispatch(&self, state: &mut AppState, dom: &Dom, id: NodeId) -> AuthCheckResult<()> {
        let Some((target, action)) = action_target(dom, id) else {
            return Ok(());
        };
        tracing::trace!(action, "fake app dispatch");
        match action {
            "sign-in" => self.submit_sign_in(state)?,
            "open-sign-up" => {
                state.reset_form();
                state.screen = Screen::SignUp;
            }
            "sign-up" => self.submit_sign_up(state)?,
            "open-industry" => state.menu = toggle(state.menu, Menu::Industry),
            "open-country" => state.menu = toggle(state.menu, Menu::Country),
            "pick-industry" | "pick-country" => {
                let value = dom.node(target).attr("data-value").map(str::to_string);
                if action == "pick-industry" {
                    state.industry = value;
                } else {
                    state.country = value;
                }
                state.menu = None;
            }
            "logout" => {
                state.user = None;
                state.reset_form();
                state.screen = Screen::Login;
            }
            _ => {}
        }
        Ok(())
    }

    fn submit_sign_in(&self, state: &mut AppState) -> AuthCheckResult<()> {
        state.errors.clear();
        state.toast = None;
        let email = state.field("email").to_string();
        let password = state.field("password").to_string();

        if email.is_empty() {
            let _ = state.errors.insert("email", "Please, enter your email address");
        } else if !is_email(&email) {
            let _ = state.errors.insert("email", "Invalid email address");
        }
        if password.is_empty() {
            let _ = state.errors.insert("password", "The Password is required");
        }
        if !state.errors.is_empty() {
            return Ok(());
        }

        if self.backend.authenticate(&email, &password)? {
            state.user = Some(email);
            state.reset_form();
            state.screen = Screen::Dashboard;
        } else {
            state.toast = Some(SIGN_IN_REJECTED);
        }
        Ok(())
    }

    fn submit_sign_up(&self, state: &mut AppState) -> AuthCheckResult<()> {
        state.errors.clear();
        state.toast = None;
        for (field, message) in [
            ("first-name", "The First Name is required"),
            ("last-name", "The Last Name is required"),
            ("company-name", "The Company Name is required"),
            ("email", "Please, enter your email address"),
            ("phone", "The Phone is required"),
            ("password", "The Password is required"),
        ] {
            if state.field(field).trim().is_empty() {
                let _ = state.errors.insert(field, message);
            }
        }
        let email = state.field("email").to_string();
        if !email.is_empty() && !is_email(&email) {
            let _ = state.errors.insert("email", "Invalid email address");
        }
        if !state.errors.is_empty() {
            return Ok(());
        }

        let password = state.field("password").to_string();
        if self.backend.register(&email, &password)? {
            state.user = Some(email);
            state.reset_form();
            state.screen = Screen::Dashboard;
        } else {
            state.toast = Some(SIGN_UP_REJECTED);
        }
        Ok(())
    }

    fn target(&self, state: &AppState, selector: &Selector, index: usize) -> AuthCheckResult<(Dom, NodeId)> {
        let dom = self.render(state);
        let ids = dom.resolve(selector)?;
        let id = *ids.get(index).ok_or_else(|| {
            AuthCheckError::session(format!("no element {index} for {selector} ({} matched)", ids.len()))
        })?;
        Ok((dom, id))
    }
}

#[async_trait]
impl Session for FakeAuthApp {
    async fn goto(&self, url: &str) -> AuthCheckResult<()> {
        let mut state = self.state()?;
        state.calls.push(format!("goto {url}"));
        state.url = url.to_string();
        state.reset_form();
        state.user = None;
        state.screen = if self.unresponsive {
            Screen::Blank
        } else if url.trim_end_matches('/').ends_with("/sign-up") {
            Screen::SignUp
        } else {
            Screen::Login
        };
        Ok(())
    }

    async fn query_all(&self, selector: &Selector) -> AuthCheckResult<Vec<ElementHandle>> {
        let state = self.state()?;
        let dom = self.render(&state);
        Ok(dom.resolve(selector)?.into_iter().map(|id| dom.handle(id)).collect())
    }

    async fn click(&self, selector: &Selector, index: usize) -> AuthCheckResult<()> {
        let mut state = self.state()?;
        state.calls.push(format!("click {selector}"));
        let (dom, id) = self.target(&state, selector, index)?;
        self.dispatch(&mut state, &dom, id)
    }

    async fn fill(&self, selector: &Selector, index: usize, text: &str) -> AuthCheckResult<()> {
        let mut state = self.state()?;
        state.calls.push(format!("fill {selector}"));
        let (dom, id) = self.target(&state, selector, index)?;
        let node = dom.node(id);
        let field = match (node.tag.as_str(), node.attr("data-field")) {
            ("input" | "textarea", Some(f)) => field_key(f),
            _ => None,
        };
        let Some(field) = field else {
            return Err(AuthCheckError::session(format!("{selector} is not a fillable input")));
        };
        let _ = state.fields.insert(field, text.to_string());
        Ok(())
    }

    async fn current_url(&self) -> AuthCheckResult<String> {
        Ok(self.state()?.url.clone())
    }

    async fn screenshot(&self) -> AuthCheckResult<Vec<u8>> {
        // PNG signature only; enough for artifact plumbing
        Ok(vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'])
    }
}

/// Opens one [`FakeAuthApp`] per scenario attempt, all sharing one backend
#[derive(Debug)]
pub struct FakeAppFactory {
    backend: Arc<Backend>,
    entry: EntryPoint,
    unresponsive_left: AtomicUsize,
    opened: AtomicUsize,
}

impl Default for FakeAppFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeAppFactory {
    /// Create a new factory with a seeded backend
    #[must_use]
    pub fn new() -> Self {
        Self {
            backend: Arc::new(Backend::seeded()),
            entry: EntryPoint::default(),
            unresponsive_left: AtomicUsize::new(0),
            opened: AtomicUsize::new(0),
        }
    }

    /// Choose the sign-up entry point of every session
    #[must_use]
    pub const fn with_entry_point(mut self, entry: EntryPoint) -> Self {
        self.entry = entry;
        self
    }

    /// The first `n` sessions never render anything
    #[must_use]
    pub fn with_unresponsive_sessions(self, n: usize) -> Self {
        self.unresponsive_left.store(n, Ordering::SeqCst);
        self
    }

    /// Shared account store
    #[must_use]
    pub fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }

    /// Sessions opened so far
    #[must_use]
    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for FakeAppFactory {
    type Session = FakeAuthApp;

    async fn open(&self) -> AuthCheckResult<FakeAuthApp> {
        let _ = self.opened.fetch_add(1, Ordering::SeqCst);
        let broken = self
            .unresponsive_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let app = FakeAuthApp::with_backend(Arc::clone(&self.backend)).with_entry_point(self.entry);
        Ok(if broken { app.unresponsive() } else { app })
    }
}

fn render_sign_up(state: &AppState) -> Element {
    let industry = state.industry.clone().unwrap_or_else(|| "Industry".to_string());
    let country = state.country.clone().unwrap_or_else(|| "Code".to_string());
    Element::new("form").class("sign-up").children([
        Element::new("h1").text("Create your account"),
        input_group(state, "First Name", "first-name", "text"),
        input_group(state, "Last Name", "last-name", "text"),
        input_group(state, "Company Name", "company-name", "text"),
        input_group(state, "Email", "email", "email"),
        input_group(state, "Password", "password", "password"),
        Element::new("app-select")
            .attr("formcontrolname", "industry")
            .attr("data-action", "open-industry")
            .text(industry),
        Element::new("div").class("phone-row").children([
            Element::new("div")
                .attr("placeholder", "Country")
                .attr("data-action", "open-country")
                .text(country),
            input_group(state, "Phone", "phone", "tel"),
        ]),
        Element::new("button")
            .attr("type", "submit")
            .attr("data-action", "sign-up")
            .text("Sign Up"),
        Element::new("a").attr("href", "/").text("Already registered? Sign In"),
    ])
}

fn render_dashboard(state: &AppState) -> Element {
    Element::new("header").children([
        Element::new("span").text(format!("Signed in as {}", state.user.as_deref().unwrap_or(""))),
        Element::new("button")
            .attr("type", "button")
            .attr("data-action", "logout")
            .text("Logout"),
    ])
}

/// `<app-input>` with label, input and (after a failed submit) its error
fn input_group(state: &AppState, label: &str, field: &'static str, input_type: &str) -> Element {
    let error = state.errors.get(field).map(|msg| {
        Element::new("div")
            .class("__error")
            .text(format!("\n      {msg}\n    "))
    });
    Element::new("app-input")
        .children([
            Element::new("label").text(label),
            Element::new("input")
                .attr("type", input_type)
                .attr("data-field", field)
                .attr("value", state.field(field)),
        ])
        .child_opt(error)
}

fn field_key(name: &str) -> Option<&'static str> {
    ["email", "password", "first-name", "last-name", "company-name", "phone"]
        .into_iter()
        .find(|f| *f == name)
}

/// Nearest node at or above `id` carrying a `data-action`, like event bubbling
fn action_target(dom: &Dom, id: NodeId) -> Option<(NodeId, &str)> {
    let mut cur = Some(id);
    while let Some(n) = cur {
        let node = dom.node(n);
        if let Some(action) = node.attr("data-action") {
            return Some((n, action));
        }
        cur = node.parent;
    }
    None
}

fn toggle(current: Option<Menu>, menu: Menu) -> Option<Menu> {
    if current == Some(menu) {
        None
    } else {
        Some(menu)
    }
}

fn is_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !s.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{Locator, Role};

    async fn on_login() -> FakeAuthApp {
        let app = FakeAuthApp::new();
        app.goto("http://fake.local/").await.unwrap();
        app
    }

    async fn count(app: &FakeAuthApp, loc: &Locator) -> usize {
        app.query_all(loc.selector()).await.unwrap().len()
    }

    mod login_tests {
        use super::*;

        #[tokio::test]
        async fn test_login_screen_has_two_inputs() {
            let app = on_login().await;
            assert_eq!(app.screen(), Screen::Login);
            assert_eq!(count(&app, &Locator::css("input")).await, 2);
        }

        #[tokio::test]
        async fn test_empty_submit_shows_errors() {
            let app = on_login().await;
            let submit = Locator::role(Role::Button).name("Sign In").exact();
            app.click(submit.selector(), 0).await.unwrap();
            let errors = app.query_all(&Selector::css(".__error")).await.unwrap();
            assert_eq!(errors.len(), 2);
            assert!(errors[0].text.contains("Please, enter your email address"));
        }

        #[tokio::test]
        async fn test_valid_login_reaches_dashboard() {
            let app = on_login().await;
            app.fill(&Selector::css("input[type=\"email\"]"), 0, "turbo2387@mailinator.com")
                .await
                .unwrap();
            app.fill(&Selector::css("input[type=\"password\"]"), 0, "Qwerty123!")
                .await
                .unwrap();
            app.click(Locator::role(Role::Button).name("Sign In").exact().selector(), 0)
                .await
                .unwrap();
            assert_eq!(app.screen(), Screen::Dashboard);
            assert_eq!(count(&app, &Locator::role(Role::Button).name("Logout")).await, 1);
        }

        #[tokio::test]
        async fn test_wrong_password_shows_toast() {
            let app = on_login().await;
            app.fill(&Selector::css("input[type=\"email\"]"), 0, "test@gmail.com")
                .await
                .unwrap();
            app.fill(&Selector::css("input[type=\"password\"]"), 0, "nope")
                .await
                .unwrap();
            app.click(&Selector::css("button[type=\"submit\"]"), 0).await.unwrap();
            let toast = app.query_all(&Selector::role(Role::Alert)).await.unwrap();
            assert_eq!(toast.len(), 1);
            assert!(toast[0].text.contains(SIGN_IN_REJECTED));
        }

        #[tokio::test]
        async fn test_fill_non_input_is_session_error() {
            let app = on_login().await;
            let err = app.fill(&Selector::css("h1"), 0, "x").await.unwrap_err();
            assert!(matches!(err, AuthCheckError::Session { .. }));
        }
    }

    mod sign_up_tests {
        use super::*;

        #[tokio::test]
        async fn test_entry_variants() {
            for (entry, role) in [
                (EntryPoint::SignUpNow, Role::Button),
                (EntryPoint::SignUpButton, Role::Button),
                (EntryPoint::SignUpLink, Role::Link),
            ] {
                let app = FakeAuthApp::new().with_entry_point(entry);
                app.goto("http://fake.local/").await.unwrap();
                let loc = Locator::role(role).name_matching("sign up");
                assert_eq!(count(&app, &loc).await, 1, "{entry:?}");
                app.click(loc.selector(), 0).await.unwrap();
                assert_eq!(app.screen(), Screen::SignUp);
            }
        }

        #[tokio::test]
        async fn test_menus_select_values() {
            let app = FakeAuthApp::new();
            app.goto("http://fake.local/sign-up").await.unwrap();
            app.click(&Selector::css("[formcontrolname=\"industry\"]"), 0)
                .await
                .unwrap();
            assert_eq!(count(&app, &Locator::role(Role::Option)).await, INDUSTRIES.len());
            app.click(Locator::role(Role::Option).name("Medical").selector(), 0)
                .await
                .unwrap();
            assert_eq!(app.selected_industry().as_deref(), Some("Medical"));
            assert_eq!(count(&app, &Locator::role(Role::Option)).await, 0);

            app.click(&Selector::css("[placeholder=\"Country\"]"), 0).await.unwrap();
            app.click(Locator::role(Role::Option).name("+380").selector(), 0)
                .await
                .unwrap();
            assert_eq!(app.selected_country().as_deref(), Some("+380"));
        }

        #[tokio::test]
        async fn test_duplicate_registration_is_rejected() {
            let app = FakeAuthApp::new();
            app.goto("http://fake.local/sign-up").await.unwrap();
            for (field, value) in [
                ("First Name", "A"),
                ("Last Name", "B"),
                ("Company Name", "C"),
                ("Phone", "664089599"),
            ] {
                let loc = Locator::css("app-input")
                    .filter_has_text(field)
                    .get_by_role(Role::Textbox);
                app.fill(loc.selector(), 0, value).await.unwrap();
            }
            app.fill(&Selector::css("input[type=\"email\"]"), 0, "turbo2387@mailinator.com")
                .await
                .unwrap();
            app.fill(&Selector::css("input[type=\"password\"]"), 0, "Qwerty123!")
                .await
                .unwrap();
            app.click(Locator::role(Role::Button).name("Sign Up").exact().selector(), 0)
                .await
                .unwrap();
            let toast = Locator::role(Role::Alert).name(SIGN_UP_REJECTED);
            assert_eq!(count(&app, &toast).await, 1);
            assert_eq!(app.screen(), Screen::SignUp);
        }
    }

    #[tokio::test]
    async fn test_unresponsive_renders_nothing() {
        let app = FakeAuthApp::new().unresponsive();
        app.goto("http://fake.local/").await.unwrap();
        assert_eq!(app.screen(), Screen::Blank);
        assert_eq!(count(&app, &Locator::css("input")).await, 0);
    }

    #[tokio::test]
    async fn test_factory_shares_backend_and_counts_sessions() {
        let factory = FakeAppFactory::new().with_unresponsive_sessions(1);
        let first = factory.open().await.unwrap();
        first.goto("http://fake.local/").await.unwrap();
        assert_eq!(first.screen(), Screen::Blank);
        let second = factory.open().await.unwrap();
        second.goto("http://fake.local/").await.unwrap();
        assert_eq!(second.screen(), Screen::Login);
        assert_eq!(factory.sessions_opened(), 2);
        assert!(Arc::ptr_eq(first.backend(), factory.backend()));
    }

    #[test]
    fn test_is_email() {
        assert!(is_email("test+123456@gmail.com"));
        assert!(!is_email("invalid-email"));
        assert!(!is_email("a@b"));
        assert!(!is_email("a b@c.com"));
    }
}
