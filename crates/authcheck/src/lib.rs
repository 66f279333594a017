//! authcheck: page objects and scenarios for sign-in and sign-up flows
//!
//! Scenarios drive a web application through page objects. A page object
//! owns the locators of one screen and turns intentions ("log in", "fill
//! the sign-up form", "verify the error messages") into waits, clicks and
//! text checks against a [`Session`](driver::Session).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    AUTHCHECK Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Suites /   │    │ Page       │    │ Session    │            │
//! │   │ Scenario   │───►│ Objects    │───►│ (chromium  │            │
//! │   │ Runner     │    │ + Locators │    │  or fake)  │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         │                 │                                     │
//! │         ▼                 ▼                                     │
//! │   ┌────────────┐    ┌────────────┐                              │
//! │   │ Reports    │    │ Normalize  │                              │
//! │   │ (JSON)     │    │ + Assert   │                              │
//! │   └────────────┘    └────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use authcheck::prelude::*;
//!
//! let factory = Arc::new(FakeAppFactory::new());
//! let runner = SuiteRunner::new(factory, RunConfig::new());
//! let summary = runner.run_all(&SuiteKind::All.suites()).await?;
//! assert!(summary.all_passed());
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod assertion;
mod config;
mod context;
mod driver;
mod fixture;
mod locator;
mod normalize;
mod page_object;
mod reporter;
mod result;
mod scenario;
mod wait;

/// Chromium sessions over CDP
#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc)]
pub mod browser;

/// In-memory simulated application
pub mod mock;

/// Sign-in and registration page objects
pub mod pages;

/// Login and registration suites
pub mod suites;

pub use assertion::{Assertion, AssertionResult, Expect};
pub use config::{resolve_url, RunConfig, Timeouts, DEFAULT_BASE_URL, DEFAULT_CONFIG_FILE};
pub use context::Context;
pub use driver::{ElementHandle, Session, SessionFactory};
pub use fixture::{CredentialSet, Credentials};
pub use locator::{Locator, NameMatch, Role, Selector, JS_HELPERS};
pub use normalize::{normalize, normalize_all, Expected, NormalizeMode};
pub use page_object::{LocatorRegistry, PageObject};
pub use reporter::{
    slug, write_failure_screenshot, AttemptReport, RunSummary, ScenarioReport, StepReport,
    SuiteReport, TestStatus, FAILURE_SCREENSHOT, REPORT_FILE,
};
pub use result::{AuthCheckError, AuthCheckResult};
pub use scenario::{Suite, SuiteRunner, TestCase, TestFn, World};
pub use wait::{wait_until, WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_MS};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::mock::{EntryPoint, FakeAppFactory, FakeAuthApp};
    pub use super::pages::*;
    pub use super::suites::*;
    pub use super::*;
    pub use std::sync::Arc;
}
