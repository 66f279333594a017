//! Simulated application for running scenarios without a browser.
//!
//! ```rust,ignore
//! use authcheck::mock::{FakeAppFactory, EntryPoint};
//!
//! let factory = FakeAppFactory::new().with_entry_point(EntryPoint::SignUpLink);
//! let session = factory.open().await?;
//! ```

pub mod app;
pub mod dom;

pub use app::{
    Backend, EntryPoint, FakeAppFactory, FakeAuthApp, Screen, DEFAULT_ACCOUNTS,
    DEFAULT_COUNTRY_CODES, SIGN_IN_REJECTED, SIGN_UP_REJECTED,
};
pub use dom::{Dom, Element, Node, NodeId};
