//! Result and error types for authcheck.

use thiserror::Error;

/// Result type for authcheck operations
pub type AuthCheckResult<T> = Result<T, AuthCheckError>;

/// Errors that can occur while driving a page or running a scenario
#[derive(Debug, Error)]
pub enum AuthCheckError {
    /// The element that proves a navigation landed never became visible
    #[error("Navigation to {url} timed out after {ms}ms waiting for {waited_for}")]
    NavigationTimeout {
        /// URL that was requested
        url: String,
        /// Locator that was expected to become visible
        waited_for: String,
        /// Deadline in milliseconds
        ms: u64,
    },

    /// Neither sign-up entry point produced a visible registration form
    #[error("Sign-up form did not open within {ms}ms")]
    FormNotOpened {
        /// Deadline in milliseconds
        ms: u64,
    },

    /// A named option was absent from an option menu
    #[error("Option not found: {option}")]
    OptionNotFound {
        /// Accessible name of the missing option
        option: String,
    },

    /// Expected visible state or text was not matched
    #[error("Assertion error: {message}")]
    AssertionError {
        /// Error message
        message: String,
    },

    /// A click or fill exceeded its deadline
    #[error("{action} on {locator} timed out after {ms}ms")]
    ActionTimeout {
        /// Action name (click, fill)
        action: String,
        /// Locator description
        locator: String,
        /// Deadline in milliseconds
        ms: u64,
    },

    /// An action matched more than one element
    #[error("Strict mode violation: {locator} resolved to {count} elements")]
    StrictModeViolation {
        /// Locator description
        locator: String,
        /// Number of matches
        count: usize,
    },

    /// Whole scenario exceeded the test deadline
    #[error("Scenario '{name}' timed out after {ms}ms")]
    ScenarioTimeout {
        /// Scenario name
        name: String,
        /// Deadline in milliseconds
        ms: u64,
    },

    /// The driving session failed
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Invalid configuration or fixture
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl AuthCheckError {
    /// Create an assertion error
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionError {
            message: message.into(),
        }
    }

    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error came from a deadline rather than a mismatch
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::NavigationTimeout { .. }
                | Self::FormNotOpened { .. }
                | Self::ActionTimeout { .. }
                | Self::ScenarioTimeout { .. }
        )
    }
}
