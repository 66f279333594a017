//! Credential fixture.
//!
//! Named credential sets handed to scenarios as plain string pairs.
//! Defaults can be overridden from a YAML file or from the environment
//! (`AUTH_EMAIL`, `AUTH_PASSWORD`, `AUTH_INVALID_EMAIL`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::result::{AuthCheckError, AuthCheckResult};

/// Credentials used by the login scenarios
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Registered e-mail
    pub email: String,
    /// Password of `email`
    pub password: String,
    /// Value typed for an "empty" e-mail
    pub email_empty: String,
    /// Value typed for an "empty" password
    pub password_empty: String,
    /// Syntactically invalid e-mail
    pub invalid_email: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: "turbo2387@mailinator.com".to_string(),
            password: "Qwerty123!".to_string(),
            email_empty: String::new(),
            password_empty: String::new(),
            invalid_email: "invalid-email".to_string(),
        }
    }
}

// Passwords stay out of logs and reports
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .field("invalid_email", &self.invalid_email)
            .finish_non_exhaustive()
    }
}

/// Named credential set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialSet {
    /// Registered e-mail and its password
    Valid,
    /// Both fields empty
    Empty,
    /// Malformed e-mail with a valid password
    InvalidFormat,
}

impl Credentials {
    /// Parse a YAML document; missing fields keep their defaults
    pub fn from_yaml_str(yaml: &str) -> AuthCheckResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load a YAML file
    pub fn load(path: &Path) -> AuthCheckResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AuthCheckError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Apply `AUTH_*` overrides from an arbitrary lookup
    #[must_use]
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("AUTH_EMAIL") {
            self.email = v;
        }
        if let Some(v) = lookup("AUTH_PASSWORD") {
            self.password = v;
        }
        if let Some(v) = lookup("AUTH_INVALID_EMAIL") {
            self.invalid_email = v;
        }
        self
    }

    /// `(email, password)` for a named set
    #[must_use]
    pub fn set(&self, set: CredentialSet) -> (&str, &str) {
        match set {
            CredentialSet::Valid => (&self.email, &self.password),
            CredentialSet::Empty => (&self.email_empty, &self.password_empty),
            CredentialSet::InvalidFormat => (&self.invalid_email, &self.password),
        }
    }
}
