//! Text normalization for comparisons against visible UI text.
//!
//! Rendered text picks up line breaks, tabs and indentation from templates.
//! Every comparison in the page objects goes through [`normalize`] first so
//! that "Please,\n   enter your email address" and
//! "please, enter your email address" compare equal.

use serde::{Deserialize, Serialize};

/// How text is canonicalized before comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizeMode {
    /// Collapse whitespace, trim, and lowercase
    #[default]
    CaseInsensitive,
    /// Collapse whitespace and trim; case is significant
    CaseSensitive,
}

/// Collapse every run of whitespace to one space, trim the edges and,
/// in [`NormalizeMode::CaseInsensitive`], lowercase the result.
///
/// Pure and idempotent: `normalize(&normalize(s, m), m) == normalize(s, m)`.
#[must_use]
pub fn normalize(text: &str, mode: NormalizeMode) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match mode {
        NormalizeMode::CaseInsensitive => collapsed.to_lowercase(),
        NormalizeMode::CaseSensitive => collapsed,
    }
}

/// Normalize every string in a collection
#[must_use]
pub fn normalize_all<I, T>(texts: I, mode: NormalizeMode) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    texts
        .into_iter()
        .map(|t| normalize(t.as_ref(), mode))
        .collect()
}

/// Expected texts for a verification: one message or several
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expected(Vec<String>);

impl Expected {
    /// Borrow the expected messages
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    /// Number of expected messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is expected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Expected {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<String> for Expected {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<String>> for Expected {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl From<Vec<&str>> for Expected {
    fn from(value: Vec<&str>) -> Self {
        Self(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Expected {
    fn from(value: [&str; N]) -> Self {
        Self(value.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<&[&str]> for Expected {
    fn from(value: &[&str]) -> Self {
        Self(value.iter().map(|s| (*s).to_string()).collect())
    }
}
