//! Page Object Model support.
//!
//! A page object owns exactly one [`LocatorRegistry`]: the named, stable
//! semantic addresses of the elements on one logical screen. Entries are
//! descriptors only; resolving one twice yields logically equivalent
//! matches, never a cached handle.
//!
//! ## Toyota Way Application:
//! - **Poka-Yoke**: page objects expose typed locator fields, not strings
//! - **Muda**: scenarios reuse page operations instead of repeating selectors
//! - **Genchi Genbutsu**: registries mirror the actual page structure

use crate::locator::Locator;

/// Trait for page objects representing one screen or form of the UI.
///
/// # Example
///
/// ```ignore
/// impl<S: Session> PageObject for AuthPage<S> {
///     fn url_pattern(&self) -> &str {
///         "/"
///     }
///
///     fn registry(&self) -> LocatorRegistry {
///         LocatorRegistry::new("auth")
///             .with_locator("emailInput", self.elements().email_input.clone())
///     }
/// }
/// ```
pub trait PageObject {
    /// URL pattern of the screen (e.g., "/", "/sign-up")
    fn url_pattern(&self) -> &str;

    /// Named locators of this page, in declaration order
    fn registry(&self) -> LocatorRegistry;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Ordered map from element names to locator descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatorRegistry {
    page: String,
    entries: Vec<(String, Locator)>,
}

impl LocatorRegistry {
    /// Create a new empty registry for `page`
    #[must_use]
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            entries: Vec::new(),
        }
    }

    /// Add a locator; a repeated name replaces the earlier entry
    #[must_use]
    pub fn with_locator(mut self, name: impl Into<String>, locator: Locator) -> Self {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = locator;
        } else {
            self.entries.push((name, locator));
        }
        self
    }

    /// Page this registry belongs to
    #[must_use]
    pub fn page(&self) -> &str {
        &self.page
    }

    /// Get a locator by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Locator> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, l)| l)
    }

    /// Get all locator names
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Iterate `(name, locator)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Locator)> {
        self.entries.iter().map(|(n, l)| (n.as_str(), l))
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
