//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a pure descriptor: a selector strategy plus its
//! parameters. Nothing is resolved when a locator is built. Every action
//! hands the descriptor to the [`Session`](crate::driver::Session), which
//! queries the live document again, so a re-render between two steps can
//! never leave a page object holding a stale element.
//!
//! # Strategies
//!
//! - **CSS**: `input[type="email"]`, `.__error`, `[placeholder="Country"]`
//! - **Role**: ARIA role plus accessible name (substring, exact, or pattern)
//! - **Filter**: keep matches whose visible text contains a string
//! - **Descendant**: resolve a child strategy inside every parent match
//!
//! ```ignore
//! let first_name = Locator::css("app-input")
//!     .filter_has_text("First Name")
//!     .get_by_role(Role::Textbox);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::result::{AuthCheckError, AuthCheckResult};

/// ARIA roles the page objects address elements by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// `<button>`, `input[type=submit]`, `[role=button]`
    Button,
    /// `<a href>`, `[role=link]`
    Link,
    /// Text-like `<input>`, `<textarea>`, `[role=textbox]`
    Textbox,
    /// `<option>`, `[role=option]`
    Option,
    /// `[role=alert]`
    Alert,
}

impl Role {
    /// ARIA role name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Link => "link",
            Self::Textbox => "textbox",
            Self::Option => "option",
            Self::Alert => "alert",
        }
    }

    /// Parse an ARIA role name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "button" => Some(Self::Button),
            "link" => Some(Self::Link),
            "textbox" => Some(Self::Textbox),
            "option" => Some(Self::Option),
            "alert" => Some(Self::Alert),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an accessible name is matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatch {
    /// Literal text. Non-exact is a case-insensitive substring match,
    /// exact is a case-sensitive full match. Whitespace is normalized first.
    Text {
        /// Expected name
        value: String,
        /// Require a full, case-sensitive match
        exact: bool,
    },
    /// Regular expression tested against the normalized name
    Pattern {
        /// Regex source
        source: String,
        /// Compile with the `i` flag
        case_insensitive: bool,
    },
}

impl NameMatch {
    /// Test an accessible name against this matcher
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a pattern does not compile.
    pub fn matches(&self, name: &str) -> AuthCheckResult<bool> {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        match self {
            Self::Text { value, exact: true } => Ok(name == *value),
            Self::Text {
                value,
                exact: false,
            } => Ok(name.to_lowercase().contains(&value.to_lowercase())),
            Self::Pattern {
                source,
                case_insensitive,
            } => {
                let re = regex::RegexBuilder::new(source)
                    .case_insensitive(*case_insensitive)
                    .build()
                    .map_err(|e| AuthCheckError::config(format!("bad name pattern /{source}/: {e}")))?;
                Ok(re.is_match(&name))
            }
        }
    }

    fn to_js_test(&self) -> String {
        match self {
            Self::Text { value, exact: true } => format!("n === {}", js_str(value)),
            Self::Text {
                value,
                exact: false,
            } => format!(
                "n.toLowerCase().includes({}.toLowerCase())",
                js_str(value)
            ),
            Self::Pattern {
                source,
                case_insensitive,
            } => format!(
                "new RegExp({}, {}).test(n)",
                js_str(source),
                js_str(if *case_insensitive { "i" } else { "" })
            ),
        }
    }
}

impl fmt::Display for NameMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { value, exact } => {
                write!(f, "\"{value}\"")?;
                if *exact {
                    f.write_str(" exact")?;
                }
                Ok(())
            }
            Self::Pattern {
                source,
                case_insensitive,
            } => write!(f, "/{source}/{}", if *case_insensitive { "i" } else { "" }),
        }
    }
}

/// Selector strategy for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., `input[type="password"]`)
    Css(String),
    /// ARIA role with optional accessible name
    Role {
        /// Role to match
        role: Role,
        /// Accessible name filter
        name: Option<NameMatch>,
    },
    /// Keep base matches whose visible text contains `has_text`
    /// (case-insensitive, whitespace-normalized)
    Filter {
        /// Base strategy
        base: Box<Selector>,
        /// Text the container must contain
        has_text: String,
    },
    /// Resolve `child` inside every match of `parent`
    Descendant {
        /// Container strategy
        parent: Box<Selector>,
        /// Strategy applied inside each container
        child: Box<Selector>,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a role selector without a name filter
    #[must_use]
    pub const fn role(role: Role) -> Self {
        Self::Role { role, name: None }
    }

    /// JavaScript expression (evaluated with [`JS_HELPERS`] in scope as `H`)
    /// producing an array of the matched elements under `root`.
    #[must_use]
    pub fn to_js(&self, root: &str) -> String {
        match self {
            Self::Css(css) => format!("H.all({root}, {})", js_str(css)),
            Self::Role { role, name } => {
                let test = name
                    .as_ref()
                    .map_or_else(|| "true".to_string(), NameMatch::to_js_test);
                format!("H.byRole({root}, {}, n => {test})", js_str(role.as_str()))
            }
            Self::Filter { base, has_text } => format!(
                "({}).filter(e => H.text(e).toLowerCase().includes({}.toLowerCase()))",
                base.to_js(root),
                js_str(has_text)
            ),
            Self::Descendant { parent, child } => format!(
                "H.uniq(({}).flatMap(p => {}))",
                parent.to_js(root),
                child.to_js("p")
            ),
        }
    }

    /// Self-contained script returning `[{tag, text, visible}]` for every match
    #[must_use]
    pub fn to_query(&self) -> String {
        format!(
            "(() => {{ {JS_HELPERS} return ({}).map(e => ({{ tag: e.tagName.toLowerCase(), text: H.text(e), visible: H.visible(e) }})); }})()",
            self.to_js("document")
        )
    }

    /// Script that tags the `index`-th match with `data-authcheck-id="{marker}"`
    /// and returns whether the element existed
    #[must_use]
    pub fn to_mark_query(&self, index: usize, marker: &str) -> String {
        format!(
            "(() => {{ {JS_HELPERS} const e = ({})[{index}]; if (!e) return false; e.setAttribute('data-authcheck-id', {}); return true; }})()",
            self.to_js("document"),
            js_str(marker)
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => f.write_str(css),
            Self::Role { role, name: None } => write!(f, "role={role}"),
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "role={role}[name={name}]"),
            Self::Filter { base, has_text } => write!(f, "{base} >> has-text=\"{has_text}\""),
            Self::Descendant { parent, child } => write!(f, "{parent} >> {child}"),
        }
    }
}

/// Helper object shared by every generated query
pub const JS_HELPERS: &str = r#"const H = {
  norm: s => (s || '').replace(/\s+/g, ' ').trim(),
  visible: e => {
    if (!e || !e.isConnected) return false;
    const st = getComputedStyle(e);
    if (st.visibility === 'hidden' || st.display === 'none') return false;
    const r = e.getBoundingClientRect();
    return r.width > 0 && r.height > 0;
  },
  role: e => {
    const explicit = e.getAttribute('role');
    if (explicit) return explicit;
    const t = e.tagName.toLowerCase();
    const ty = (e.getAttribute('type') || 'text').toLowerCase();
    if (t === 'button') return 'button';
    if (t === 'a' && e.hasAttribute('href')) return 'link';
    if (t === 'input') {
      if (['button', 'submit', 'reset', 'image'].includes(ty)) return 'button';
      if (['text', 'email', 'tel', 'url', 'search'].includes(ty)) return 'textbox';
      return null;
    }
    if (t === 'textarea') return 'textbox';
    if (t === 'option') return 'option';
    return null;
  },
  name: e => H.norm(e.getAttribute('aria-label') || e.innerText || e.value || e.getAttribute('placeholder') || e.getAttribute('title') || ''),
  text: e => H.norm(e.innerText !== undefined ? e.innerText : e.textContent),
  all: (root, css) => Array.from(root.querySelectorAll(css)),
  byRole: (root, role, test) => H.all(root, '*').filter(e => H.role(e) === role && test(H.name(e))),
  uniq: els => Array.from(new Set(els)),
};"#;

fn js_str(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// A deferred, re-resolvable description of how to find elements.
///
/// Cloning a locator clones the description only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
}

impl Locator {
    /// Create a locator with a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            selector: Selector::css(selector),
        }
    }

    /// Create a locator matching an ARIA role
    #[must_use]
    pub const fn role(role: Role) -> Self {
        Self {
            selector: Selector::role(role),
        }
    }

    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self { selector }
    }

    /// Filter a role locator by accessible name (case-insensitive substring)
    ///
    /// Has no effect on non-role selectors.
    #[must_use]
    pub fn name(self, name: impl Into<String>) -> Self {
        self.with_name(NameMatch::Text {
            value: name.into(),
            exact: false,
        })
    }

    /// Require the accessible name to match exactly (case-sensitive)
    #[must_use]
    pub fn exact(self) -> Self {
        match self.selector {
            Selector::Role {
                role,
                name: Some(NameMatch::Text { value, .. }),
            } => Self {
                selector: Selector::Role {
                    role,
                    name: Some(NameMatch::Text { value, exact: true }),
                },
            },
            other => Self { selector: other },
        }
    }

    /// Filter a role locator by a case-insensitive name pattern
    #[must_use]
    pub fn name_matching(self, pattern: impl Into<String>) -> Self {
        self.with_name(NameMatch::Pattern {
            source: pattern.into(),
            case_insensitive: true,
        })
    }

    fn with_name(self, name: NameMatch) -> Self {
        match self.selector {
            Selector::Role { role, .. } => Self {
                selector: Selector::Role {
                    role,
                    name: Some(name),
                },
            },
            other => Self { selector: other },
        }
    }

    /// Keep only matches whose visible text contains `text`
    #[must_use]
    pub fn filter_has_text(self, text: impl Into<String>) -> Self {
        Self {
            selector: Selector::Filter {
                base: Box::new(self.selector),
                has_text: text.into(),
            },
        }
    }

    /// Match elements with `role` inside every current match
    #[must_use]
    pub fn get_by_role(self, role: Role) -> Self {
        self.within(Selector::role(role))
    }

    fn within(self, child: Selector) -> Self {
        Self {
            selector: Selector::Descendant {
                parent: Box::new(self.selector),
                child: Box::new(child),
            },
        }
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.selector.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod name_match_tests {
        use super::*;

        #[test]
        fn test_substring_is_case_insensitive() {
            let m = NameMatch::Text {
                value: "sign in".to_string(),
                exact: false,
            };
            assert!(m.matches("Sign In").unwrap());
            assert!(m.matches("  Please   SIGN IN now ").unwrap());
            assert!(!m.matches("Sign Up").unwrap());
        }

        #[test]
        fn test_exact_is_case_sensitive() {
            let m = NameMatch::Text {
                value: "Sign Up".to_string(),
                exact: true,
            };
            assert!(m.matches("Sign Up").unwrap());
            assert!(m.matches(" Sign\n Up ").unwrap());
            assert!(!m.matches("sign up").unwrap());
            assert!(!m.matches("Sign Up Now").unwrap());
        }

        #[test]
        fn test_pattern() {
            let m = NameMatch::Pattern {
                source: "sign up".to_string(),
                case_insensitive: true,
            };
            assert!(m.matches("SIGN UP NOW").unwrap());
            assert!(m.matches("Don't have an account? Sign up").unwrap());
            assert!(!m.matches("Sign In").unwrap());
        }

        #[test]
        fn test_bad_pattern_is_config_error() {
            let m = NameMatch::Pattern {
                source: "(".to_string(),
                case_insensitive: false,
            };
            assert!(matches!(m.matches("x"), Err(AuthCheckError::Config { .. })));
        }
    }

    mod locator_builder_tests {
        use super::*;

        #[test]
        fn test_role_with_exact_name() {
            let loc = Locator::role(Role::Button).name("Sign In").exact();
            assert_eq!(
                loc.selector(),
                &Selector::Role {
                    role: Role::Button,
                    name: Some(NameMatch::Text {
                        value: "Sign In".to_string(),
                        exact: true
                    }),
                }
            );
            assert_eq!(loc.to_string(), "role=button[name=\"Sign In\" exact]");
        }

        #[test]
        fn test_name_ignored_on_css() {
            let loc = Locator::css(".__error").name("x").exact();
            assert_eq!(loc.selector(), &Selector::css(".__error"));
        }

        #[test]
        fn test_filter_then_descendant() {
            let loc = Locator::css("app-input")
                .filter_has_text("First Name")
                .get_by_role(Role::Textbox);
            assert_eq!(
                loc.to_string(),
                "app-input >> has-text=\"First Name\" >> role=textbox"
            );
            match loc.selector() {
                Selector::Descendant { parent, child } => {
                    assert!(matches!(**parent, Selector::Filter { .. }));
                    assert_eq!(**child, Selector::role(Role::Textbox));
                }
                other => panic!("unexpected selector {other:?}"),
            }
        }

        #[test]
        fn test_pattern_display() {
            let loc = Locator::role(Role::Link).name_matching("sign up");
            assert_eq!(loc.to_string(), "role=link[name=/sign up/i]");
        }

        #[test]
        fn test_clones_are_equal_descriptions() {
            let a = Locator::css("input[type=\"email\"]");
            let b = a.clone();
            assert_eq!(a, b);
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn test_css_query_escapes_quotes() {
            let js = Selector::css("input[type=\"email\"]").to_js("document");
            assert_eq!(js, r#"H.all(document, "input[type=\"email\"]")"#);
        }

        #[test]
        fn test_role_query() {
            let js = Locator::role(Role::Button)
                .name("Logout")
                .selector()
                .to_js("document");
            assert!(js.starts_with("H.byRole(document, \"button\""));
            assert!(js.contains("includes(\"Logout\".toLowerCase())"));
        }

        #[test]
        fn test_descendant_query_uses_parent_root() {
            let js = Locator::css("app-input")
                .filter_has_text("Phone")
                .get_by_role(Role::Textbox)
                .selector()
                .to_js("document");
            assert!(js.starts_with("H.uniq("));
            assert!(js.contains("flatMap(p => H.byRole(p, \"textbox\""));
        }

        #[test]
        fn test_full_query_contains_helpers() {
            let q = Selector::css("button").to_query();
            assert!(q.contains("const H = {"));
            assert!(q.contains("visible: H.visible(e)"));
        }

        #[test]
        fn test_mark_query() {
            let q = Selector::css("button").to_mark_query(2, "abc");
            assert!(q.contains("[2]"));
            assert!(q.contains("\"abc\""));
        }
    }

    #[test]
    fn test_role_round_trip_names() {
        for role in [Role::Button, Role::Link, Role::Textbox, Role::Option, Role::Alert] {
            assert_eq!(Role::from_name(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_name("heading"), None);
    }
}
