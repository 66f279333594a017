//! Assertions on visible UI state.
//!
//! [`Assertion`] holds the pure comparison helpers; [`Expect`] wraps them in
//! retrying checks against a live [`Context`], the way a harness
//! `expect(locator).toBeVisible()` keeps re-querying until its deadline.

use std::time::Duration;

use crate::context::Context;
use crate::driver::Session;
use crate::locator::Locator;
use crate::normalize::{normalize, normalize_all, Expected, NormalizeMode};
use crate::result::{AuthCheckError, AuthCheckResult};
use crate::wait::{wait_until, WaitOptions};

/// Result of an assertion
#[derive(Debug, Clone)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Convert into a result, failing with [`AuthCheckError::AssertionError`]
    pub fn into_result(self) -> AuthCheckResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(AuthCheckError::assertion(self.message))
        }
    }
}

/// Assertion helpers for text comparisons
pub struct Assertion;

impl Assertion {
    /// Assert a string contains a substring after normalizing both
    #[must_use]
    pub fn contains(haystack: &str, needle: &str, mode: NormalizeMode) -> AssertionResult {
        let h = normalize(haystack, mode);
        let n = normalize(needle, mode);
        if h.contains(&n) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected '{h}' to contain '{n}'"))
        }
    }

    /// Assert every expected message appears among the actual messages.
    ///
    /// Order-independent subset check on normalized text. Extra actual
    /// messages are fine; an empty actual set always fails.
    #[must_use]
    pub fn contains_all<T: AsRef<str>>(
        actual: &[T],
        expected: &Expected,
        mode: NormalizeMode,
    ) -> AssertionResult {
        if actual.is_empty() {
            return AssertionResult::fail("No error messages visible");
        }
        let actual = normalize_all(actual, mode);
        let missing: Vec<String> = normalize_all(expected.messages(), mode)
            .into_iter()
            .filter(|e| !actual.contains(e))
            .collect();
        if missing.is_empty() {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected messages {missing:?} not found in {actual:?}"
            ))
        }
    }

    /// Assert a condition is true
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message)
        }
    }
}

/// Retrying assertion on one locator
#[derive(Debug)]
pub struct Expect<'a, S: Session> {
    ctx: &'a Context<S>,
    locator: &'a Locator,
    timeout: Duration,
}

impl<'a, S: Session> Expect<'a, S> {
    /// Create a new expectation
    #[must_use]
    pub const fn new(ctx: &'a Context<S>, locator: &'a Locator, timeout: Duration) -> Self {
        Self {
            ctx,
            locator,
            timeout,
        }
    }

    /// Override the deadline for this assertion only
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[allow(clippy::cast_possible_truncation)]
    fn options(&self) -> WaitOptions {
        self.ctx.wait_options(self.timeout.as_millis() as u64)
    }

    /// The first match becomes visible before the deadline
    pub async fn to_be_visible(self) -> AuthCheckResult<()> {
        let result = self
            .ctx
            .wait_visible(self.locator, self.options().timeout_ms)
            .await?;
        Assertion::is_true(
            result.success,
            &format!(
                "expected {} to be visible within {}ms",
                self.locator,
                self.options().timeout_ms
            ),
        )
        .into_result()
    }

    /// The first match is visible and its text contains `text`.
    ///
    /// Whitespace-insensitive, case-sensitive.
    pub async fn to_contain_text(self, text: &str) -> AuthCheckResult<()> {
        let ctx = self.ctx;
        let locator = self.locator;
        let result = wait_until(self.options(), &locator.to_string(), move || async move {
            Ok(ctx.query(locator).await?.first().is_some_and(|el| {
                el.visible && Assertion::contains(&el.text, text, NormalizeMode::CaseSensitive).passed
            }))
        })
        .await?;
        if result.success {
            return Ok(());
        }

        let actual = ctx
            .query(locator)
            .await?
            .into_iter()
            .next()
            .map(|el| el.text);
        Err(AuthCheckError::assertion(match actual {
            Some(actual) => format!("expected {locator} to contain text '{text}', got '{actual}'"),
            None => format!("expected {locator} to contain text '{text}', but nothing matched"),
        }))
    }

    /// The visible matches include every expected message (subset check)
    pub async fn to_include_texts(self, expected: &Expected, mode: NormalizeMode) -> AuthCheckResult<()> {
        let ctx = self.ctx;
        let locator = self.locator;
        let result = wait_until(self.options(), &locator.to_string(), move || async move {
            let texts = visible_texts(ctx, locator).await?;
            Ok(Assertion::contains_all(&texts, expected, mode).passed)
        })
        .await?;
        if result.success {
            return Ok(());
        }

        let texts = visible_texts(ctx, locator).await?;
        Assertion::contains_all(&texts, expected, mode).into_result()
    }
}

async fn visible_texts<S: Session>(ctx: &Context<S>, locator: &Locator) -> AuthCheckResult<Vec<String>> {
    Ok(ctx
        .query(locator)
        .await?
        .into_iter()
        .filter(|el| el.visible)
        .map(|el| el.text)
        .collect())
}
