//! Wait mechanisms.
//!
//! Every UI interaction is blocking-with-deadline. [`wait_until`] polls an
//! async condition until it holds or the deadline passes; callers turn an
//! unsuccessful [`WaitResult`] into the error that fits their operation
//! (`NavigationTimeout`, `ActionTimeout`, `FormNotOpened`, ...).
//!
//! ## Toyota Way Application
//!
//! - **Jidoka**: a wait never hangs; the deadline is the only abort
//! - **Heijunka**: fixed polling interval keeps timing predictable

use std::future::Future;
use std::time::{Duration, Instant};

use crate::result::AuthCheckResult;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create wait options with a timeout
    #[must_use]
    pub const fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// A single check with no waiting
    #[must_use]
    pub const fn probe() -> Self {
        Self::new(0)
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a wait operation
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Whether the condition held before the deadline
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the condition was checked
    pub attempts: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

impl WaitResult {
    /// Create a successful wait result
    #[must_use]
    pub fn success(elapsed: Duration, attempts: u32, waited_for: impl Into<String>) -> Self {
        Self {
            success: true,
            elapsed,
            attempts,
            waited_for: waited_for.into(),
        }
    }

    /// Create a timeout wait result
    #[must_use]
    pub fn timeout(elapsed: Duration, attempts: u32, waited_for: impl Into<String>) -> Self {
        Self {
            success: false,
            elapsed,
            attempts,
            waited_for: waited_for.into(),
        }
    }
}

/// Poll `check` until it returns `Ok(true)` or the deadline passes.
///
/// The condition is always checked at least once, so a zero timeout is a
/// plain probe. Errors from `check` propagate immediately.
pub async fn wait_until<F, Fut>(
    options: WaitOptions,
    waited_for: &str,
    mut check: F,
) -> AuthCheckResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AuthCheckResult<bool>>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let mut attempts = 0;

    loop {
        attempts += 1;
        if check().await? {
            return Ok(WaitResult::success(start.elapsed(), attempts, waited_for));
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            tracing::debug!(waited_for, attempts, "wait deadline reached");
            return Ok(WaitResult::timeout(elapsed, attempts, waited_for));
        }
        let remaining = timeout.saturating_sub(elapsed);
        tokio::time::sleep(options.poll_interval().min(remaining)).await;
    }
}
