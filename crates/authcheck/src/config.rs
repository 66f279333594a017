//! Runtime configuration.
//!
//! Precedence, lowest first: built-in defaults, the YAML file
//! (`authcheck.yaml`), environment (`BASE_URL`, `CI`), then CLI flags.
//!
//! ```yaml
//! base_url: https://staging.example.com/
//! retries: 1
//! workers: 4
//! timeouts:
//!   action_ms: 10000
//!   page_default_ms: 5000
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::result::{AuthCheckError, AuthCheckResult};

/// Default application under test
pub const DEFAULT_BASE_URL: &str = "http://dev-repmove-enterprise.web.app/";

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "authcheck.yaml";

/// Deadlines carried by every [`Context`](crate::context::Context)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Click and fill deadline
    pub action_ms: u64,
    /// Page navigation deadline
    pub navigation_ms: u64,
    /// `expect(...)` assertion deadline
    pub expect_ms: u64,
    /// Default for page-object visibility waits
    pub page_default_ms: u64,
    /// Polling interval for all waits
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            action_ms: 10_000,
            navigation_ms: 60_000,
            expect_ms: 10_000,
            page_default_ms: 5_000,
            poll_interval_ms: crate::wait::DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Timeouts {
    /// Uniform deadlines, handy for tests against the in-memory app
    #[must_use]
    pub const fn uniform(ms: u64) -> Self {
        Self {
            action_ms: ms,
            navigation_ms: ms,
            expect_ms: ms,
            page_default_ms: ms,
            poll_interval_ms: 5,
        }
    }

    /// Navigation deadline as Duration
    #[must_use]
    pub const fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }
}

/// Configuration for a suite run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Base URL relative paths are resolved against
    pub base_url: String,
    /// Per-operation deadlines
    pub timeouts: Timeouts,
    /// Whole-scenario deadline
    pub test_timeout_ms: u64,
    /// Extra attempts for a failing scenario
    pub retries: u32,
    /// Concurrent scenarios (None = available parallelism)
    pub workers: Option<usize>,
    /// Run tests of one suite concurrently
    pub fully_parallel: bool,
    /// Reject suites that mark a test `only`
    pub forbid_only: bool,
    /// Launch the browser without a window
    pub headless: bool,
    /// Report and artifact directory
    pub output_dir: PathBuf,
    /// Capture a screenshot when a scenario fails
    pub screenshot_on_failure: bool,
    /// Path to a chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeouts: Timeouts::default(),
            test_timeout_ms: 120_000,
            retries: 0,
            workers: None,
            fully_parallel: true,
            forbid_only: false,
            headless: true,
            output_dir: PathBuf::from("test-results"),
            screenshot_on_failure: true,
            chromium_path: None,
        }
    }
}

impl RunConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document; missing fields keep their defaults
    pub fn from_yaml_str(yaml: &str) -> AuthCheckResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn load(path: &Path) -> AuthCheckResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AuthCheckError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Load `path` if given, else `authcheck.yaml` when present, else defaults
    pub fn discover(path: Option<&Path>) -> AuthCheckResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply environment overrides from an arbitrary lookup
    #[must_use]
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("BASE_URL").filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if lookup("CI").is_some_and(|v| !v.is_empty() && v != "0" && v != "false") {
            self.retries = 2;
            self.workers = Some(1);
            self.forbid_only = true;
        }
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set timeouts
    #[must_use]
    pub const fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set retries
    #[must_use]
    pub const fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set worker count
    #[must_use]
    pub const fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Set the whole-scenario deadline
    #[must_use]
    pub const fn test_timeout_ms(mut self, ms: u64) -> Self {
        self.test_timeout_ms = ms;
        self
    }

    /// Set the output directory
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Workers actually used for a suite
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        if !self.fully_parallel {
            return 1;
        }
        self.workers
            .unwrap_or_else(|| {
                std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
            })
            .max(1)
    }

    /// Reject values no run could satisfy
    pub fn validate(&self) -> AuthCheckResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(AuthCheckError::config("base_url must not be empty"));
        }
        if self.workers == Some(0) {
            return Err(AuthCheckError::config("workers must be at least 1"));
        }
        if self.test_timeout_ms == 0 {
            return Err(AuthCheckError::config("test_timeout_ms must be positive"));
        }
        Ok(())
    }
}

/// Join a base URL and a path the way a browser resolves `goto('/path')`
/// against a configured base URL.
#[must_use]
pub fn resolve_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("about:") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{path}")
    }
}
