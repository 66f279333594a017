//! Reports for scenario runs.
//!
//! ```text
//! RunSummary
//!   └─ SuiteReport            (one per describe block)
//!        └─ ScenarioReport    (one per test)
//!             └─ AttemptReport   (one per try; retries add more)
//!                  └─ StepReport (one per named step)
//! ```
//!
//! A run is written as JSON to `<output_dir>/report.json`; failure
//! screenshots land in `<output_dir>/<scenario-slug>/failure.png`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

use crate::result::AuthCheckResult;

/// File name of the JSON report
pub const REPORT_FILE: &str = "report.json";

/// File name of a failure screenshot
pub const FAILURE_SCREENSHOT: &str = "failure.png";

/// Outcome of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Passed on the first attempt
    Passed,
    /// Failed on every attempt
    Failed,
    /// Passed after at least one failed attempt
    Flaky,
}

impl TestStatus {
    /// Check if status is passing (flaky counts as passing)
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed | Self::Flaky)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// One named step of an attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Step name
    pub name: String,
    /// Whether the step succeeded
    pub passed: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Error message if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    /// Create a passing step
    #[must_use]
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            passed: true,
            duration_ms: millis(duration),
            error: None,
        }
    }

    /// Create a failing step
    #[must_use]
    pub fn failed(name: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            duration_ms: millis(duration),
            error: Some(error.into()),
        }
    }
}

/// One try of a scenario on a fresh session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptReport {
    /// Zero-based attempt number
    pub attempt: u32,
    /// Whether the attempt passed
    pub passed: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Error that ended the attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Steps in execution order
    pub steps: Vec<StepReport>,
}

/// Final result of one test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Final status
    pub status: TestStatus,
    /// Every attempt in order
    pub attempts: Vec<AttemptReport>,
    /// Failure screenshot, when one was captured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

impl ScenarioReport {
    /// Build the report from the attempts made
    #[must_use]
    pub fn from_attempts(name: impl Into<String>, attempts: Vec<AttemptReport>) -> Self {
        let status = match attempts.iter().position(|a| a.passed) {
            Some(0) => TestStatus::Passed,
            Some(_) => TestStatus::Flaky,
            None => TestStatus::Failed,
        };
        Self {
            name: name.into(),
            status,
            attempts,
            screenshot: None,
        }
    }

    /// Total time over all attempts
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.attempts.iter().map(|a| a.duration_ms).sum()
    }

    /// Error of the last attempt
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.attempts.last().and_then(|a| a.error.as_deref())
    }
}

/// Results of one suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Suite name
    pub name: String,
    /// Scenarios in declaration order
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    /// Create a new suite report
    #[must_use]
    pub fn new(name: impl Into<String>, scenarios: Vec<ScenarioReport>) -> Self {
        Self {
            name: name.into(),
            scenarios,
        }
    }

    fn count(&self, status: TestStatus) -> usize {
        self.scenarios.iter().filter(|s| s.status == status).count()
    }
}

/// Results of a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run identifier
    pub run_id: Uuid,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Suites in run order
    pub suites: Vec<SuiteReport>,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSummary {
    /// Start a new run
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            suites: Vec::new(),
        }
    }

    /// Add a suite
    pub fn push(&mut self, suite: SuiteReport) {
        self.suites.push(suite);
    }

    /// Scenarios that passed on the first attempt
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.suites.iter().map(|s| s.count(TestStatus::Passed)).sum()
    }

    /// Scenarios that failed
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.suites.iter().map(|s| s.count(TestStatus::Failed)).sum()
    }

    /// Scenarios that passed after a retry
    #[must_use]
    pub fn flaky_count(&self) -> usize {
        self.suites.iter().map(|s| s.count(TestStatus::Flaky)).sum()
    }

    /// Number of scenarios
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.suites.iter().map(|s| s.scenarios.len()).sum()
    }

    /// Check if every scenario passed (flaky ones included)
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Every failed scenario with its suite name
    #[must_use]
    pub fn failures(&self) -> Vec<(&str, &ScenarioReport)> {
        self.suites
            .iter()
            .flat_map(|s| {
                s.scenarios
                    .iter()
                    .filter(|r| r.status.is_failed())
                    .map(move |r| (s.name.as_str(), r))
            })
            .collect()
    }

    /// Generate summary string
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} passed", self.passed_count())];
        if self.flaky_count() > 0 {
            parts.push(format!("{} flaky", self.flaky_count()));
        }
        if self.failed_count() > 0 {
            parts.push(format!("{} failed", self.failed_count()));
        }
        format!("{} ({} total)", parts.join(", "), self.total_count())
    }

    /// Write `report.json` into `dir`, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns error if file writing fails
    pub fn write_json(&self, dir: &Path) -> AuthCheckResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(REPORT_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    /// Read a report written by [`write_json`](Self::write_json)
    pub fn read_json(path: &Path) -> AuthCheckResult<Self> {
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }
}

/// Save a failure screenshot as `<dir>/<slug(scenario)>/failure.png`
///
/// # Errors
///
/// Returns error if directory creation or file writing fails
pub fn write_failure_screenshot(dir: &Path, scenario: &str, png: &[u8]) -> AuthCheckResult<PathBuf> {
    let target = dir.join(slug(scenario));
    std::fs::create_dir_all(&target)?;
    let path = target.join(FAILURE_SCREENSHOT);
    std::fs::write(&path, png)?;
    Ok(path)
}

/// Lowercase, dash-separated, filesystem-safe form of a title
#[must_use]
pub fn slug(title: &str) -> String {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(n: u32, passed: bool) -> AttemptReport {
        AttemptReport {
            attempt: n,
            passed,
            duration_ms: 10,
            error: (!passed).then(|| "Assertion error: No error messages visible".to_string()),
            steps: vec![StepReport::passed("Perform login", Duration::from_millis(5))],
        }
    }

    mod status_tests {
        use super::*;

        #[test]
        fn test_status_from_attempts() {
            assert_eq!(
                ScenarioReport::from_attempts("a", vec![attempt(0, true)]).status,
                TestStatus::Passed
            );
            assert_eq!(
                ScenarioReport::from_attempts("a", vec![attempt(0, false), attempt(1, true)]).status,
                TestStatus::Flaky
            );
            assert_eq!(
                ScenarioReport::from_attempts("a", vec![attempt(0, false), attempt(1, false)]).status,
                TestStatus::Failed
            );
        }

        #[test]
        fn test_flaky_is_passing() {
            assert!(TestStatus::Flaky.is_passed());
            assert!(!TestStatus::Flaky.is_failed());
        }
    }

    mod summary_tests {
        use super::*;

        fn run() -> RunSummary {
            let mut run = RunSummary::new();
            run.push(SuiteReport::new(
                "Login flow",
                vec![
                    ScenarioReport::from_attempts("Test 1", vec![attempt(0, true)]),
                    ScenarioReport::from_attempts("Test 2", vec![attempt(0, false), attempt(1, true)]),
                    ScenarioReport::from_attempts("Test 3", vec![attempt(0, false)]),
                ],
            ));
            run
        }

        #[test]
        fn test_counts() {
            let run = run();
            assert_eq!(run.total_count(), 3);
            assert_eq!(run.passed_count(), 1);
            assert_eq!(run.flaky_count(), 1);
            assert_eq!(run.failed_count(), 1);
            assert!(!run.all_passed());
            assert_eq!(run.summary(), "1 passed, 1 flaky, 1 failed (3 total)");
            assert_eq!(run.failures()[0].0, "Login flow");
        }

        #[test]
        fn test_json_round_trip_through_file() {
            let dir = tempfile::tempdir().unwrap();
            let run = run();
            let path = run.write_json(&dir.path().join("out")).unwrap();
            assert!(path.ends_with(REPORT_FILE));
            let back = RunSummary::read_json(&path).unwrap();
            assert_eq!(back, run);
            let raw = std::fs::read_to_string(&path).unwrap();
            assert!(raw.contains("\"status\": \"flaky\""));
        }
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Login flow Test 1 - Successful login"), "login-flow-test-1-successful-login");
        assert_eq!(slug("  ??  "), "");
    }

    #[test]
    fn test_write_failure_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_failure_screenshot(dir.path(), "Registration flow Test 3", b"png").unwrap();
        assert!(path.ends_with("registration-flow-test-3/failure.png"));
        assert_eq!(std::fs::read(path).unwrap(), b"png");
    }
}
