//! List-style console reporting

use authcheck::{LocatorRegistry, RunSummary, ScenarioReport, TestStatus};
use console::style;
use std::fmt::Write as _;
use std::path::Path;

/// Renders runs the way a list reporter does: one line per scenario,
/// failure details underneath, then a summary
#[derive(Debug, Clone, Copy, Default)]
pub struct ListReporter {
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode: failures and summary only
    pub quiet: bool,
}

impl ListReporter {
    /// Create a new reporter
    #[must_use]
    pub const fn new(use_color: bool, quiet: bool) -> Self {
        Self { use_color, quiet }
    }

    /// Header printed before a run
    #[must_use]
    pub fn header(&self, tests: usize, workers: usize) -> String {
        let noun = if tests == 1 { "test" } else { "tests" };
        let w = if workers == 1 { "worker" } else { "workers" };
        format!("Running {tests} {noun} using {workers} {w}")
    }

    fn marker(&self, status: TestStatus) -> String {
        match (status, self.use_color) {
            (TestStatus::Passed, true) => style("✓").green().bold().to_string(),
            (TestStatus::Flaky, true) => style("±").yellow().bold().to_string(),
            (TestStatus::Failed, true) => style("✗").red().bold().to_string(),
            (TestStatus::Passed, false) => "PASS".to_string(),
            (TestStatus::Flaky, false) => "FLAKY".to_string(),
            (TestStatus::Failed, false) => "FAIL".to_string(),
        }
    }

    fn scenario_line(&self, suite: &str, scenario: &ScenarioReport) -> String {
        let mut line = format!(
            "  {} {suite} › {} ({}ms)",
            self.marker(scenario.status),
            scenario.name,
            scenario.duration_ms()
        );
        if scenario.attempts.len() > 1 {
            let _ = write!(line, " [{} attempts]", scenario.attempts.len());
        }
        line
    }

    /// Full report of a run
    #[must_use]
    pub fn render(&self, summary: &RunSummary) -> String {
        let mut out = String::new();
        for suite in &summary.suites {
            for scenario in &suite.scenarios {
                if self.quiet && !scenario.status.is_failed() {
                    continue;
                }
                let _ = writeln!(out, "{}", self.scenario_line(&suite.name, scenario));
                if scenario.status.is_failed() {
                    if let Some(step) = scenario
                        .attempts
                        .last()
                        .and_then(|a| a.steps.iter().find(|s| !s.passed))
                    {
                        let _ = writeln!(out, "      step: {}", step.name);
                    }
                    if let Some(error) = scenario.last_error() {
                        let _ = writeln!(out, "      {error}");
                    }
                    if let Some(path) = &scenario.screenshot {
                        let _ = writeln!(out, "      screenshot: {}", path.display());
                    }
                }
            }
        }

        let summary_line = summary.summary();
        let summary_line = match (self.use_color, summary.all_passed()) {
            (true, true) => style(summary_line).green().to_string(),
            (true, false) => style(summary_line).red().to_string(),
            (false, _) => summary_line,
        };
        let _ = writeln!(out, "\n  {summary_line}");
        out
    }

    /// Footer naming the JSON report
    #[must_use]
    pub fn report_location(&self, path: &Path) -> String {
        format!("  Report: {}", path.display())
    }

    /// One line per registry entry
    #[must_use]
    pub fn render_registry(&self, registry: &LocatorRegistry, with_js: bool) -> String {
        let width = registry.names().iter().map(|n| n.len()).max().unwrap_or(0);
        let mut out = String::new();
        let title = if self.use_color {
            style(registry.page()).bold().to_string()
        } else {
            registry.page().to_string()
        };
        let _ = writeln!(out, "{title}");
        for (name, locator) in registry.iter() {
            let _ = writeln!(out, "  {name:<width$}  {locator}");
            if with_js {
                let _ = writeln!(out, "  {:<width$}  {}", "", locator.selector().to_js("document"));
            }
        }
        out
    }
}
