//! Scenario orchestration.
//!
//! A [`Suite`] is a named group of tests sharing an optional
//! `before_each` hook. Each test body receives a fresh [`World`] (one
//! session, both page objects, the credential fixture) and sequences page
//! operations into named steps with [`World::step`]. Steps run strictly in
//! order; the first error ends the scenario.
//!
//! [`SuiteRunner`] executes a suite:
//!
//! ```text
//! for each selected test (up to N concurrently, one session each)
//!   for attempt in 0..=retries
//!     open session → before_each → body   (bounded by test_timeout)
//!     on failure: screenshot, close, retry from scratch
//! ```
//!
//! ## Toyota Way Application:
//! - **Jidoka**: a failing step stops its scenario at once
//! - **Heijunka**: a fixed worker count levels the load on the app under test

use futures::future::LocalBoxFuture;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use regex::Regex;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::Instrument;

use crate::config::RunConfig;
use crate::context::Context;
use crate::driver::{Session, SessionFactory};
use crate::fixture::Credentials;
use crate::pages::{AuthPage, RegistrationPage};
use crate::reporter::{
    write_failure_screenshot, AttemptReport, RunSummary, ScenarioReport, StepReport, SuiteReport,
};
use crate::result::{AuthCheckError, AuthCheckResult};

/// Boxed test body or hook
pub type TestFn<S> = Arc<dyn Fn(World<S>) -> LocalBoxFuture<'static, AuthCheckResult<()>>>;

/// Step log shared by the clones of one [`World`]
#[derive(Debug, Clone, Default)]
struct StepLog(Arc<Mutex<Vec<StepReport>>>);

impl StepLog {
    fn push(&self, step: StepReport) {
        if let Ok(mut steps) = self.0.lock() {
            steps.push(step);
        }
    }

    fn snapshot(&self) -> Vec<StepReport> {
        self.0.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

/// Everything one scenario attempt works with
pub struct World<S: Session> {
    /// Session context
    pub ctx: Context<S>,
    /// Sign-in page object
    pub auth: AuthPage<S>,
    /// Registration page object
    pub registration: RegistrationPage<S>,
    /// Credential fixture
    pub credentials: Credentials,
    steps: StepLog,
}

impl<S: Session> Clone for World<S> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            auth: self.auth.clone(),
            registration: self.registration.clone(),
            credentials: self.credentials.clone(),
            steps: self.steps.clone(),
        }
    }
}

impl<S: Session> fmt::Debug for World<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("ctx", &self.ctx)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl<S: Session> World<S> {
    /// Create a new world; page objects share `ctx`
    #[must_use]
    pub fn new(ctx: Context<S>, credentials: Credentials) -> Self {
        Self {
            auth: AuthPage::new(ctx.clone()),
            registration: RegistrationPage::new(ctx.clone()),
            ctx,
            credentials,
            steps: StepLog::default(),
        }
    }

    /// Run `action` as a named step and record its outcome
    pub async fn step<T, F>(&self, name: &str, action: F) -> AuthCheckResult<T>
    where
        F: Future<Output = AuthCheckResult<T>>,
    {
        let start = Instant::now();
        let result = action.instrument(tracing::info_span!("step", name = %name)).await;
        let elapsed = start.elapsed();
        match &result {
            Ok(_) => {
                tracing::info!(step = name, ms = elapsed.as_millis() as u64, "step passed");
                self.steps.push(StepReport::passed(name, elapsed));
            }
            Err(e) => {
                tracing::info!(step = name, error = %e, "step failed");
                self.steps.push(StepReport::failed(name, elapsed, e.to_string()));
            }
        }
        result
    }

    /// Steps recorded so far
    #[must_use]
    pub fn steps(&self) -> Vec<StepReport> {
        self.steps.snapshot()
    }
}

/// One test of a suite
pub struct TestCase<S: Session> {
    name: String,
    only: bool,
    body: TestFn<S>,
}

impl<S: Session> TestCase<S> {
    /// Test name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the test is focused
    #[must_use]
    pub const fn is_only(&self) -> bool {
        self.only
    }
}

impl<S: Session> fmt::Debug for TestCase<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("only", &self.only)
            .finish_non_exhaustive()
    }
}

/// Named group of tests (a `describe` block)
pub struct Suite<S: Session> {
    name: String,
    before_each: Option<TestFn<S>>,
    tests: Vec<TestCase<S>>,
}

impl<S: Session> fmt::Debug for Suite<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("before_each", &self.before_each.is_some())
            .field("tests", &self.tests)
            .finish()
    }
}

fn boxed<S, F, Fut>(f: F) -> TestFn<S>
where
    S: Session + 'static,
    F: Fn(World<S>) -> Fut + 'static,
    Fut: Future<Output = AuthCheckResult<()>> + 'static,
{
    Arc::new(move |world: World<S>| f(world).boxed_local())
}

impl<S: Session + 'static> Suite<S> {
    /// Create a new empty suite
    #[must_use]
    pub fn describe(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            before_each: None,
            tests: Vec::new(),
        }
    }

    /// Hook run on the fresh world before every test
    #[must_use]
    pub fn before_each<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(World<S>) -> Fut + 'static,
        Fut: Future<Output = AuthCheckResult<()>> + 'static,
    {
        self.before_each = Some(boxed(hook));
        self
    }

    /// Add a test
    #[must_use]
    pub fn test<F, Fut>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(World<S>) -> Fut + 'static,
        Fut: Future<Output = AuthCheckResult<()>> + 'static,
    {
        self.tests.push(TestCase {
            name: name.into(),
            only: false,
            body: boxed(body),
        });
        self
    }

    /// Add a focused test; when any test is focused only those run
    #[must_use]
    pub fn only<F, Fut>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(World<S>) -> Fut + 'static,
        Fut: Future<Output = AuthCheckResult<()>> + 'static,
    {
        self.tests.push(TestCase {
            name: name.into(),
            only: true,
            body: boxed(body),
        });
        self
    }

    /// Suite name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tests in declaration order
    #[must_use]
    pub fn tests(&self) -> &[TestCase<S>] {
        &self.tests
    }

    /// Whether any test is focused
    #[must_use]
    pub fn has_only(&self) -> bool {
        self.tests.iter().any(|t| t.only)
    }

    /// Full title of a test, as matched by `--grep`
    #[must_use]
    pub fn title(&self, test: &TestCase<S>) -> String {
        format!("{} {}", self.name, test.name)
    }
}

/// Runs suites against sessions opened by a [`SessionFactory`]
pub struct SuiteRunner<F: SessionFactory> {
    factory: Arc<F>,
    config: RunConfig,
    credentials: Credentials,
    grep: Option<Regex>,
}

impl<F: SessionFactory> fmt::Debug for SuiteRunner<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteRunner")
            .field("config", &self.config)
            .field("grep", &self.grep.as_ref().map(Regex::as_str))
            .finish_non_exhaustive()
    }
}

impl<F: SessionFactory> SuiteRunner<F> {
    /// Create a new runner
    #[must_use]
    pub fn new(factory: Arc<F>, config: RunConfig) -> Self {
        Self {
            factory,
            config,
            credentials: Credentials::default(),
            grep: None,
        }
    }

    /// Use these credentials instead of the defaults
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Only run tests whose full title matches `pattern`
    pub fn with_grep(mut self, pattern: &str) -> AuthCheckResult<Self> {
        let re = Regex::new(pattern)
            .map_err(|e| AuthCheckError::config(format!("invalid grep pattern {pattern:?}: {e}")))?;
        self.grep = Some(re);
        Ok(self)
    }

    /// Run configuration
    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run several suites one after the other
    pub async fn run_all(&self, suites: &[Suite<F::Session>]) -> AuthCheckResult<RunSummary> {
        let mut summary = RunSummary::new();
        tracing::info!(run_id = %summary.run_id, suites = suites.len(), "run started");
        for suite in suites {
            summary.push(self.run(suite).await?);
        }
        tracing::info!(run_id = %summary.run_id, summary = %summary.summary(), "run finished");
        Ok(summary)
    }

    /// Run one suite.
    ///
    /// Fails up front with a configuration error when the suite focuses a
    /// test and `forbid_only` is set; scenario failures are reported, not
    /// returned.
    pub async fn run(&self, suite: &Suite<F::Session>) -> AuthCheckResult<SuiteReport> {
        if suite.has_only() && self.config.forbid_only {
            return Err(AuthCheckError::config(format!(
                "suite {:?} focuses a test while forbid_only is set",
                suite.name
            )));
        }
        let focused = suite.has_only();
        let selected: Vec<&TestCase<F::Session>> = suite
            .tests
            .iter()
            .filter(|t| !focused || t.only)
            .filter(|t| self.grep.as_ref().map_or(true, |re| re.is_match(&suite.title(t))))
            .collect();

        let workers = self.config.effective_workers();
        tracing::info!(suite = %suite.name, tests = selected.len(), workers, "running suite");

        let mut results: Vec<(usize, ScenarioReport)> = stream::iter(selected.into_iter().enumerate())
            .map(|(i, test)| async move { (i, self.run_test(suite, test).await) })
            .buffer_unordered(workers)
            .collect()
            .await;
        results.sort_by_key(|(i, _)| *i);

        Ok(SuiteReport::new(
            suite.name.clone(),
            results.into_iter().map(|(_, r)| r).collect(),
        ))
    }

    async fn run_test(&self, suite: &Suite<F::Session>, test: &TestCase<F::Session>) -> ScenarioReport {
        let title = suite.title(test);
        let mut attempts = Vec::new();
        let mut screenshot = None;

        for attempt in 0..=self.config.retries {
            let (report, png) = self
                .run_attempt(suite, test, attempt)
                .instrument(tracing::info_span!("scenario", name = %title, attempt))
                .await;
            let passed = report.passed;
            attempts.push(report);
            if passed {
                screenshot = None;
                break;
            }
            screenshot = png;
            if attempt < self.config.retries {
                tracing::warn!(scenario = %title, attempt, "scenario failed, retrying on a fresh session");
            }
        }

        let mut report = ScenarioReport::from_attempts(test.name.clone(), attempts);
        if let Some(png) = screenshot {
            match write_failure_screenshot(&self.config.output_dir, &title, &png) {
                Ok(path) => report.screenshot = Some(path),
                Err(e) => tracing::warn!(scenario = %title, error = %e, "could not save screenshot"),
            }
        }
        report
    }

    async fn run_attempt(
        &self,
        suite: &Suite<F::Session>,
        test: &TestCase<F::Session>,
        attempt: u32,
    ) -> (AttemptReport, Option<Vec<u8>>) {
        let start = Instant::now();
        let session = match self.factory.open().await {
            Ok(s) => Arc::new(s),
            Err(e) => {
                tracing::error!(error = %e, "could not open session");
                let report = AttemptReport {
                    attempt,
                    passed: false,
                    duration_ms: elapsed_ms(start),
                    error: Some(e.to_string()),
                    steps: Vec::new(),
                };
                return (report, None);
            }
        };

        let ctx = Context::new(Arc::clone(&session), self.config.timeouts, &self.config.base_url);
        let world = World::new(ctx, self.credentials.clone());
        let body = async {
            if let Some(hook) = &suite.before_each {
                world.step("before each", hook(world.clone())).await?;
            }
            (test.body)(world.clone()).await
        };
        let deadline = Duration::from_millis(self.config.test_timeout_ms);
        let outcome = match tokio::time::timeout(deadline, body).await {
            Ok(result) => result,
            Err(_) => Err(AuthCheckError::ScenarioTimeout {
                name: test.name.clone(),
                ms: self.config.test_timeout_ms,
            }),
        };

        let png = match &outcome {
            Err(_) if self.config.screenshot_on_failure => match session.screenshot().await {
                Ok(bytes) if !bytes.is_empty() => Some(bytes),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!(error = %e, "screenshot unavailable");
                    None
                }
            },
            _ => None,
        };
        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "could not close session");
        }

        match &outcome {
            Ok(()) => tracing::info!("scenario passed"),
            Err(e) => tracing::info!(error = %e, "scenario failed"),
        }
        let report = AttemptReport {
            attempt,
            passed: outcome.is_ok(),
            duration_ms: elapsed_ms(start),
            error: outcome.err().map(|e| e.to_string()),
            steps: world.steps(),
        };
        (report, png)
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
