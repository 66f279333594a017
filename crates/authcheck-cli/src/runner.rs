//! Command execution

use authcheck::mock::{FakeAppFactory, FakeAuthApp};
use authcheck::pages::{generate_unique_email, AuthPage, RegistrationPage};
use authcheck::suites::SuiteKind;
use authcheck::{
    Context, Credentials, PageObject, RunConfig, RunSummary, SessionFactory, SuiteRunner,
};
use std::path::Path;
use std::sync::Arc;

use crate::commands::{DriverArg, EmailArgs, LocatorsArgs, PageArg, TestArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ListReporter;

/// Resolve the run configuration: defaults < YAML file < environment < flags
pub fn resolve_run_config(
    args: &TestArgs,
    env: impl Fn(&str) -> Option<String>,
) -> CliResult<RunConfig> {
    let mut config = RunConfig::discover(args.config.as_deref())?.with_env_from(env);
    if let Some(url) = &args.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(retries) = args.retries {
        config.retries = retries;
    }
    if let Some(workers) = args.workers {
        if workers == 0 {
            return Err(CliError::invalid_argument("--workers must be at least 1"));
        }
        config.workers = Some(workers);
    }
    if args.headed {
        config.headless = false;
    }
    if let Some(dir) = &args.output {
        config.output_dir.clone_from(dir);
    }
    config.validate()?;
    Ok(config)
}

/// Load the credential fixture and apply `AUTH_*` overrides
pub fn resolve_credentials(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> CliResult<Credentials> {
    let base = match path {
        Some(p) => Credentials::load(p)?,
        None => Credentials::default(),
    };
    Ok(base.with_env_from(env))
}

/// Run the selected suites; returns whether every scenario passed
pub async fn run_tests(cli: CliConfig, args: &TestArgs) -> CliResult<bool> {
    let env = |key: &str| std::env::var(key).ok();
    let config = resolve_run_config(args, env)?;
    let credentials = resolve_credentials(args.credentials.as_deref(), env)?;
    let kind = SuiteKind::from(args.suite);
    tracing::info!(suite = %kind, driver = ?args.driver, base_url = %config.base_url, "starting run");

    match args.driver {
        DriverArg::Fake => {
            execute(Arc::new(FakeAppFactory::new()), config, credentials, args, kind, cli).await
        }
        DriverArg::Chromium => run_chromium(config, credentials, args, kind, cli).await,
    }
}

#[cfg(feature = "browser")]
async fn run_chromium(
    config: RunConfig,
    credentials: Credentials,
    args: &TestArgs,
    kind: SuiteKind,
    cli: CliConfig,
) -> CliResult<bool> {
    use authcheck::browser::{ChromiumFactory, LaunchOptions};

    let factory = Arc::new(ChromiumFactory::launch(LaunchOptions::from(&config)).await?);
    let outcome = execute(Arc::clone(&factory), config, credentials, args, kind, cli).await;
    if let Err(e) = factory.close().await {
        tracing::warn!(error = %e, "could not close chromium");
    }
    outcome
}

#[cfg(not(feature = "browser"))]
async fn run_chromium(
    _config: RunConfig,
    _credentials: Credentials,
    _args: &TestArgs,
    _kind: SuiteKind,
    _cli: CliConfig,
) -> CliResult<bool> {
    Err(CliError::config(
        "chromium driver not enabled. Rebuild with --features browser",
    ))
}

async fn execute<F: SessionFactory>(
    factory: Arc<F>,
    config: RunConfig,
    credentials: Credentials,
    args: &TestArgs,
    kind: SuiteKind,
    cli: CliConfig,
) -> CliResult<bool> {
    let reporter = ListReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    let output_dir = config.output_dir.clone();
    let workers = config.effective_workers();

    let mut runner = SuiteRunner::new(factory, config).with_credentials(credentials);
    if let Some(pattern) = &args.grep {
        runner = runner.with_grep(pattern)?;
    }
    let suites = kind.suites::<F::Session>();
    if !cli.verbosity.is_quiet() {
        let tests = suites.iter().map(|s| s.tests().len()).sum();
        println!("{}\n", reporter.header(tests, workers));
    }

    let summary: RunSummary = runner.run_all(&suites).await?;
    print!("{}", reporter.render(&summary));
    let path = summary.write_json(&output_dir)?;
    if !cli.verbosity.is_quiet() {
        println!("{}", reporter.report_location(&path));
    }
    Ok(summary.all_passed())
}

/// Print a page's locator registry
pub fn run_locators(cli: CliConfig, args: &LocatorsArgs) {
    let config = RunConfig::new();
    let ctx = Context::new(Arc::new(FakeAuthApp::new()), config.timeouts, &config.base_url);
    let registry = match args.page {
        PageArg::Auth => AuthPage::new(ctx).registry(),
        PageArg::Registration => RegistrationPage::new(ctx).registry(),
    };
    let reporter = ListReporter::new(cli.color.should_color(), false);
    print!("{}", reporter.render_registry(&registry, args.js));
}

/// Print generated e-mail addresses
pub fn run_email(args: &EmailArgs) -> CliResult<()> {
    if args.count == 0 {
        return Err(CliError::invalid_argument("--count must be at least 1"));
    }
    for _ in 0..args.count {
        println!("{}", generate_unique_email(&args.base));
    }
    Ok(())
}
