//! authcheck CLI: run end-to-end checks of sign-in and sign-up flows
//!
//! ## Usage
//!
//! ```bash
//! authcheck test                              # Both suites against the fake app
//! authcheck test --suite login --grep "Test 2"
//! authcheck test --driver chromium --headed   # Real browser (feature "browser")
//! authcheck locators --page registration      # Print a locator registry
//! authcheck email --base qa@example.org       # Generate a unique address
//! ```

use authcheck_cli::{
    run_email, run_locators, run_tests, Cli, CliConfig, CliError, CliResult, ColorChoice,
    Commands, Verbosity,
};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<bool> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config);

    match cli.command {
        Commands::Test(args) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|e| CliError::test_execution(format!("cannot start runtime: {e}")))?;
            runtime.block_on(run_tests(config, &args))
        }
        Commands::Locators(args) => {
            run_locators(config, &args);
            Ok(true)
        }
        Commands::Email(args) => run_email(&args).map(|()| true),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

/// `RUST_LOG` wins over the `-v` derived default
fn init_tracing(config: CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.color.should_color())
        .with_target(false)
        .try_init();
}
