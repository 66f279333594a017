//! authcheck CLI library
//!
//! Command-line interface for running the sign-in and registration suites.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, DriverArg, EmailArgs, LocatorsArgs, PageArg, SuiteArg, TestArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ListReporter;
pub use runner::{resolve_credentials, resolve_run_config, run_email, run_locators, run_tests};
