//! CLI command definitions using clap

use authcheck::suites::SuiteKind;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// authcheck: end-to-end checks for sign-in and sign-up flows
#[derive(Parser, Debug)]
#[command(name = "authcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the login and registration suites
    Test(TestArgs),

    /// Print the locator registry of a page
    Locators(LocatorsArgs),

    /// Print a generated unique e-mail address
    Email(EmailArgs),
}

/// Arguments for the test command
#[derive(Parser, Debug)]
pub struct TestArgs {
    /// Suite to run
    #[arg(short, long, value_enum, default_value = "all")]
    pub suite: SuiteArg,

    /// Only run tests whose "<suite> <test>" title matches this regex
    #[arg(short, long)]
    pub grep: Option<String>,

    /// Session driver
    #[arg(long, value_enum, default_value = "fake")]
    pub driver: DriverArg,

    /// Configuration file (default: authcheck.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Credential fixture file
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// Base URL of the application
    #[arg(long)]
    pub base_url: Option<String>,

    /// Extra attempts for failing scenarios
    #[arg(long)]
    pub retries: Option<u32>,

    /// Concurrent scenarios
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Output directory for report.json and screenshots
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the locators command
#[derive(Parser, Debug)]
pub struct LocatorsArgs {
    /// Page whose registry to print
    #[arg(short, long, value_enum, default_value = "auth")]
    pub page: PageArg,

    /// Also print the generated JavaScript query
    #[arg(long)]
    pub js: bool,
}

/// Arguments for the email command
#[derive(Parser, Debug)]
pub struct EmailArgs {
    /// Address the suffix is inserted into
    #[arg(short, long, default_value = authcheck::pages::DEFAULT_EMAIL_BASE)]
    pub base: String,

    /// How many addresses to print
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,
}

/// Suite selection
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SuiteArg {
    /// Login flow
    Login,
    /// Registration flow
    Registration,
    /// Both suites
    #[default]
    All,
}

impl From<SuiteArg> for SuiteKind {
    fn from(arg: SuiteArg) -> Self {
        match arg {
            SuiteArg::Login => Self::Login,
            SuiteArg::Registration => Self::Registration,
            SuiteArg::All => Self::All,
        }
    }
}

/// Session driver
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DriverArg {
    /// In-memory simulated application
    #[default]
    Fake,
    /// Real chromium over CDP
    Chromium,
}

/// Page selection for `locators`
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageArg {
    /// Sign-in screen
    #[default]
    Auth,
    /// Registration form
    Registration,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_test_defaults() {
            let cli = Cli::try_parse_from(["authcheck", "test"]).unwrap();
            let Commands::Test(args) = cli.command else {
                panic!("expected test command");
            };
            assert_eq!(args.suite, SuiteArg::All);
            assert_eq!(args.driver, DriverArg::Fake);
            assert!(args.grep.is_none());
            assert!(!args.headed);
        }

        #[test]
        fn test_parse_test_flags() {
            let cli = Cli::try_parse_from([
                "authcheck",
                "-vv",
                "test",
                "--suite",
                "registration",
                "--grep",
                "Empty form",
                "--retries",
                "2",
                "-j",
                "4",
                "--base-url",
                "http://localhost:4200/",
            ])
            .unwrap();
            assert_eq!(cli.verbose, 2);
            let Commands::Test(args) = cli.command else {
                panic!("expected test command");
            };
            assert_eq!(SuiteKind::from(args.suite), SuiteKind::Registration);
            assert_eq!(args.grep.as_deref(), Some("Empty form"));
            assert_eq!(args.retries, Some(2));
            assert_eq!(args.workers, Some(4));
            assert_eq!(args.base_url.as_deref(), Some("http://localhost:4200/"));
        }

        #[test]
        fn test_global_flags_after_subcommand() {
            let cli = Cli::try_parse_from(["authcheck", "email", "-q", "--color", "never"]).unwrap();
            assert!(cli.quiet);
            assert!(matches!(cli.color, ColorArg::Never));
        }

        #[test]
        fn test_unknown_suite_rejected() {
            assert!(Cli::try_parse_from(["authcheck", "test", "--suite", "checkout"]).is_err());
        }

        #[test]
        fn test_email_defaults() {
            let cli = Cli::try_parse_from(["authcheck", "email"]).unwrap();
            let Commands::Email(args) = cli.command else {
                panic!("expected email command");
            };
            assert_eq!(args.base, "test@gmail.com");
            assert_eq!(args.count, 1);
        }
    }
}
