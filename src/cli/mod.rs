//! Command-line interface module.
//!
//! This module defines the CLI structure using Clap, including
//! all commands, arguments, and options.
//!
//! # Commands
//!
//! - `check` (default): Compare declared module versions with their upstream
//! - `init`: Create an example configuration file
//! - `validate`: Validate a configuration file
//!
//! # Example Usage
//!
//! ```bash
//! # Check the current directory
//! moddrift
//!
//! # Check a directory with a GitHub token for tag lookups
//! WORKING_DIRECTORY=./infra PERSONAL_ACCESS_TOKEN=ghp_xxx moddrift
//!
//! # JSON report, failing the build on drift
//! moddrift check -d ./infra --format json --output drift.json --strict
//!
//! # Initialize configuration
//! moddrift init
//! ```

use crate::types::ReportFormat;
use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// moddrift - Terraform/OpenTofu module drift checker.
#[derive(Parser, Debug)]
#[command(
    name = "moddrift",
    author,
    version,
    about = "Report Terraform/OpenTofu modules that lag behind their upstream",
    long_about = "moddrift walks a directory of Terraform/OpenTofu files, reads every module \
                  block and compares its declared version with the latest version published \
                  on the module registry, or with the greatest tag of its GitHub repository \
                  for git:: sources."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "MODDRIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to run (defaults to `check`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Arguments of the default `check` command
    #[command(flatten)]
    pub check: CheckArgs,
}

impl Cli {
    /// Parse the process arguments, exiting with a usage error on failure.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::try_parse_args_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parse `args`, rejecting `check` options that precede a subcommand.
    ///
    /// Without a subcommand those options belong to the default `check`;
    /// with one they would otherwise be dropped.
    ///
    /// # Errors
    ///
    /// Returns a clap error for invalid arguments or misplaced `check` options.
    pub fn try_parse_args_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut command = Self::command();
        let matches = command.try_get_matches_from_mut(args)?;

        if let Some((name, _)) = matches.subcommand() {
            let check = CheckArgs::augment_args(clap::Command::new("check"));
            let misplaced = check.get_arguments().find(|arg| {
                matches.value_source(arg.get_id().as_str()) == Some(ValueSource::CommandLine)
            });

            if let Some(arg) = misplaced {
                let flag = arg.get_long().unwrap_or_else(|| arg.get_id().as_str());
                return Err(command.error(
                    ErrorKind::ArgumentConflict,
                    format!("'--{flag}' cannot be used before the '{name}' subcommand; pass it after 'check' instead"),
                ));
            }
        }

        Self::from_arg_matches(&matches)
    }

    /// The command to run, with `check` filled in when none was given.
    #[must_use]
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Check(self.check))
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check modules against their upstream versions
    #[command(visible_alias = "c")]
    Check(CheckArgs),

    /// Create an example configuration file
    Init,

    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Arguments for the check command.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Directory to scan for .tf files
    #[arg(short = 'd', long, env = "WORKING_DIRECTORY", default_value = ".", value_name = "DIR")]
    pub working_directory: PathBuf,

    /// GitHub token used for tag listing
    #[arg(short, long, env = "PERSONAL_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: ReportFormat,

    /// Output file path (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// File or directory names to skip (glob patterns)
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    pub exclude_patterns: Vec<String>,

    /// Exit with code 1 when any module is outdated
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(value_name = "FILE", default_value = "moddrift.yaml")]
    pub config: PathBuf,
}
