//! moddrift CLI entry point.
//!
//! This binary provides the command-line interface for moddrift.

use moddrift::cli::{CheckArgs, Cli, Commands};
use moddrift::reporter::Reporter;
use moddrift::{Checker, Config, ModDriftError};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    init_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");

            eprintln!("Error: {e}");

            let mut source = e.source();
            if source.is_some() {
                eprintln!("\nCaused by:");
                let mut i = 0;
                while let Some(cause) = source {
                    eprintln!("  {i}: {cause}");
                    source = cause.source();
                    i += 1;
                }
            }

            let code = e
                .downcast_ref::<ModDriftError>()
                .map_or(1, ModDriftError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        // RUST_LOG wins over the verbose flag
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let base_level = match verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            };
            EnvFilter::new(format!("warn,moddrift={base_level}"))
        })
    };

    // stdout carries the report only
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config_path = cli.config.clone();

    match cli.into_command() {
        Commands::Check(args) => {
            let mut config = Config::load(config_path.as_deref())?;
            config.merge_cli_args(&args);
            check(&config, &args).await
        }

        Commands::Init => {
            let config_path = Path::new("moddrift.yaml");
            if config_path.exists() {
                anyhow::bail!("Configuration file already exists: {}", config_path.display());
            }

            std::fs::write(config_path, Config::example_yaml())?;
            println!("Created example configuration: moddrift.yaml");
            Ok(ExitCode::SUCCESS)
        }

        Commands::Validate(args) => validate(&args.config),
    }
}

async fn check(config: &Config, args: &CheckArgs) -> anyhow::Result<ExitCode> {
    tracing::debug!(dir = %args.working_directory.display(), "Executing check command");
    let checker = Checker::new(config)?;
    let result = checker.check_directory(&args.working_directory).await?;

    let report = Reporter::new(config).generate(&result, args.format)?;

    if let Some(output_path) = &args.output {
        std::fs::write(output_path, &report)?;
        tracing::info!(path = %output_path.display(), "Report written");
    } else if report.is_empty() || report.ends_with('\n') {
        print!("{report}");
    } else {
        println!("{report}");
    }

    if args.strict && result.has_drift() {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn validate(path: &Path) -> anyhow::Result<ExitCode> {
    match Config::from_file(path) {
        Ok(_) => {
            println!("Configuration is valid: {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Configuration error: {e}");
            Ok(ExitCode::from(1))
        }
    }
}
