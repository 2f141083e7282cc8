//! modgraph-lint CLI tool.
//!
//! Usage:
//! ```bash
//! modgraph-lint check [OPTIONS] <INPUT>
//! modgraph-lint list-rules
//! modgraph-lint init
//! ```
//!
//! Exit codes: 0 when no error-severity violation exists, 1 when one does,
//! 2 when the configuration or input cannot be loaded.

use anyhow::Result;
use clap::{Parser, Subcommand};
use modgraph_lint_core::ConfigError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Exit code when an error-severity violation was found.
const EXIT_VIOLATIONS: u8 = 1;
/// Exit code for configuration and input failures.
const EXIT_FATAL: u8 = 2;

/// Module dependency graph linter: cycles, orphans, forbidden imports and
/// element boundaries
#[derive(Parser)]
#[command(name = "modgraph-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "MODGRAPH_LINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a dependency graph
    Check {
        /// JSON dependency document produced by the extractor ("-" for stdin)
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Project directory used to look up the configuration file
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },

    /// List built-in rules and presets
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    ExitCode::from(exit_code(run(cli)))
}

fn run(cli: Cli) -> Result<u8> {
    match cli.command {
        Commands::Check {
            input,
            format,
            project,
        } => {
            let passed =
                commands::check::run(&input, format, &project, cli.config.as_deref())?;
            Ok(if passed { 0 } else { EXIT_VIOLATIONS })
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(0)
        }
        Commands::Init { force } => {
            commands::init::run(force)?;
            Ok(0)
        }
    }
}

fn exit_code(result: Result<u8>) -> u8 {
    result.unwrap_or_else(|err| {
        report_fatal(err);
        EXIT_FATAL
    })
}

/// Configuration errors get a full miette diagnostic; everything else prints
/// its context chain.
fn report_fatal(err: anyhow::Error) {
    match err.downcast::<ConfigError>() {
        Ok(config_err) => eprintln!("{:?}", miette::Report::new(config_err)),
        Err(other) => eprintln!("Error: {other:?}"),
    }
}
