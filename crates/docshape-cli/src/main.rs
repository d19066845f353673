//! # docshape CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docshape_cli::config::CliConfig;
use docshape_cli::schema::{run_schema, SchemaArgs};
use docshape_cli::validate::{run_validate, ValidateArgs};

/// docshape: validate semi-structured documents against declared types.
///
/// Derives a schema from type descriptions (YAML or JSON) and reports every
/// structural violation in a document: missing required fields, pattern
/// mismatches, short arrays and kind mismatches.
#[derive(Parser, Debug)]
#[command(name = "docshape", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate documents against a declared type.
    Validate(ValidateArgs),

    /// Print the derived schema as JSON Schema.
    Schema(SchemaArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr so `--format json` output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "docshape starting");

    let result = CliConfig::load_optional(cli.config.as_deref()).and_then(|config| {
        match &cli.command {
            Commands::Validate(args) => run_validate(args, &config),
            Commands::Schema(args) => run_schema(args, &config),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
