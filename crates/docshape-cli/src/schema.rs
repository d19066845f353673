//! # Schema Subcommand
//!
//! Prints the schema derived for a root type as a JSON Schema document.

use anyhow::{Context, Result};
use clap::Args;

use docshape_schema::to_json_schema;

use crate::config::CliConfig;
use crate::SchemaSourceArgs;

/// Arguments for the `docshape schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[command(flatten)]
    pub source: SchemaSourceArgs,
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs, config: &CliConfig) -> Result<u8> {
    println!("{}", render_schema(args, config)?);
    Ok(0)
}

/// Pretty-printed JSON Schema for the requested type.
pub fn render_schema(args: &SchemaArgs, config: &CliConfig) -> Result<String> {
    let schema = args.source.build(config)?;
    let exported = to_json_schema(schema.schema_ref());
    serde_json::to_string_pretty(&exported).context("failed to render JSON Schema")
}
