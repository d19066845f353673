//! # Validate Subcommand
//!
//! Validates one or more documents against a declared root type and prints
//! every violation found, not just the first.
//!
//! Text output mirrors a CI log:
//!
//! ```text
//! OK: good.json
//! FAIL: bad.yaml (2 errors)
//!   cc[0].email: value "foo@bar@baz" does not match the declared pattern
//!   (root): required properties are missing: to, from
//! FAIL: broken.json (unreadable)
//!   failed to load document broken.json: invalid JSON: key must be a string at line 1 column 2
//!
//! Documents: 1/3 passed
//! ```
//!
//! A document that cannot be read or parsed fails on its own line; the rest
//! of the batch is still validated.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use docshape_core::ValidationError;
use docshape_schema::{load_document, validate, Schema};

use crate::config::CliConfig;
use crate::SchemaSourceArgs;

/// Output format for validation results.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per document and per error.
    #[default]
    Text,
    /// A JSON array of per-document reports.
    Json,
}

/// Arguments for the `docshape validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: SchemaSourceArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Documents to validate (`.yaml`/`.yml` as YAML, anything else as JSON).
    #[arg(value_name = "DOC", required = true)]
    pub documents: Vec<PathBuf>,
}

/// Validation outcome for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    /// Set when the document could not be read or parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

impl DocumentReport {
    fn checked(path: &Path, errors: Vec<ValidationError>) -> Self {
        Self {
            path: path.to_path_buf(),
            valid: errors.is_empty(),
            errors,
            load_error: None,
        }
    }

    fn unreadable(path: &Path, reason: String) -> Self {
        Self {
            path: path.to_path_buf(),
            valid: false,
            errors: Vec::new(),
            load_error: Some(reason),
        }
    }
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every document is valid, 1 when any is invalid
/// or unreadable. Schema problems are errors (exit code 2).
pub fn run_validate(args: &ValidateArgs, config: &CliConfig) -> Result<u8> {
    let schema = args.source.build(config)?;
    let reports = validate_documents(&schema, &args.documents);

    match args.format {
        OutputFormat::Text => print!("{}", render_text(&reports)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("failed to render JSON report")?
        ),
    }

    Ok(exit_code(&reports))
}

/// Load and validate each document in order, one report per path.
pub fn validate_documents(schema: &Schema, paths: &[PathBuf]) -> Vec<DocumentReport> {
    paths
        .iter()
        .map(|path| validate_document(schema, path))
        .collect()
}

fn validate_document(schema: &Schema, path: &Path) -> DocumentReport {
    let document = match load_document(path) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "document not loaded");
            return DocumentReport::unreadable(path, e.to_string());
        }
    };
    let errors = validate(&document, schema.schema_ref());
    tracing::debug!(path = %path.display(), errors = errors.len(), "validated document");
    DocumentReport::checked(path, errors)
}

/// Human-readable report: a line per document, its errors indented below,
/// and a pass summary.
pub fn render_text(reports: &[DocumentReport]) -> String {
    let mut out = String::new();
    for report in reports {
        if report.valid {
            out.push_str(&format!("OK: {}\n", report.path.display()));
            continue;
        }
        if let Some(reason) = &report.load_error {
            out.push_str(&format!("FAIL: {} (unreadable)\n", report.path.display()));
            out.push_str(&format!("  {reason}\n"));
            continue;
        }
        let count = report.errors.len();
        let noun = if count == 1 { "error" } else { "errors" };
        out.push_str(&format!("FAIL: {} ({count} {noun})\n", report.path.display()));
        for error in &report.errors {
            out.push_str(&format!("  {error}\n"));
        }
    }

    let passed = reports.iter().filter(|r| r.valid).count();
    out.push_str(&format!("\nDocuments: {passed}/{} passed\n", reports.len()));
    out
}

fn exit_code(reports: &[DocumentReport]) -> u8 {
    if reports.iter().all(|r| r.valid) {
        0
    } else {
        1
    }
}
