//! # docshape-cli: Command-Line Interface
//!
//! Provides the `docshape` binary on top of `docshape-schema`.
//!
//! ## Subcommands
//!
//! - `docshape validate`: validate YAML/JSON documents against a declared type.
//! - `docshape schema`: print the derived schema as JSON Schema.
//!
//! ```bash
//! docshape validate --types types/ --type Mail mail.yaml other.json
//! docshape validate --types mail.types.yaml --type Mail --format json mail.json
//! docshape schema --types types/ --type Mail
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers; handlers return an
//!   exit code and leave printing policy to the subcommand module.
//! - Exit codes: 0 all documents valid, 1 any document invalid or
//!   unreadable, 2 operational error (unknown type or bad description).

pub mod config;
pub mod schema;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use docshape_schema::{DefaultRequired, GeneratorConfig, Schema, TypeRegistry};

use crate::config::CliConfig;

/// Command-line spelling of [`DefaultRequired`].
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultRequiredArg {
    /// Only fields annotated `required: true` are required.
    ExplicitOnly,
    /// Every non-nullable field is required unless marked optional.
    AllNonNullable,
}

impl From<DefaultRequiredArg> for DefaultRequired {
    fn from(arg: DefaultRequiredArg) -> Self {
        match arg {
            DefaultRequiredArg::ExplicitOnly => DefaultRequired::ExplicitOnly,
            DefaultRequiredArg::AllNonNullable => DefaultRequired::AllNonNullable,
        }
    }
}

/// Where the schema comes from: shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct SchemaSourceArgs {
    /// Type description file, or a directory of `*.types.{yaml,yml,json}` files.
    #[arg(long, value_name = "PATH")]
    pub types: Option<PathBuf>,

    /// Name of the root type.
    #[arg(long = "type", value_name = "NAME")]
    pub type_name: String,

    /// Which fields are required when a description does not say.
    #[arg(long, value_enum)]
    pub default_required: Option<DefaultRequiredArg>,
}

impl SchemaSourceArgs {
    /// Load the type descriptions and generate the root schema. Flags take
    /// precedence over the config file.
    pub fn build(&self, config: &CliConfig) -> Result<Schema> {
        let types = self
            .types
            .clone()
            .or_else(|| config.types.clone())
            .context("no type descriptions given: pass --types or set `types` in the config file")?;

        let registry = TypeRegistry::load(&types)
            .with_context(|| format!("failed to load type descriptions from {}", types.display()))?;

        let default_required = self
            .default_required
            .map(DefaultRequired::from)
            .or(config.default_required)
            .unwrap_or_default();

        let schema = Schema::generate(
            &registry,
            &self.type_name,
            GeneratorConfig::new(default_required),
        )
        .with_context(|| format!("cannot derive a schema for type '{}'", self.type_name))?;

        tracing::info!(
            type_name = %self.type_name,
            types = registry.len(),
            nodes = schema.set().len(),
            ?default_required,
            "schema ready"
        );
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const MAIL_TYPES: &str = r#"
types:
  - name: Mail
    fields:
      - name: to
        type: MailSource
        required: true
      - name: from
        type: "[MailSource]"
        required: true
        non_empty: true
  - name: MailSource
    fields:
      - name: email
        type: string
        required: true
"#;

    fn source(types: Option<&Path>, type_name: &str) -> SchemaSourceArgs {
        SchemaSourceArgs {
            types: types.map(Path::to_path_buf),
            type_name: type_name.to_string(),
            default_required: None,
        }
    }

    #[test]
    fn test_build_from_types_flag() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mail.types.yaml"), MAIL_TYPES).unwrap();

        let schema = source(Some(dir.path()), "Mail")
            .build(&CliConfig::default())
            .unwrap();
        assert!(schema.set().type_schema("MailSource").is_some());
    }

    #[test]
    fn test_build_falls_back_to_config_types() {
        let dir = tempfile::tempdir().unwrap();
        let types = dir.path().join("mail.types.yaml");
        std::fs::write(&types, MAIL_TYPES).unwrap();
        let config = CliConfig {
            types: Some(types),
            ..CliConfig::default()
        };

        assert!(source(None, "Mail").build(&config).is_ok());
    }

    #[test]
    fn test_build_without_types_is_error() {
        let err = source(None, "Mail").build(&CliConfig::default()).unwrap_err();
        assert!(err.to_string().contains("--types"), "got: {err}");
    }

    #[test]
    fn test_build_unknown_type_names_it() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mail.types.yaml"), MAIL_TYPES).unwrap();

        let err = source(Some(dir.path()), "Letter")
            .build(&CliConfig::default())
            .unwrap_err();
        assert!(format!("{err:#}").contains("Letter"), "got: {err:#}");
    }

    #[test]
    fn test_default_required_arg_maps_to_mode() {
        assert_eq!(
            DefaultRequired::from(DefaultRequiredArg::AllNonNullable),
            DefaultRequired::AllNonNullable
        );
        assert_eq!(
            DefaultRequired::from(DefaultRequiredArg::ExplicitOnly),
            DefaultRequired::ExplicitOnly
        );
    }
}
