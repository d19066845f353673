//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`. Every setting can also be
//! given on the command line; flags win.
//!
//! ```yaml
//! types: schemas/
//! default_required: all_non_nullable
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use docshape_schema::DefaultRequired;

/// Settings read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Type description file or directory.
    pub types: Option<PathBuf>,
    /// Generator default-required mode.
    pub default_required: Option<DefaultRequired>,
}

impl CliConfig {
    /// Read a config file. A relative `types` path is resolved against the
    /// directory containing the config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let mut config: CliConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.types = config
                .types
                .map(|types| if types.is_relative() { base.join(types) } else { types });
        }

        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// [`load`](Self::load) when a path is given, defaults otherwise.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_resolves_types_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docshape.yaml");
        std::fs::write(&path, "types: schemas\ndefault_required: all_non_nullable\n").unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.types, Some(dir.path().join("schemas")));
        assert_eq!(config.default_required, Some(DefaultRequired::AllNonNullable));
    }

    #[test]
    fn test_absolute_types_path_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docshape.yaml");
        std::fs::write(&path, "types: /srv/types\n").unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.types, Some(PathBuf::from("/srv/types")));
        assert_eq!(config.default_required, None);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docshape.yaml");
        std::fs::write(&path, "typez: schemas\n").unwrap();

        let err = CliConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("invalid config file"), "got: {err}");
    }

    #[test]
    fn test_no_path_gives_defaults() {
        assert_eq!(CliConfig::load_optional(None).unwrap(), CliConfig::default());
    }
}
