//! # Loading
//!
//! Thin adapters from files to the inputs of validation: documents are
//! deserialized straight into [`Document`] with `serde_yaml` or
//! `serde_json`, chosen by file extension.

use std::path::Path;

use docshape_core::Document;
use thiserror::Error;

/// Errors raised while loading type descriptions or documents.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A type description file could not be read or parsed.
    #[error("failed to load type descriptions {path}: {reason}")]
    TypeLoad {
        /// Path or origin of the description.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The same type name is described more than once.
    #[error("type '{name}' is described more than once (duplicate in {path})")]
    DuplicateType {
        /// The duplicated type name.
        name: String,
        /// Where the duplicate was found.
        path: String,
    },

    /// A document could not be read or parsed.
    #[error("failed to load document {path}: {reason}")]
    DocumentLoad {
        /// Path to the document.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// I/O error during directory traversal.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text format of a document or description file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.yaml`/`.yml` are YAML; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

/// Parse document text in the given format.
pub fn parse_document(content: &str, format: DocumentFormat) -> Result<Document, String> {
    match format {
        DocumentFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}"))
        }
        DocumentFormat::Json => {
            serde_json::from_str(content).map_err(|e| format!("invalid JSON: {e}"))
        }
    }
}

/// Read and parse a document file; the format follows the extension.
pub fn load_document(path: &Path) -> Result<Document, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::DocumentLoad {
        path: path.display().to_string(),
        reason: format!("cannot read file: {e}"),
    })?;

    parse_document(&content, DocumentFormat::from_path(path)).map_err(|reason| {
        LoadError::DocumentLoad {
            path: path.display().to_string(),
            reason,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("noext")), DocumentFormat::Json);
    }

    #[test]
    fn test_load_json_and_yaml_documents_agree() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("mail.json");
        let yaml_path = dir.path().join("mail.yaml");
        std::fs::write(&json_path, r#"{"to": {"email": "rd@dummy.example"}, "from": []}"#)
            .unwrap();
        std::fs::write(&yaml_path, "to:\n  email: rd@dummy.example\nfrom: []\n").unwrap();

        let from_json = load_document(&json_path).unwrap();
        let from_yaml = load_document(&yaml_path).unwrap();
        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn test_missing_document_is_load_error() {
        let err = load_document(Path::new("/nonexistent/doc.json")).unwrap_err();
        match err {
            LoadError::DocumentLoad { path, reason } => {
                assert!(path.ends_with("doc.json"));
                assert!(reason.contains("cannot read file"));
            }
            other => panic!("Expected DocumentLoad, got: {other}"),
        }
    }

    #[test]
    fn test_malformed_json_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_document(&path).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"), "got: {err}");
    }
}
