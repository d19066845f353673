//! # Type Descriptions
//!
//! The declarative input to the schema generator: named object types, each
//! an ordered list of fields with a type expression and per-field
//! constraint metadata. Descriptions are built in code with the builder
//! methods or loaded from YAML/JSON files:
//!
//! ```yaml
//! types:
//!   - name: Mail
//!     fields:
//!       - name: to
//!         type: MailSource
//!         required: true
//!       - name: from
//!         type: "[MailSource]"
//!         required: true
//!         non_empty: true
//!   - name: MailSource
//!     fields:
//!       - name: email
//!         type: string
//!         required: true
//!         pattern: "[^@\\s]+@[^@\\s]+"
//!       - name: name
//!         type: string
//! ```
//!
//! Keys a field carries that are not recognized constraints are kept in
//! [`FieldDescription::annotations`]; the generator rejects them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::loader::{DocumentFormat, LoadError};

// ---------------------------------------------------------------------------
// Type expressions
// ---------------------------------------------------------------------------

/// The type of a field: a scalar keyword, an array, or a named object type.
///
/// Text form: `string`, `number`, `integer`, `boolean`, `any`, `[T]` (or
/// `T[]`) for arrays, and any other identifier for a named type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeExpr {
    String,
    Number,
    Integer,
    Boolean,
    Any,
    Array(Box<TypeExpr>),
    Named(String),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    pub fn array_of(element: TypeExpr) -> Self {
        TypeExpr::Array(Box::new(element))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeExpr::Array(_))
    }
}

/// A type expression that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid type expression '{0}'")]
pub struct TypeExprError(pub String);

impl FromStr for TypeExpr {
    type Err = TypeExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
            let element = inner.parse().map_err(|_| TypeExprError(s.to_string()))?;
            return Ok(TypeExpr::array_of(element));
        }
        if let Some(inner) = text.strip_suffix("[]") {
            let element = inner.parse().map_err(|_| TypeExprError(s.to_string()))?;
            return Ok(TypeExpr::array_of(element));
        }
        match text {
            "string" => Ok(TypeExpr::String),
            "number" => Ok(TypeExpr::Number),
            "integer" => Ok(TypeExpr::Integer),
            "boolean" => Ok(TypeExpr::Boolean),
            "any" => Ok(TypeExpr::Any),
            name if is_type_name(name) => Ok(TypeExpr::Named(name.to_string())),
            _ => Err(TypeExprError(s.to_string())),
        }
    }
}

fn is_type_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::String => f.write_str("string"),
            TypeExpr::Number => f.write_str("number"),
            TypeExpr::Integer => f.write_str("integer"),
            TypeExpr::Boolean => f.write_str("boolean"),
            TypeExpr::Any => f.write_str("any"),
            TypeExpr::Array(element) => write!(f, "[{element}]"),
            TypeExpr::Named(name) => f.write_str(name),
        }
    }
}

impl TryFrom<String> for TypeExpr {
    type Error = TypeExprError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TypeExpr> for String {
    fn from(expr: TypeExpr) -> Self {
        expr.to_string()
    }
}

// ---------------------------------------------------------------------------
// Fields and types
// ---------------------------------------------------------------------------

/// One declared property of an object type, with its constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescription {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeExpr,

    /// Explicit presence annotation. `None` defers to the generator's
    /// default-required mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    /// Explicit nullability. `None` defers to the generator's mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// Full-match regular expression for string fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Minimum element count for array fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    /// Shorthand for `min_length: 1`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub non_empty: bool,

    /// Unrecognized constraint keys, kept so the generator can reject them.
    #[serde(flatten)]
    pub annotations: BTreeMap<String, serde_json::Value>,
}

impl FieldDescription {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            required: None,
            nullable: None,
            pattern: None,
            min_length: None,
            non_empty: false,
            annotations: BTreeMap::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = Some(false);
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    /// Attach an arbitrary constraint key.
    pub fn annotation(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.annotations.insert(key.into(), value);
        self
    }

    /// Effective minimum length: `non_empty` raises it to at least 1.
    pub fn effective_min_length(&self) -> Option<usize> {
        match (self.min_length, self.non_empty) {
            (Some(n), true) => Some(n.max(1)),
            (Some(n), false) => Some(n),
            (None, true) => Some(1),
            (None, false) => None,
        }
    }
}

/// A named object type: its fields in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectType {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescription>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDescription) -> Self {
        self.fields.push(field);
        self
    }
}

/// On-disk layout of a type description file.
#[derive(Debug, Deserialize)]
struct TypeFile {
    #[serde(default)]
    types: Vec<ObjectType>,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// File suffixes scanned by [`TypeRegistry::load_dir`].
const TYPE_FILE_SUFFIXES: &[&str] = &[".types.yaml", ".types.yml", ".types.json"];

/// Named object types available to the generator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeRegistry {
    types: BTreeMap<String, ObjectType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_type(mut self, ty: ObjectType) -> Self {
        self.register(ty);
        self
    }

    /// Add or replace a type, returning the previous description.
    pub fn register(&mut self, ty: ObjectType) -> Option<ObjectType> {
        self.types.insert(ty.name.clone(), ty)
    }

    pub fn get(&self, name: &str) -> Option<&ObjectType> {
        self.types.get(name)
    }

    /// Type names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Parse a YAML type description file.
    pub fn from_yaml_str(content: &str) -> Result<Self, LoadError> {
        Self::parse(content, DocumentFormat::Yaml, "<inline>")
    }

    /// Parse a JSON type description file.
    pub fn from_json_str(content: &str) -> Result<Self, LoadError> {
        Self::parse(content, DocumentFormat::Json, "<inline>")
    }

    /// Load one description file; the format follows the extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let mut registry = Self::new();
        registry.merge_file(path)?;
        Ok(registry)
    }

    /// Load every `*.types.{yaml,yml,json}` file in `dir`, in file name
    /// order. A type described in two files is an error.
    pub fn load_dir(dir: &Path) -> Result<Self, LoadError> {
        let entries = std::fs::read_dir(dir).map_err(|e| LoadError::TypeLoad {
            path: dir.display().to_string(),
            reason: format!("cannot read type directory: {e}"),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_type_file = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| TYPE_FILE_SUFFIXES.iter().any(|s| n.ends_with(s)));
            if is_type_file && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        let mut registry = Self::new();
        for path in &files {
            registry.merge_file(path)?;
        }
        tracing::debug!(
            dir = %dir.display(),
            files = files.len(),
            types = registry.len(),
            "loaded type descriptions"
        );
        Ok(registry)
    }

    /// Load from a single file or a directory of description files.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        if path.is_dir() {
            Self::load_dir(path)
        } else {
            Self::from_path(path)
        }
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), LoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| LoadError::TypeLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let parsed = Self::parse(
            &content,
            DocumentFormat::from_path(path),
            &path.display().to_string(),
        )?;
        for ty in parsed.types.into_values() {
            if self.types.contains_key(&ty.name) {
                return Err(LoadError::DuplicateType {
                    name: ty.name,
                    path: path.display().to_string(),
                });
            }
            self.register(ty);
        }
        Ok(())
    }

    fn parse(content: &str, format: DocumentFormat, origin: &str) -> Result<Self, LoadError> {
        let file: TypeFile = match format {
            DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
        .map_err(|reason| LoadError::TypeLoad {
            path: origin.to_string(),
            reason,
        })?;

        let mut registry = Self::new();
        for ty in file.types {
            if registry.types.contains_key(&ty.name) {
                return Err(LoadError::DuplicateType {
                    name: ty.name,
                    path: origin.to_string(),
                });
            }
            registry.register(ty);
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

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
        pattern: "[^@\\s]+@[^@\\s]+"
      - name: name
        type: string
"#;

    #[test]
    fn test_parse_type_expressions() {
        assert_eq!("string".parse::<TypeExpr>().unwrap(), TypeExpr::String);
        assert_eq!(
            "[MailSource]".parse::<TypeExpr>().unwrap(),
            TypeExpr::array_of(TypeExpr::named("MailSource"))
        );
        assert_eq!(
            "MailSource[]".parse::<TypeExpr>().unwrap(),
            TypeExpr::array_of(TypeExpr::named("MailSource"))
        );
        assert_eq!(
            "[[integer]]".parse::<TypeExpr>().unwrap(),
            TypeExpr::array_of(TypeExpr::array_of(TypeExpr::Integer))
        );
        assert!("".parse::<TypeExpr>().is_err());
        assert!("[]".parse::<TypeExpr>().is_err());
        assert!("9lives".parse::<TypeExpr>().is_err());
    }

    #[test]
    fn test_type_expr_display_round_trips_text() {
        for text in ["string", "[MailSource]", "[[boolean]]", "any", "Node"] {
            let expr: TypeExpr = text.parse().unwrap();
            assert_eq!(expr.to_string(), text);
        }
    }

    #[test]
    fn test_load_yaml_descriptions() {
        let registry = TypeRegistry::from_yaml_str(MAIL_TYPES).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Mail", "MailSource"]);

        let mail = registry.get("Mail").unwrap();
        let names: Vec<&str> = mail.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["to", "from"]);
        assert_eq!(mail.fields[1].effective_min_length(), Some(1));

        let source = registry.get("MailSource").unwrap();
        assert_eq!(source.fields[0].pattern.as_deref(), Some(r"[^@\s]+@[^@\s]+"));
        assert_eq!(source.fields[1].required, None);
        assert!(source.fields[1].annotations.is_empty());
    }

    #[test]
    fn test_unrecognized_keys_are_kept_as_annotations() {
        let registry = TypeRegistry::from_json_str(
            r#"{"types": [{"name": "T", "fields": [
                {"name": "n", "type": "integer", "maximum": 10}
            ]}]}"#,
        )
        .unwrap();
        let field = &registry.get("T").unwrap().fields[0];
        assert_eq!(field.annotations.get("maximum"), Some(&json!(10)));
    }

    #[test]
    fn test_duplicate_type_in_one_file_is_rejected() {
        let err = TypeRegistry::from_yaml_str(
            "types:\n  - name: A\n  - name: A\n",
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::DuplicateType { ref name, .. } if name == "A"));
    }

    #[test]
    fn test_bad_type_expression_is_a_load_error() {
        let err = TypeRegistry::from_yaml_str(
            "types:\n  - name: A\n    fields:\n      - name: x\n        type: \"[oops\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::TypeLoad { .. }), "got: {err}");
    }

    #[test]
    fn test_builder_matches_loaded_description() {
        let built = TypeRegistry::new().with_type(
            ObjectType::new("MailSource")
                .field(
                    FieldDescription::new("email", TypeExpr::String)
                        .required()
                        .pattern(r"[^@\s]+@[^@\s]+"),
                )
                .field(FieldDescription::new("name", TypeExpr::String)),
        );
        let loaded = TypeRegistry::from_yaml_str(MAIL_TYPES).unwrap();
        assert_eq!(built.get("MailSource"), loaded.get("MailSource"));
    }

    #[test]
    fn test_load_dir_merges_files_and_skips_others() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.types.yaml"),
            "types:\n  - name: A\n    fields:\n      - name: b\n        type: B\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("b.types.json"),
            r#"{"types": [{"name": "B", "fields": []}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.yaml"), "not: a type file\n").unwrap();

        let registry = TypeRegistry::load(dir.path()).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_load_dir_rejects_type_described_twice() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.types.yaml"), "types:\n  - name: A\n").unwrap();
        std::fs::write(dir.path().join("b.types.yaml"), "types:\n  - name: A\n").unwrap();

        let err = TypeRegistry::load_dir(dir.path()).unwrap_err();
        match err {
            LoadError::DuplicateType { name, path } => {
                assert_eq!(name, "A");
                assert!(path.ends_with("b.types.yaml"));
            }
            other => panic!("Expected DuplicateType, got: {other}"),
        }
    }

    #[test]
    fn test_load_missing_dir_is_type_load_error() {
        let err = TypeRegistry::load_dir(Path::new("/nonexistent/docshape/types")).unwrap_err();
        assert!(matches!(err, LoadError::TypeLoad { .. }));
    }
}
