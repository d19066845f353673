//! # Error Types: Structured Validation Errors
//!
//! Validation never fails for a non-conforming document. Every violation is
//! data: a [`ValidationError`] carrying the document path, the violation
//! kind, and the offending raw value (or, for missing required fields, the
//! list of missing names).
//!
//! [`SchemaValidationFailed`] is the single aggregate error used by the
//! fail-fast wrapper; it carries the complete list, never just the first
//! violation.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::document::Document;

/// Category of a structural violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// One or more required object fields are absent at a nesting level.
    Required,
    /// A scalar fails its declared pattern.
    Pattern,
    /// An array is shorter than its declared minimum.
    MinLength,
    /// The node's structural kind disagrees with the schema's.
    TypeMismatch,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Required => "required",
            ErrorKind::Pattern => "pattern",
            ErrorKind::MinLength => "min_length",
            ErrorKind::TypeMismatch => "type_mismatch",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a [`ValidationError`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorValue {
    /// The offending raw value. For `MinLength` this is the actual element
    /// count as a number.
    Value(Document),
    /// Missing field names in schema declaration order (`Required` only).
    Fields(Vec<String>),
}

/// A single structural violation found during validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Location of the violation: `""` for the root, `.name` per object
    /// field (no leading dot), `[i]` per array element.
    pub path: String,
    /// Violation category.
    pub kind: ErrorKind,
    /// Offending value or missing field names.
    pub value: ErrorValue,
}

impl ValidationError {
    /// Aggregated missing-required-fields error for one object.
    pub fn required(path: impl Into<String>, missing: Vec<String>) -> Self {
        Self {
            path: path.into(),
            kind: ErrorKind::Required,
            value: ErrorValue::Fields(missing),
        }
    }

    pub fn pattern(path: impl Into<String>, value: &Document) -> Self {
        Self {
            path: path.into(),
            kind: ErrorKind::Pattern,
            value: ErrorValue::Value(value.clone()),
        }
    }

    /// Array shorter than its minimum; records the actual count.
    pub fn min_length(path: impl Into<String>, actual: usize) -> Self {
        Self {
            path: path.into(),
            kind: ErrorKind::MinLength,
            value: ErrorValue::Value(Document::from(actual)),
        }
    }

    pub fn type_mismatch(path: impl Into<String>, value: &Document) -> Self {
        Self {
            path: path.into(),
            kind: ErrorKind::TypeMismatch,
            value: ErrorValue::Value(value.clone()),
        }
    }

    /// Missing field names, if this is a `Required` error.
    pub fn missing_fields(&self) -> Option<&[String]> {
        match &self.value {
            ErrorValue::Fields(names) => Some(names),
            ErrorValue::Value(_) => None,
        }
    }

    /// Human-readable description, without the path.
    pub fn message(&self) -> String {
        match (&self.kind, &self.value) {
            (ErrorKind::Required, ErrorValue::Fields(names)) => {
                format!("required properties are missing: {}", names.join(", "))
            }
            (ErrorKind::Pattern, ErrorValue::Value(v)) => {
                format!("value {v} does not match the declared pattern")
            }
            (ErrorKind::MinLength, ErrorValue::Value(v)) => {
                format!("array item count {v} is less than the declared minimum")
            }
            (ErrorKind::TypeMismatch, ErrorValue::Value(v)) => {
                format!("unexpected {} value {v}", v.kind_name())
            }
            (kind, ErrorValue::Fields(names)) => format!("{kind}: {}", names.join(", ")),
            (kind, ErrorValue::Value(v)) => format!("{kind}: {v}"),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message())
        } else {
            write!(f, "{}: {}", self.path, self.message())
        }
    }
}

/// Aggregate failure raised by the fail-fast validation wrapper.
///
/// Always carries at least one error, in traversal order.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("document failed schema validation with {} error(s)", .errors.len())]
pub struct SchemaValidationFailed {
    errors: Vec<ValidationError>,
}

impl SchemaValidationFailed {
    /// Wrap a non-empty error list. Returns `None` for an empty list, since
    /// an empty list means the document conforms.
    pub fn from_errors(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// One line per violation, in traversal order.
    pub fn report(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("  {e}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
