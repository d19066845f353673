//! # Document Model
//!
//! The generic, schema-free value tree that the validator walks. A
//! [`Document`] is produced by deserializing with any serde data format
//! (`serde_json`, `serde_yaml`, ...) or by converting a
//! [`serde_json::Value`]. Nodes carry no schema information; validation
//! treats the tree as read-only.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A parsed semi-structured document.
///
/// Object keys are unique. Array order is significant. Leaves are strings,
/// numbers, booleans or null.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Document {
    /// Explicit null.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Numeric scalar, integer or floating point.
    Number(Number),
    /// Text scalar.
    String(String),
    /// Ordered sequence of documents.
    Array(Vec<Document>),
    /// Mapping from string key to document.
    Object(BTreeMap<String, Document>),
}

impl Document {
    /// Name of the node's structural kind, as used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "boolean",
            Document::Number(_) => "number",
            Document::String(_) => "string",
            Document::Array(_) => "array",
            Document::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    /// True for numbers representable as `i64` or `u64`.
    pub fn is_integer(&self) -> bool {
        match self {
            Document::Number(n) => n.is_i64() || n.is_u64(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Document]> {
        match self {
            Document::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Document>> {
        match self {
            Document::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this node is an object.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_object().and_then(|map| map.get(key))
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(b),
            Value::Number(n) => Document::Number(n),
            Value::String(s) => Document::String(s),
            Value::Array(items) => Document::Array(items.into_iter().map(Document::from).collect()),
            Value::Object(map) => Document::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Document::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        match doc {
            Document::Null => Value::Null,
            Document::Bool(b) => Value::Bool(b),
            Document::Number(n) => Value::Number(n),
            Document::String(s) => Value::String(s),
            Document::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Document::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Document {
    fn from(s: &str) -> Self {
        Document::String(s.to_string())
    }
}

impl From<String> for Document {
    fn from(s: String) -> Self {
        Document::String(s)
    }
}

impl From<usize> for Document {
    fn from(n: usize) -> Self {
        Document::Number(Number::from(n as u64))
    }
}

/// Compact JSON rendering, used when a raw value appears in a message.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

/// Format errors, such as a non-string key, keep the parser's position.
impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DocumentVisitor)
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a null, boolean, number, string, sequence or string-keyed mapping")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Document, E> {
        Ok(Document::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Document, E> {
        Ok(Document::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Document, D::Error>
    where
        D: Deserializer<'de>,
    {
        Document::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Document, E> {
        Ok(Document::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Document, E> {
        Ok(Document::Number(Number::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Document, E> {
        Ok(Document::Number(Number::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Document, E> {
        Number::from_f64(v)
            .map(Document::Number)
            .ok_or_else(|| E::custom(format!("non-finite number {v} is not supported")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Document, E> {
        Ok(Document::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Document, E> {
        Ok(Document::String(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Document, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Document::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Document, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, Document>()? {
            entries.insert(key, value);
        }
        Ok(Document::Object(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_value_preserves_structure() {
        let doc = Document::from(json!({
            "to": {"email": "rd@dummy.example", "name": null},
            "from": [{"email": "a@b.example"}],
            "count": 2,
            "flag": true
        }));

        assert_eq!(doc.get("count"), Some(&Document::from(2usize)));
        assert_eq!(doc.get("flag"), Some(&Document::Bool(true)));
        let to = doc.get("to").unwrap();
        assert_eq!(to.get("email").and_then(Document::as_str), Some("rd@dummy.example"));
        assert!(to.get("name").unwrap().is_null());
        assert_eq!(doc.get("from").and_then(Document::as_array).map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_deserialize_from_json_text() {
        let doc: Document = serde_json::from_str(r#"{"a": [1, 2.5, "x", null, false]}"#).unwrap();
        let items = doc.get("a").and_then(Document::as_array).unwrap();
        assert!(items[0].is_integer());
        assert!(!items[1].is_integer());
        assert_eq!(items[1].kind_name(), "number");
        assert_eq!(items[2].as_str(), Some("x"));
        assert!(items[3].is_null());
        assert_eq!(items[4], Document::Bool(false));
    }

    #[test]
    fn test_deserialize_from_yaml_text() {
        let yaml = r#"
to:
  email: rd@dummy.example
from:
  - email: fukasawah@dummy.example
    name: fukasawah
empty: ~
"#;
        let doc: Document = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(doc.kind_name(), "object");
        assert!(doc.get("empty").unwrap().is_null());
        let from = doc.get("from").and_then(Document::as_array).unwrap();
        assert_eq!(from[0].get("name").and_then(Document::as_str), Some("fukasawah"));
    }

    #[test]
    fn test_yaml_sequence_key_reports_location() {
        let err = serde_yaml::from_str::<Document>("to:\n  email: a@b.c\n[a, b]: x\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("expected a string"), "got: {message}");
        assert!(message.contains("line"), "got: {message}");
        assert!(!message.contains("untagged"), "got: {message}");
    }

    #[test]
    fn test_yaml_non_finite_number_is_rejected() {
        let err = serde_yaml::from_str::<Document>("ratio: .nan\n").unwrap_err();
        assert!(err.to_string().contains("non-finite"), "got: {err}");
    }

    #[test]
    fn test_json_error_keeps_position() {
        let err = serde_json::from_str::<Document>("{\"a\": [1, }").unwrap_err();
        assert_eq!(err.line(), 1);
        assert!(err.column() > 0);
    }

    #[test]
    fn test_json_value_conversion_is_lossless() {
        let value = json!({"a": [1, {"b": "c"}], "d": null});
        let back = Value::from(Document::from(value.clone()));
        assert_eq!(back, value);
    }

    #[test]
    fn test_display_is_compact_json() {
        assert_eq!(Document::from("foo@bar@baz").to_string(), r#""foo@bar@baz""#);
        assert_eq!(Document::Null.to_string(), "null");
        assert_eq!(Document::Array(vec![]).to_string(), "[]");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Document::Null.kind_name(), "null");
        assert_eq!(Document::Bool(true).kind_name(), "boolean");
        assert_eq!(Document::from("s").kind_name(), "string");
        assert_eq!(Document::Array(vec![]).kind_name(), "array");
        assert_eq!(Document::Object(BTreeMap::new()).kind_name(), "object");
    }
}
