//! # JSON Schema Export
//!
//! Renders a generated schema as a JSON Schema (draft 2020-12) document so
//! that other tooling can check the same documents.
//!
//! Named object types are emitted once under `$defs` and referenced with
//! `$ref`, which keeps self-referential types finite. A nullable field is
//! exported as `anyOf` with `{"type": "null"}`; patterns are exported in
//! their anchored form so JSON Schema's search semantics match the
//! validator's full-match semantics.

use std::collections::{BTreeMap, HashSet};

use serde_json::{json, Map, Value};

use crate::model::{ScalarKind, SchemaId, SchemaNode, SchemaRef};

/// `$schema` URI written at the top of every exported document.
pub const JSON_SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Export the schema rooted at `schema` as a JSON Schema document.
pub fn to_json_schema(schema: SchemaRef<'_>) -> Value {
    let mut exporter = Exporter {
        root: schema,
        defs: BTreeMap::new(),
        queued: HashSet::new(),
        pending: Vec::new(),
    };

    let mut document = match exporter.node(schema.id()) {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("allOf".into(), json!([other]));
            map
        }
    };

    while let Some((name, id)) = exporter.pending.pop() {
        let body = exporter.object_body(id);
        exporter.defs.insert(name, body);
    }

    document.insert("$schema".into(), Value::String(JSON_SCHEMA_DIALECT.into()));
    if !exporter.defs.is_empty() {
        let defs: Map<String, Value> = exporter.defs.into_iter().collect();
        document.insert("$defs".into(), Value::Object(defs));
    }
    Value::Object(document)
}

struct Exporter<'a> {
    root: SchemaRef<'a>,
    defs: BTreeMap<String, Value>,
    queued: HashSet<String>,
    pending: Vec<(String, SchemaId)>,
}

impl Exporter<'_> {
    fn node(&mut self, id: SchemaId) -> Value {
        match self.root.resolve(id).node() {
            SchemaNode::Object(object) => match &object.name {
                Some(name) => {
                    if self.queued.insert(name.clone()) {
                        self.pending.push((name.clone(), id));
                    }
                    json!({ "$ref": format!("#/$defs/{name}") })
                }
                None => self.object_body(id),
            },
            SchemaNode::Array(array) => {
                let mut out = Map::new();
                out.insert("type".into(), json!("array"));
                let items = self.node(array.element);
                out.insert("items".into(), or_null(items, array.nullable_elements));
                if let Some(min) = array.min_length {
                    out.insert("minItems".into(), json!(min));
                }
                Value::Object(out)
            }
            SchemaNode::Scalar(scalar) => {
                let mut out = Map::new();
                match (&scalar.pattern, scalar.kind) {
                    // A pattern only holds for strings.
                    (Some(pattern), _) => {
                        out.insert("type".into(), json!("string"));
                        out.insert("pattern".into(), json!(pattern.anchored()));
                    }
                    (None, ScalarKind::Any) => {}
                    (None, kind) => {
                        out.insert("type".into(), json!(kind.as_str()));
                    }
                }
                Value::Object(out)
            }
        }
    }

    fn object_body(&mut self, id: SchemaId) -> Value {
        let SchemaNode::Object(object) = self.root.resolve(id).node() else {
            return self.node(id);
        };

        let mut properties = Map::new();
        for field in &object.fields {
            let schema = self.node(field.schema);
            let schema = or_null(schema, field.nullable);
            properties.insert(field.name.clone(), schema);
        }
        let required: Vec<&str> = object.required_fields().collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

fn or_null(schema: Value, nullable: bool) -> Value {
    if nullable {
        json!({ "anyOf": [schema, { "type": "null" }] })
    } else {
        schema
    }
}
