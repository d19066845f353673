//! # Schema Model
//!
//! In-memory validation rules. Schema nodes live in an arena
//! ([`SchemaSet`]) and refer to each other by [`SchemaId`], so resolving a
//! child schema is an index lookup and self-referential types close their
//! cycle without reference-counting loops.
//!
//! The model is pure data: nothing here validates documents.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use docshape_core::Document;
use regex::Regex;

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// Index of a node inside its [`SchemaSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(usize);

impl SchemaId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// One validation rule: object, array, or scalar shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Object(ObjectSchema),
    Array(ArraySchema),
    Scalar(ScalarSchema),
}

impl SchemaNode {
    /// Structural kind the node expects, as used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaNode::Object(_) => "object",
            SchemaNode::Array(_) => "array",
            SchemaNode::Scalar(s) => s.kind.as_str(),
        }
    }
}

/// Object shape: declared fields in source declaration order.
///
/// Field names are unique. Declaration order drives the order of child
/// errors and of the names inside an aggregated `Required` error.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    /// Type the object was generated from, if any.
    pub name: Option<String>,
    pub fields: Vec<FieldSchema>,
}

impl ObjectSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of required fields, in declaration order.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
    }
}

/// A declared object field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub schema: SchemaId,
    /// The key must be present. Presence is key existence; a `null` value
    /// still counts as present.
    pub required: bool,
    /// A present `null` is treated as absent. When false, `null` is a type
    /// mismatch.
    pub nullable: bool,
}

/// Array shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub element: SchemaId,
    pub min_length: Option<usize>,
    /// A `null` element is accepted and not validated further.
    pub nullable_elements: bool,
}

/// Scalar shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarSchema {
    pub kind: ScalarKind,
    pub pattern: Option<Pattern>,
}

impl ScalarSchema {
    pub fn unconstrained(kind: ScalarKind) -> Self {
        Self {
            kind,
            pattern: None,
        }
    }
}

/// Expected kind of a scalar node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Accepts any node.
    Any,
    String,
    /// Any number, integral or not.
    Number,
    /// Numbers representable as `i64`/`u64`.
    Integer,
    Boolean,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Any => "any",
            ScalarKind::String => "string",
            ScalarKind::Number => "number",
            ScalarKind::Integer => "integer",
            ScalarKind::Boolean => "boolean",
        }
    }

    pub fn accepts(&self, doc: &Document) -> bool {
        match self {
            ScalarKind::Any => true,
            ScalarKind::String => matches!(doc, Document::String(_)),
            ScalarKind::Number => matches!(doc, Document::Number(_)),
            ScalarKind::Integer => doc.is_integer(),
            ScalarKind::Boolean => matches!(doc, Document::Bool(_)),
        }
    }
}

/// A compiled string pattern with full-match semantics.
///
/// The source is wrapped as `^(?:source)$`, so `[a-z]+` rejects `"ab1"`.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as declared.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The anchored expression actually matched.
    pub fn anchored(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

// ---------------------------------------------------------------------------
// SchemaSet and handles
// ---------------------------------------------------------------------------

/// Frozen arena of schema nodes produced by one generator.
///
/// Every [`SchemaId`] stored inside a node was minted by the generator for
/// this arena and is in bounds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaSet {
    nodes: Vec<SchemaNode>,
    types: BTreeMap<String, SchemaId>,
}

impl SchemaSet {
    pub(crate) fn new(nodes: Vec<SchemaNode>, types: BTreeMap<String, SchemaId>) -> Self {
        Self { nodes, types }
    }

    /// Number of distinct schema nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: SchemaId) -> Option<&SchemaNode> {
        self.nodes.get(id.index())
    }

    /// Handle to the node `id`, if it belongs to this set.
    pub fn schema(&self, id: SchemaId) -> Option<SchemaRef<'_>> {
        self.node(id).map(|_| SchemaRef { set: self, id })
    }

    /// Handle to the schema generated for the named type.
    pub fn type_schema(&self, name: &str) -> Option<SchemaRef<'_>> {
        self.types
            .get(name)
            .map(|&id| SchemaRef { set: self, id })
    }

    /// Generated type names, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.types.keys().map(String::as_str)
    }
}

/// Borrowed handle to one node of a [`SchemaSet`]. Resolution is O(1).
#[derive(Clone, Copy)]
pub struct SchemaRef<'a> {
    set: &'a SchemaSet,
    id: SchemaId,
}

impl<'a> SchemaRef<'a> {
    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn set(&self) -> &'a SchemaSet {
        self.set
    }

    pub fn node(&self) -> &'a SchemaNode {
        &self.set.nodes[self.id.index()]
    }

    /// Handle to a child referenced by this node.
    pub fn resolve(&self, child: SchemaId) -> SchemaRef<'a> {
        SchemaRef {
            set: self.set,
            id: child,
        }
    }
}

impl fmt::Debug for SchemaRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRef")
            .field("id", &self.id)
            .field("node", self.node())
            .finish()
    }
}

/// Owned root schema: a shared [`SchemaSet`] plus the root node.
///
/// Cloning is cheap; clones share the same immutable arena.
#[derive(Debug, Clone)]
pub struct Schema {
    set: Arc<SchemaSet>,
    root: SchemaId,
}

impl Schema {
    pub(crate) fn new(set: Arc<SchemaSet>, root: SchemaId) -> Self {
        Self { set, root }
    }

    /// Root a shared set at `root`, if `root` belongs to it.
    pub fn from_set(set: Arc<SchemaSet>, root: SchemaId) -> Option<Self> {
        set.node(root)?;
        Some(Self { set, root })
    }

    pub fn schema_ref(&self) -> SchemaRef<'_> {
        SchemaRef {
            set: &self.set,
            id: self.root,
        }
    }

    pub fn root(&self) -> SchemaId {
        self.root
    }

    pub fn set(&self) -> &Arc<SchemaSet> {
        &self.set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_source_set() -> SchemaSet {
        let string = SchemaNode::Scalar(ScalarSchema::unconstrained(ScalarKind::String));
        let object = SchemaNode::Object(ObjectSchema {
            name: Some("MailSource".into()),
            fields: vec![
                FieldSchema {
                    name: "email".into(),
                    schema: SchemaId::new(0),
                    required: true,
                    nullable: true,
                },
                FieldSchema {
                    name: "name".into(),
                    schema: SchemaId::new(0),
                    required: false,
                    nullable: true,
                },
            ],
        });
        let mut types = BTreeMap::new();
        types.insert("MailSource".to_string(), SchemaId::new(1));
        SchemaSet::new(vec![string, object], types)
    }

    #[test]
    fn test_pattern_is_full_match() {
        let p = Pattern::new("[a-z]+").unwrap();
        assert!(p.is_match("abc"));
        assert!(!p.is_match("ab1"));
        assert!(!p.is_match("1abc"));
        assert_eq!(p.source(), "[a-z]+");
        assert_eq!(p.anchored(), "^(?:[a-z]+)$");
    }

    #[test]
    fn test_pattern_alternation_stays_anchored() {
        let p = Pattern::new("a|b").unwrap();
        assert!(p.is_match("a"));
        assert!(!p.is_match("ab"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(Pattern::new("(unclosed").is_err());
    }

    #[test]
    fn test_required_fields_in_declaration_order() {
        let set = mail_source_set();
        let schema = set.type_schema("MailSource").unwrap();
        let SchemaNode::Object(object) = schema.node() else {
            panic!("expected object schema");
        };
        assert_eq!(object.required_fields().collect::<Vec<_>>(), vec!["email"]);
        assert!(object.field("name").is_some());
        assert!(object.field("missing").is_none());
    }

    #[test]
    fn test_schema_ref_resolution() {
        let set = mail_source_set();
        let root = set.type_schema("MailSource").unwrap();
        let SchemaNode::Object(object) = root.node() else {
            panic!("expected object schema");
        };
        let email = root.resolve(object.fields[0].schema);
        assert_eq!(email.node().kind_name(), "string");
        assert!(set.schema(SchemaId::new(7)).is_none());
    }

    #[test]
    fn test_schema_from_set_checks_bounds() {
        let set = Arc::new(mail_source_set());
        assert!(Schema::from_set(set.clone(), SchemaId::new(1)).is_some());
        assert!(Schema::from_set(set, SchemaId::new(2)).is_none());
    }

    #[test]
    fn test_scalar_kind_acceptance() {
        assert!(ScalarKind::Any.accepts(&Document::Null));
        assert!(ScalarKind::String.accepts(&Document::from("x")));
        assert!(!ScalarKind::String.accepts(&Document::Null));
        assert!(ScalarKind::Integer.accepts(&Document::from(3usize)));
        let float: Document = serde_json::from_str("2.5").unwrap();
        assert!(ScalarKind::Number.accepts(&float));
        assert!(!ScalarKind::Integer.accepts(&float));
        assert!(ScalarKind::Boolean.accepts(&Document::Bool(false)));
    }

    #[test]
    fn test_schema_set_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SchemaSet>();
        assert_send_sync::<Schema>();
    }
}
