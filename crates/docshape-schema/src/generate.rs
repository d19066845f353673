//! # Schema Generation
//!
//! Derives the schema model from type descriptions. The generator keeps a
//! cache from type identity ([`TypeExpr`]) to the node already built for
//! it: a type is generated once, every later reference reuses the same
//! node, and a self-referential type finds its own (still-filling) node in
//! the cache instead of recursing forever.
//!
//! Field-level constraints (`pattern`, `min_length`, `non_empty`) belong to
//! the field, not the type, so a constrained field gets its own node that
//! points at the cached element type.
//!
//! The cache is the only mutable state. It is owned through `&mut self`
//! and frozen by [`SchemaGenerator::finish`], after which the resulting
//! [`SchemaSet`] is read-only.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::describe::{FieldDescription, ObjectType, TypeExpr, TypeRegistry};
use crate::model::{
    ArraySchema, FieldSchema, ObjectSchema, Pattern, ScalarKind, ScalarSchema, Schema, SchemaId,
    SchemaNode, SchemaSet,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How fields without an explicit `required` annotation are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultRequired {
    /// Only fields annotated `required: true` are required. Fields are
    /// nullable unless annotated otherwise.
    #[default]
    ExplicitOnly,
    /// Every non-nullable field is required unless annotated
    /// `required: false`. Fields are non-nullable unless annotated
    /// `nullable: true` or explicitly optional.
    AllNonNullable,
}

/// Generator options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub default_required: DefaultRequired,
}

impl GeneratorConfig {
    pub fn new(default_required: DefaultRequired) -> Self {
        Self { default_required }
    }

    /// Resolve `(required, nullable)` for a field under this configuration.
    pub fn resolve(&self, field: &FieldDescription) -> (bool, bool) {
        match self.default_required {
            DefaultRequired::ExplicitOnly => (
                field.required.unwrap_or(false),
                field.nullable.unwrap_or(true),
            ),
            DefaultRequired::AllNonNullable => {
                let nullable = field
                    .nullable
                    .unwrap_or(field.required == Some(false));
                (field.required.unwrap_or(!nullable), nullable)
            }
        }
    }

    /// Whether array elements may be `null`. Element types carry no
    /// annotations, so this follows the mode's field default.
    pub fn nullable_elements(&self) -> bool {
        match self.default_required {
            DefaultRequired::ExplicitOnly => true,
            DefaultRequired::AllNonNullable => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A type description the generator cannot turn into a schema.
///
/// Raised only while generating; validation never produces it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedTypeError {
    /// A field carries a constraint the generator does not recognize.
    #[error("unsupported constraint '{constraint}' on {type_name}.{field}")]
    UnsupportedConstraint {
        type_name: String,
        field: String,
        constraint: String,
    },

    /// A named type is referenced but not described.
    #[error("unknown type '{name}' referenced from {referenced_from}")]
    UnknownType {
        name: String,
        referenced_from: String,
    },

    /// A pattern does not compile.
    #[error("invalid pattern '{pattern}' on {type_name}.{field}: {reason}")]
    InvalidPattern {
        type_name: String,
        field: String,
        pattern: String,
        reason: String,
    },

    /// A constraint is attached to a field whose type it cannot apply to.
    #[error("constraint '{constraint}' on {type_name}.{field} does not apply to type {ty}")]
    ConstraintMismatch {
        type_name: String,
        field: String,
        constraint: String,
        ty: String,
    },

    /// Two fields of one type share a name.
    #[error("field '{field}' is declared more than once on {type_name}")]
    DuplicateField { type_name: String, field: String },
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Builds schema nodes from a [`TypeRegistry`], one node per distinct type.
#[derive(Debug)]
pub struct SchemaGenerator<'r> {
    registry: &'r TypeRegistry,
    config: GeneratorConfig,
    nodes: Vec<SchemaNode>,
    cache: HashMap<TypeExpr, SchemaId>,
}

impl<'r> SchemaGenerator<'r> {
    pub fn new(registry: &'r TypeRegistry, config: GeneratorConfig) -> Self {
        Self {
            registry,
            config,
            nodes: Vec::new(),
            cache: HashMap::new(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate (or fetch from the cache) the schema of a named type.
    pub fn generate(&mut self, type_name: &str) -> Result<SchemaId, UnsupportedTypeError> {
        self.generate_expr(&TypeExpr::named(type_name))
    }

    /// Generate the schema of any type expression.
    ///
    /// On failure the generator is left exactly as it was before the call.
    pub fn generate_expr(&mut self, expr: &TypeExpr) -> Result<SchemaId, UnsupportedTypeError> {
        let mark = self.nodes.len();
        let result = self.type_schema(expr, "<root>");
        if result.is_err() {
            self.nodes.truncate(mark);
            self.cache.retain(|_, id| id.index() < mark);
        }
        result
    }

    /// Generate every type in the registry, for eager start-up builds.
    pub fn generate_all(&mut self) -> Result<(), UnsupportedTypeError> {
        let registry = self.registry;
        for name in registry.names() {
            self.generate(name)?;
        }
        Ok(())
    }

    /// Freeze the generated nodes into an immutable [`SchemaSet`].
    pub fn finish(self) -> SchemaSet {
        let types: BTreeMap<String, SchemaId> = self
            .cache
            .into_iter()
            .filter_map(|(expr, id)| match expr {
                TypeExpr::Named(name) => Some((name, id)),
                _ => None,
            })
            .collect();
        tracing::debug!(nodes = self.nodes.len(), types = types.len(), "schema set frozen");
        SchemaSet::new(self.nodes, types)
    }

    fn push(&mut self, node: SchemaNode) -> SchemaId {
        let id = SchemaId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Schema for an unconstrained type expression, memoized.
    fn type_schema(
        &mut self,
        expr: &TypeExpr,
        referenced_from: &str,
    ) -> Result<SchemaId, UnsupportedTypeError> {
        if let Some(&id) = self.cache.get(expr) {
            tracing::trace!(ty = %expr, id = id.index(), "schema cache hit");
            return Ok(id);
        }

        let id = match expr {
            TypeExpr::Named(name) => return self.object_schema(name, referenced_from),
            TypeExpr::Array(element) => {
                let element = self.type_schema(element, referenced_from)?;
                self.push(SchemaNode::Array(ArraySchema {
                    element,
                    min_length: None,
                    nullable_elements: self.config.nullable_elements(),
                }))
            }
            scalar => self.push(SchemaNode::Scalar(ScalarSchema::unconstrained(
                scalar_kind(scalar),
            ))),
        };
        self.cache.insert(expr.clone(), id);
        Ok(id)
    }

    /// Schema for a named object type.
    ///
    /// The node is reserved and cached before its fields are generated, so
    /// a field that refers back to this type resolves to the same node.
    fn object_schema(
        &mut self,
        name: &str,
        referenced_from: &str,
    ) -> Result<SchemaId, UnsupportedTypeError> {
        let registry = self.registry;
        let ty = registry
            .get(name)
            .ok_or_else(|| UnsupportedTypeError::UnknownType {
                name: name.to_string(),
                referenced_from: referenced_from.to_string(),
            })?;

        let id = self.push(SchemaNode::Object(ObjectSchema {
            name: Some(name.to_string()),
            fields: Vec::new(),
        }));
        self.cache.insert(TypeExpr::named(name), id);

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(ty.fields.len());
        for field in &ty.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(UnsupportedTypeError::DuplicateField {
                    type_name: ty.name.clone(),
                    field: field.name.clone(),
                });
            }
            fields.push(self.field_schema(ty, field)?);
        }

        tracing::debug!(type_name = %name, fields = fields.len(), "generated object schema");
        self.nodes[id.index()] = SchemaNode::Object(ObjectSchema {
            name: Some(name.to_string()),
            fields,
        });
        Ok(id)
    }

    fn field_schema(
        &mut self,
        owner: &ObjectType,
        field: &FieldDescription,
    ) -> Result<FieldSchema, UnsupportedTypeError> {
        if let Some(constraint) = field.annotations.keys().next() {
            return Err(UnsupportedTypeError::UnsupportedConstraint {
                type_name: owner.name.clone(),
                field: field.name.clone(),
                constraint: constraint.clone(),
            });
        }

        let mismatch = |constraint: &str| UnsupportedTypeError::ConstraintMismatch {
            type_name: owner.name.clone(),
            field: field.name.clone(),
            constraint: constraint.to_string(),
            ty: field.ty.to_string(),
        };

        let min_length = field.effective_min_length();
        if min_length.is_some() && !field.ty.is_array() {
            return Err(mismatch("min_length"));
        }
        if field.pattern.is_some() && !matches!(field.ty, TypeExpr::String | TypeExpr::Any) {
            return Err(mismatch("pattern"));
        }

        let referenced_from = format!("{}.{}", owner.name, field.name);
        let schema = match (&field.ty, &field.pattern) {
            (TypeExpr::Array(element), _) if min_length.is_some() => {
                let element = self.type_schema(element, &referenced_from)?;
                self.push(SchemaNode::Array(ArraySchema {
                    element,
                    min_length,
                    nullable_elements: self.config.nullable_elements(),
                }))
            }
            (scalar, Some(source)) => {
                let pattern =
                    Pattern::new(source).map_err(|e| UnsupportedTypeError::InvalidPattern {
                        type_name: owner.name.clone(),
                        field: field.name.clone(),
                        pattern: source.clone(),
                        reason: e.to_string(),
                    })?;
                self.push(SchemaNode::Scalar(ScalarSchema {
                    kind: scalar_kind(scalar),
                    pattern: Some(pattern),
                }))
            }
            (ty, None) => self.type_schema(ty, &referenced_from)?,
        };

        let (required, nullable) = self.config.resolve(field);
        Ok(FieldSchema {
            name: field.name.clone(),
            schema,
            required,
            nullable,
        })
    }
}

/// Scalar kind of a non-array, non-named expression.
fn scalar_kind(expr: &TypeExpr) -> ScalarKind {
    match expr {
        TypeExpr::String => ScalarKind::String,
        TypeExpr::Number => ScalarKind::Number,
        TypeExpr::Integer => ScalarKind::Integer,
        TypeExpr::Boolean => ScalarKind::Boolean,
        TypeExpr::Any | TypeExpr::Array(_) | TypeExpr::Named(_) => ScalarKind::Any,
    }
}

impl Schema {
    /// Generate the schema of `type_name` in one step.
    pub fn generate(
        registry: &TypeRegistry,
        type_name: &str,
        config: GeneratorConfig,
    ) -> Result<Self, UnsupportedTypeError> {
        let mut generator = SchemaGenerator::new(registry, config);
        let root = generator.generate(type_name)?;
        Ok(Schema::new(Arc::new(generator.finish()), root))
    }
}
