//! # docshape-schema: Schema Derivation & Document Validation
//!
//! Derives a schema from a declarative type description and validates
//! generic documents against it, reporting every structural violation in
//! one pass.
//!
//! ## Pipeline
//!
//! 1. [`describe`]: type descriptions ([`TypeRegistry`], [`ObjectType`],
//!    [`FieldDescription`]) built in code or loaded from YAML/JSON files.
//! 2. [`generate`]: [`SchemaGenerator`] turns descriptions into the
//!    [`model`] arena, memoizing one schema node per distinct type so that
//!    self-referential types terminate.
//! 3. [`validate()`]: walks a [`Document`](docshape_core::Document) against a
//!    [`SchemaRef`], returning the complete, ordered error list.
//!    [`validate_or_fail`] is the fail-fast wrapper.
//! 4. [`export`]: renders a generated schema as a JSON Schema document.
//!
//! ## Crate Policy
//!
//! - Depends only on `docshape-core` internally.
//! - Schema construction problems surface at generation time as
//!   [`UnsupportedTypeError`]; validation itself never fails.
//! - A generated [`SchemaSet`] is immutable and `Send + Sync`; it can be
//!   shared across threads without locking.

pub mod describe;
pub mod export;
pub mod generate;
pub mod loader;
pub mod model;
pub mod validate;

pub use describe::{FieldDescription, ObjectType, TypeExpr, TypeExprError, TypeRegistry};
pub use export::{to_json_schema, JSON_SCHEMA_DIALECT};
pub use generate::{DefaultRequired, GeneratorConfig, SchemaGenerator, UnsupportedTypeError};
pub use loader::{load_document, parse_document, DocumentFormat, LoadError};
pub use model::{
    ArraySchema, FieldSchema, ObjectSchema, Pattern, ScalarKind, ScalarSchema, Schema, SchemaId,
    SchemaNode, SchemaRef, SchemaSet,
};
pub use validate::{validate, validate_or_fail};
