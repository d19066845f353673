//! # docshape-core: Foundational Types
//!
//! Defines the value types shared by every docshape crate: the generic
//! [`Document`] tree that validation walks, the structured
//! [`ValidationError`] records it produces, and the path formatting rules
//! that locate a violation inside a document.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `docshape-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Documents are produced by any serde data format; this crate never
//!   parses text itself.

pub mod document;
pub mod error;
pub mod path;

pub use document::Document;
pub use error::{ErrorKind, ErrorValue, SchemaValidationFailed, ValidationError};
pub use path::{field_path, index_path};
