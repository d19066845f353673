//! # Document Validation
//!
//! Walks a [`Document`] against a schema and collects every structural
//! violation in a single traversal. Validation never stops at the first
//! failure and never fails itself: the result is the ordered error list,
//! empty when the document conforms.
//!
//! ## Error order
//!
//! Errors are emitted post-order per object. The fields of an object are
//! visited in schema declaration order and their errors appended first;
//! the object's own aggregated `Required` error (one per object, listing
//! every missing field in declaration order) comes after them. Deeper
//! errors therefore precede shallower ones.
//!
//! ## Short-circuits
//!
//! A `TypeMismatch` ends descent into that subtree. A present `null` for a
//! nullable field is treated as absent.

use docshape_core::{field_path, index_path, Document, SchemaValidationFailed, ValidationError};

use crate::model::{ArraySchema, ObjectSchema, ScalarSchema, SchemaNode, SchemaRef};

/// Validate `document` against `schema`, returning every violation in
/// traversal order.
pub fn validate(document: &Document, schema: SchemaRef<'_>) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_node(document, schema, "", &mut errors);
    tracing::trace!(errors = errors.len(), "validation run complete");
    errors
}

/// Fail-fast wrapper: `Err` carrying the complete list when any violation
/// is found.
pub fn validate_or_fail(
    document: &Document,
    schema: SchemaRef<'_>,
) -> Result<(), SchemaValidationFailed> {
    match SchemaValidationFailed::from_errors(validate(document, schema)) {
        None => Ok(()),
        Some(failed) => {
            tracing::debug!(errors = failed.errors().len(), "document rejected");
            Err(failed)
        }
    }
}

fn validate_node(
    doc: &Document,
    schema: SchemaRef<'_>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    match schema.node() {
        SchemaNode::Object(object) => validate_object(doc, schema, object, path, errors),
        SchemaNode::Array(array) => validate_array(doc, schema, array, path, errors),
        SchemaNode::Scalar(scalar) => validate_scalar(doc, scalar, path, errors),
    }
}

fn validate_object(
    doc: &Document,
    schema: SchemaRef<'_>,
    object: &ObjectSchema,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    let Some(map) = doc.as_object() else {
        errors.push(ValidationError::type_mismatch(path, doc));
        return;
    };

    let mut missing = Vec::new();
    for field in &object.fields {
        match map.get(&field.name) {
            None => {
                if field.required {
                    missing.push(field.name.clone());
                }
            }
            Some(Document::Null) if field.nullable => {}
            Some(value @ Document::Null) => {
                errors.push(ValidationError::type_mismatch(field_path(path, &field.name), value));
            }
            Some(value) => {
                let child = schema.resolve(field.schema);
                validate_node(value, child, &field_path(path, &field.name), errors);
            }
        }
    }

    // Own-level error last: children report before their parent.
    if !missing.is_empty() {
        errors.push(ValidationError::required(path, missing));
    }
}

fn validate_array(
    doc: &Document,
    schema: SchemaRef<'_>,
    array: &ArraySchema,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    let Some(items) = doc.as_array() else {
        errors.push(ValidationError::type_mismatch(path, doc));
        return;
    };

    if let Some(min) = array.min_length {
        if items.len() < min {
            errors.push(ValidationError::min_length(path, items.len()));
        }
    }

    let element = schema.resolve(array.element);
    for (index, item) in items.iter().enumerate() {
        if item.is_null() && array.nullable_elements {
            continue;
        }
        validate_node(item, element, &index_path(path, index), errors);
    }
}

fn validate_scalar(
    doc: &Document,
    scalar: &ScalarSchema,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(pattern) = &scalar.pattern {
        if !doc.as_str().is_some_and(|s| pattern.is_match(s)) {
            errors.push(ValidationError::pattern(path, doc));
            return;
        }
    }
    if !scalar.kind.accepts(doc) {
        errors.push(ValidationError::type_mismatch(path, doc));
    }
}
