//! # Document Paths
//!
//! A path locates a node inside a document. The root is the empty string;
//! object field access appends `.name` (with no separator at the root) and
//! array element access appends `[index]`, zero-based. Validating `email`
//! inside the first element of `cc` therefore reports `cc[0].email`.

/// Path of field `name` inside the object at `parent`.
pub fn field_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

/// Path of element `index` inside the array at `parent`.
pub fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_field_has_no_leading_dot() {
        assert_eq!(field_path("", "to"), "to");
    }

    #[test]
    fn test_nested_field_and_index() {
        let cc = field_path("", "cc");
        let first = index_path(&cc, 0);
        assert_eq!(field_path(&first, "email"), "cc[0].email");
    }

    #[test]
    fn test_root_array_element() {
        assert_eq!(index_path("", 3), "[3]");
    }
}
