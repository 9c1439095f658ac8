//! Targeted change detection on string fields.

use std::iter;

use kapply_tree::TreeNode;

use crate::error::{DiffError, DiffResult};

/// Returns `true` if the string at any of the dotted paths differs between
/// `src` and `dest`.
///
/// A missing field compares as the empty string. A field that holds anything
/// other than a string, or a path that walks through a non-object, is an
/// error.
pub fn is_change_str(
    src: &TreeNode,
    dest: &TreeNode,
    path: &str,
    others: &[&str],
) -> DiffResult<bool> {
    for dotted in iter::once(path).chain(others.iter().copied()) {
        let fields = split_path(dotted)?;
        let before = src.nested_str(&fields)?.unwrap_or_default();
        let after = dest.nested_str(&fields)?.unwrap_or_default();
        if before != after {
            return Ok(true);
        }
    }
    Ok(false)
}

fn split_path(dotted: &str) -> DiffResult<Vec<&str>> {
    let fields: Vec<&str> = dotted.split('.').collect();
    if fields.iter().any(|f| f.is_empty()) {
        return Err(DiffError::InvalidPath(dotted.to_string()));
    }
    Ok(fields)
}
