//! Field-level diff: compare two trees and list changed paths.
//!
//! Objects are compared key by key and recursed into. Arrays and scalars are
//! compared whole, so a changed array element shows up as a modification of
//! the array.

use std::fmt;

use kapply_tree::{FieldPath, TreeMap, TreeNode};

/// The result of comparing two trees.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeDiff {
    /// The list of changes, in document order.
    pub changes: Vec<FieldChange>,
}

impl TreeDiff {
    /// Create an empty tree diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Number of added fields.
    pub fn additions(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, FieldChange::Added { .. }))
            .count()
    }

    /// Number of removed fields.
    pub fn removals(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, FieldChange::Removed { .. }))
            .count()
    }

    /// Number of modified fields.
    pub fn modifications(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, FieldChange::Modified { .. }))
            .count()
    }
}

/// A single change between two trees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldChange {
    /// A field present only in the new tree.
    Added { path: FieldPath, value: TreeNode },
    /// A field present only in the old tree.
    Removed { path: FieldPath, value: TreeNode },
    /// A value that differs between the trees.
    Modified {
        path: FieldPath,
        old: TreeNode,
        new: TreeNode,
    },
}

impl FieldChange {
    pub fn path(&self) -> &FieldPath {
        match self {
            FieldChange::Added { path, .. }
            | FieldChange::Removed { path, .. }
            | FieldChange::Modified { path, .. } => path,
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldChange::Added { path, value } => write!(f, "+ {path}: {value}"),
            FieldChange::Removed { path, value } => write!(f, "- {path}: {value}"),
            FieldChange::Modified { path, old, new } => write!(f, "~ {path}: {old} -> {new}"),
        }
    }
}

/// Compute the diff between two trees.
pub fn diff_trees(old: &TreeNode, new: &TreeNode) -> TreeDiff {
    let mut changes = Vec::new();
    diff_node(&FieldPath::root(), old, new, &mut changes);
    TreeDiff { changes }
}

/// Returns `true` if `current` differs from `original` anywhere.
pub fn is_diff(original: &TreeNode, current: &TreeNode) -> bool {
    original != current
}

fn diff_node(path: &FieldPath, old: &TreeNode, new: &TreeNode, changes: &mut Vec<FieldChange>) {
    match (old, new) {
        (TreeNode::Object(old_map), TreeNode::Object(new_map)) => {
            diff_maps(path, old_map, new_map, changes)
        }
        _ if old != new => changes.push(FieldChange::Modified {
            path: path.clone(),
            old: old.clone(),
            new: new.clone(),
        }),
        _ => {}
    }
}

fn diff_maps(path: &FieldPath, old: &TreeMap, new: &TreeMap, changes: &mut Vec<FieldChange>) {
    // Check for removed and modified fields.
    for (key, old_val) in old {
        match new.get(key) {
            Some(new_val) => diff_node(&path.field(key), old_val, new_val, changes),
            None => changes.push(FieldChange::Removed {
                path: path.field(key),
                value: old_val.clone(),
            }),
        }
    }

    // Check for added fields.
    for (key, new_val) in new {
        if !old.contains_key(key) {
            changes.push(FieldChange::Added {
                path: path.field(key),
                value: new_val.clone(),
            });
        }
    }
}
