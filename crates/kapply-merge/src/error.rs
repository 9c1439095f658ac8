//! Error types for the merge crate.

use std::fmt;

use kapply_tree::{FieldPath, Kind};

/// Which of the two reference inputs carried the conflicting node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputRole {
    LastApplied,
    Desired,
}

impl fmt::Display for InputRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputRole::LastApplied => f.write_str("last-applied"),
            InputRole::Desired => f.write_str("desired"),
        }
    }
}

/// Errors that can occur during a merge.
///
/// Any error is fatal for the merge call: no partially merged tree is
/// returned.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MergeError {
    /// `last_applied` or `desired` is neither null nor the same kind as the
    /// observed object or array at `path`.
    #[error("failed to merge: invalid {role} value at {path}: expected {expected} or null, got {actual}")]
    TypeMismatch {
        path: FieldPath,
        role: InputRole,
        expected: Kind,
        actual: Kind,
    },
}

impl MergeError {
    /// The position the merge failed at.
    pub fn path(&self) -> &FieldPath {
        match self {
            MergeError::TypeMismatch { path, .. } => path,
        }
    }
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
