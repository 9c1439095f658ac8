//! Error types for the diff crate.

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DiffError {
    /// A dotted path was empty or contained an empty segment.
    #[error("invalid field path: {0:?}")]
    InvalidPath(String),

    /// Looking up a path failed.
    #[error("lookup failed: {0}")]
    Lookup(#[from] kapply_tree::TreeError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
