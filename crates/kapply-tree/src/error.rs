use thiserror::Error;

use crate::node::Kind;

/// Errors produced by tree operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A path lookup walked into a node that is not an object.
    #[error("accessor error at {path}: found {actual}, expected object")]
    NotAnObject { path: String, actual: Kind },

    /// A leaf was expected to be a string.
    #[error("accessor error at {path}: found {actual}, expected string")]
    NotAString { path: String, actual: Kind },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for tree results.
pub type TreeResult<T> = Result<T, TreeError>;
