use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("failed to merge desired changes: {0}")]
    Merge(#[from] kapply_merge::MergeError),

    /// The stored baseline could not be decoded. Callers may recover by
    /// treating the baseline as empty.
    #[error("malformed last-applied state: {0}")]
    Baseline(String),

    #[error("failed to encode last-applied state: {0}")]
    Encode(String),

    #[error("invalid object: {0}")]
    InvalidObject(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
