use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Caller-fixable input problems: shape mismatches, empty or ragged
    /// embeddings, bad chunking parameters, blank messages.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Persisted state that fails its own cross-checks.
    #[error("Inconsistent index: {0}")]
    Consistency(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The embedding provider or page extractor cannot be used.
    #[error("Capability unavailable: {0}")]
    Capability(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
