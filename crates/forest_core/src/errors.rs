//! Error types for the forest engine

use thiserror::Error;

/// Errors that can occur while building, testing or (de)serializing forests
#[derive(Error, Debug)]
pub enum ForestError {
    /// Training parameters are missing or out of range
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Dataset is too small for the requested forest
    #[error("Insufficient data: {available} data points for {required} trees")]
    InsufficientData { required: usize, available: usize },

    /// Two statistics (or payloads) of different shape were merged
    #[error("Incompatible statistics: {0}")]
    IncompatibleStatistics(String),

    /// A builder invariant was violated
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),

    /// Index outside of a dataset or dataset index
    #[error("Index {index} out of range for size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    /// Traversal hit a node that cannot route a point
    #[error("Invalid tree: {0}")]
    InvalidTree(String),

    /// Malformed tree or forest stream
    #[error("Invalid model format: {0}")]
    InvalidFormat(String),

    /// A statistics implementation rejected its input
    #[error("Statistics error: {0}")]
    Statistics(String),

    /// Worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForestError {
    /// Classify an error raised while decoding a model stream: malformed
    /// content becomes [`ForestError::InvalidFormat`], anything else stays I/O.
    pub fn from_stream(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::InvalidData => Self::InvalidFormat(err.to_string()),
            _ => Self::Io(err),
        }
    }
}

/// Result type for forest operations
pub type Result<T> = std::result::Result<T, ForestError>;
