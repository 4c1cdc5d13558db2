//! Error types for the vector store

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Vector store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error while touching persisted state
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted state could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisted state is present but unreadable
    #[error("collection '{name}' is corrupted: {message}")]
    Corrupted { name: String, message: String },

    /// Vector dimensions disagree with what the collection was built with
    #[error("dimension mismatch: collection expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Collection was populated with a different embedding model
    #[error("embedding model mismatch: collection was built with '{expected}', got '{actual}'")]
    ModelMismatch { expected: String, actual: String },

    /// Collection was created with a different distance metric
    #[error("distance metric mismatch: collection uses {expected:?}, got {actual:?}")]
    MetricMismatch {
        expected: crate::types::DistanceMetric,
        actual: crate::types::DistanceMetric,
    },

    /// Record id already exists in the collection
    #[error("duplicate record id: {0}")]
    DuplicateId(String),

    /// Invalid input to a store operation
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl StoreError {
    /// Create a corruption error
    pub fn corrupted(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Corrupted {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
