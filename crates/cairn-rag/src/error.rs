//! Error types for the RAG pipeline

use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG pipeline errors.
///
/// Every variant is fatal to the current build or query call: nothing is
/// retried internally and a failed insert leaves the index unchanged. The
/// long-lived embedder and store handles stay usable after a failed call.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed chunker input or invalid chunking parameters
    #[error("chunking error: {0}")]
    Chunking(String),

    /// Embedding model failure or invalid input (e.g. empty text)
    #[error("embedding generation failed: {0}")]
    Embedding(String),

    /// Chunk/vector counts disagree on insert; no partial insert is performed
    #[error("dimension mismatch: {chunks} chunks but {vectors} vectors")]
    DimensionMismatch { chunks: usize, vectors: usize },

    /// Persistent index unreachable, corrupted, or rejecting the operation
    #[error("vector index error: {0}")]
    Index(#[from] cairn_core::StoreError),

    /// Generation collaborator failure
    #[error("LLM error: {0}")]
    Llm(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a chunking error
    pub fn chunking(message: impl Into<String>) -> Self {
        Self::Chunking(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }
}
