//! Provider traits and implementations for embeddings and generation

pub mod embedding;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use llm::TextGenerator;
pub use ollama::{OllamaEmbedder, OllamaGenerator};
