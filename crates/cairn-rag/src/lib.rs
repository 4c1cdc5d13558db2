//! cairn-rag: minimal retrieval-augmented generation pipeline
//!
//! Documents are split into overlapping chunks, embedded into vectors, and
//! stored in a persistent collection (`cairn-core`). At query time the most
//! relevant chunks are retrieved and assembled into a context string that
//! grounds an external text-completion call.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::{OllamaClient, PromptBuilder};
pub use ingestion::TextChunker;
pub use providers::{EmbeddingProvider, OllamaEmbedder, OllamaGenerator, TextGenerator};
pub use retrieval::{
    IndexStats, RetrievalPipeline, ScoredChunk, VectorIndex, NO_RESULTS_SENTINEL,
};
pub use types::{Chunk, Document};

/// Re-export cairn-core for convenience
pub use cairn_core;
