//! Retrieval: the persistent index wrapper and the build/query pipeline

pub mod index;
pub mod pipeline;

pub use index::{IndexStats, ScoredChunk, VectorIndex};
pub use pipeline::{RetrievalPipeline, NO_RESULTS_SENTINEL};
