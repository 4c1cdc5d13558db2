//! Embedding provider trait for generating text embeddings

use crate::error::{Error, Result};

/// Trait for converting text into fixed-dimension vectors.
///
/// The model behind an implementation is loaded once at construction and
/// reused for every call. Output is deterministic: the same text on the same
/// instance always produces the same vector.
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for a batch of texts.
    ///
    /// The output has the same length and order as the input; `vectors[i]`
    /// belongs to `texts[i]` and callers pair them by position. If any input
    /// cannot be embedded (e.g. empty text) the whole batch fails rather than
    /// silently dropping entries, which would break that alignment.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding for a single text (the query-time case).
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embed_batch(&texts)?;
        vectors
            .pop()
            .ok_or_else(|| Error::embedding("embedding backend returned no vector"))
    }

    /// Embedding dimensions (e.g. 768 for nomic-embed-text)
    fn dimensions(&self) -> usize;

    /// Model name, recorded on the collection this provider populates
    fn model_name(&self) -> &str;
}
