//! Build-time indexing and query-time context assembly

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::PromptBuilder;
use crate::ingestion::TextChunker;
use crate::providers::{EmbeddingProvider, TextGenerator};
use crate::retrieval::index::VectorIndex;
use crate::types::Document;

/// Sentinel returned by `retrieve` when no usable context was found.
///
/// Callers must treat this as "do not proceed to generation", not as valid
/// context.
pub const NO_RESULTS_SENTINEL: &str = "No relevant documents found.";

/// Orchestrates chunker, embedder and index.
///
/// Holds its collaborators as long-lived resources: the embedding model and
/// the store handle are constructed once at startup and reused for every
/// call, never recreated per request.
pub struct RetrievalPipeline {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    index: VectorIndex,
}

impl RetrievalPipeline {
    /// Assemble a pipeline from already-constructed collaborators
    pub fn new(
        chunker: TextChunker,
        embedder: Arc<dyn EmbeddingProvider>,
        index: VectorIndex,
    ) -> Self {
        Self {
            chunker,
            embedder,
            index,
        }
    }

    /// Build a pipeline from config, opening the index under the embedder's
    /// model name so the collection stays bound to one model.
    pub fn from_config(config: &RagConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let chunker = TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?;
        let index = VectorIndex::open(&config.index, embedder.model_name())?;
        Ok(Self::new(chunker, embedder, index))
    }

    /// The underlying index (for stats and clearing)
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Chunk, embed and persist a document batch as one logical build step.
    ///
    /// An empty document set is a no-op. Any failure aborts the whole batch
    /// with the index unchanged.
    pub fn build(&self, documents: &[Document]) -> Result<()> {
        if documents.is_empty() {
            tracing::debug!("no documents to index");
            return Ok(());
        }

        let chunks = self.chunker.split(documents)?;
        if chunks.is_empty() {
            tracing::debug!("documents produced no chunks");
            return Ok(());
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts)?;
        let ids = self.index.insert(&chunks, &vectors)?;

        tracing::info!(
            documents = documents.len(),
            chunks = ids.len(),
            "document batch indexed"
        );
        Ok(())
    }

    /// Embed the query, fetch the nearest chunks and assemble the context
    /// string, nearest first, chunks joined by a blank line.
    ///
    /// Returns `NO_RESULTS_SENTINEL` when nothing usable was retrieved (empty
    /// index, or every hit missing its metadata).
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<String> {
        tracing::info!(query, top_k, "retrieving context");

        let query_vector = self.embedder.embed(query)?;
        let hits = self.index.query(&query_vector, top_k)?;

        let texts: Vec<&str> = hits
            .iter()
            .filter(|hit| !hit.metadata.is_empty() && !hit.text.trim().is_empty())
            .map(|hit| hit.text.as_str())
            .collect();

        if texts.is_empty() {
            tracing::info!("no usable results for query");
            return Ok(NO_RESULTS_SENTINEL.to_string());
        }
        Ok(texts.join("\n\n"))
    }

    /// Retrieve context and hand it, with the query, to the generation
    /// collaborator as one structured prompt.
    ///
    /// Short-circuits with the sentinel when retrieval came back empty; the
    /// generated answer is returned uninterpreted.
    pub fn answer(
        &self,
        query: &str,
        top_k: usize,
        generator: &dyn TextGenerator,
    ) -> Result<String> {
        let context = self.retrieve(query, top_k)?;
        if context == NO_RESULTS_SENTINEL {
            return Ok(context);
        }
        let prompt = PromptBuilder::build_summary_prompt(query, &context);
        generator.complete(&prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::path::Path;

    const DOC_A: &str = "Streamlit is a Python library for building data apps.";
    const DOC_B: &str = "Retrieval augmented generation combines search and generation.";

    /// Deterministic test embedder: a normalized bag of letter-bigram
    /// buckets, one bucket per first-two-letters of each token. Shared
    /// tokens give vectors a smaller cosine distance; no network involved.
    struct BigramEmbedder;

    const DIMS: usize = 26 * 26;

    impl BigramEmbedder {
        fn bucket(token: &str) -> Option<usize> {
            let letters: Vec<u8> = token
                .bytes()
                .filter(|b| b.is_ascii_alphabetic())
                .map(|b| b.to_ascii_lowercase() - b'a')
                .collect();
            let first = *letters.first()?;
            let second = letters.get(1).copied().unwrap_or(first);
            Some(first as usize * 26 + second as usize)
        }
    }

    impl EmbeddingProvider for BigramEmbedder {
        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            texts
                .iter()
                .map(|text| {
                    if text.trim().is_empty() {
                        return Err(Error::embedding("cannot embed empty text"));
                    }
                    let mut vector = vec![0.0f32; DIMS];
                    for token in text.split_whitespace() {
                        if let Some(bucket) = Self::bucket(token) {
                            vector[bucket] += 1.0;
                        }
                    }
                    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
                    if norm > 0.0 {
                        for x in &mut vector {
                            *x /= norm;
                        }
                    }
                    Ok(vector)
                })
                .collect()
        }

        fn dimensions(&self) -> usize {
            DIMS
        }

        fn model_name(&self) -> &str {
            "bigram-test-embedder"
        }
    }

    struct EchoGenerator;

    impl TextGenerator for EchoGenerator {
        fn complete(&self, prompt: &str) -> Result<String> {
            Ok(format!("SUMMARY::{prompt}"))
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }
    }

    /// Generator that must never be reached
    struct UnreachableGenerator;

    impl TextGenerator for UnreachableGenerator {
        fn complete(&self, _prompt: &str) -> Result<String> {
            panic!("generator must not be called when retrieval is empty");
        }

        fn name(&self) -> &str {
            "unreachable"
        }

        fn model(&self) -> &str {
            "unreachable"
        }
    }

    fn pipeline_in(dir: &Path) -> RetrievalPipeline {
        let mut config = RagConfig::default();
        config.index.persist_dir = dir.to_path_buf();
        config.index.collection = "test_docs".to_string();
        RetrievalPipeline::from_config(&config, Arc::new(BigramEmbedder)).unwrap()
    }

    fn sample_documents() -> Vec<Document> {
        vec![Document::from_content(DOC_A), Document::from_content(DOC_B)]
    }

    #[test]
    fn test_build_then_retrieve_nearest_document() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_in(dir.path());

        pipeline.build(&sample_documents()).unwrap();
        assert_eq!(pipeline.index().count(), 2);

        let context = pipeline.retrieve("what is streamlit", 1).unwrap();
        assert!(context.contains(DOC_A));
        assert!(!context.contains(DOC_B));
    }

    #[test]
    fn test_retrieve_joins_chunks_with_blank_line() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_in(dir.path());

        pipeline.build(&sample_documents()).unwrap();

        let context = pipeline.retrieve("what is streamlit", 5).unwrap();
        assert!(context.contains(DOC_A));
        assert!(context.contains(DOC_B));
        // Nearest chunk comes first.
        assert!(context.find(DOC_A).unwrap() < context.find(DOC_B).unwrap());
        assert!(context.contains("\n\n"));
    }

    #[test]
    fn test_retrieve_sentinel_on_fresh_collection() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_in(dir.path());

        let context = pipeline.retrieve("anything at all", 3).unwrap();
        assert_eq!(context, NO_RESULTS_SENTINEL);
    }

    #[test]
    fn test_build_with_no_documents_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_in(dir.path());

        pipeline.build(&[]).unwrap();
        assert_eq!(pipeline.index().count(), 0);
    }

    #[test]
    fn test_embedding_is_deterministic() {
        let embedder = BigramEmbedder;
        let first = embedder.embed("the same text twice").unwrap();
        let second = embedder.embed("the same text twice").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_answer_hands_context_and_query_to_generator() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_in(dir.path());
        pipeline.build(&sample_documents()).unwrap();

        let answer = pipeline
            .answer("what is streamlit", 1, &EchoGenerator)
            .unwrap();
        assert!(answer.starts_with("SUMMARY::"));
        assert!(answer.contains("what is streamlit"));
        assert!(answer.contains(DOC_A));
    }

    #[test]
    fn test_answer_short_circuits_on_empty_retrieval() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_in(dir.path());

        let answer = pipeline
            .answer("what is streamlit", 1, &UnreachableGenerator)
            .unwrap();
        assert_eq!(answer, NO_RESULTS_SENTINEL);
    }

    #[test]
    fn test_index_survives_pipeline_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let pipeline = pipeline_in(dir.path());
            pipeline.build(&sample_documents()).unwrap();
        }

        let pipeline = pipeline_in(dir.path());
        assert_eq!(pipeline.index().count(), 2);
        let context = pipeline.retrieve("what is streamlit", 1).unwrap();
        assert!(context.contains(DOC_A));
    }
}
