//! Chunk-level wrapper around a persistent vector collection

use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

use cairn_core::{Record, Store};

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::types::Chunk;

/// One retrieved chunk with its distance to the query vector
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// Chunk text
    pub text: String,
    /// Chunk metadata as persisted at insert time
    pub metadata: HashMap<String, serde_json::Value>,
    /// Distance to the query vector (smaller is closer)
    pub distance: f32,
}

/// Read-only snapshot of the index
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    /// Number of persisted records
    pub count: usize,
    /// Collection name
    pub collection_name: String,
    /// Directory backing the store
    pub persist_path: PathBuf,
    /// Embedding model the collection was populated with
    pub embedding_model: String,
}

/// Persistent vector index for chunks.
///
/// Wraps one `cairn-core` collection; the collection records which embedding
/// model populated it, so reopening with a different model fails instead of
/// silently mixing incompatible vectors.
pub struct VectorIndex {
    collection: cairn_core::Collection,
    persist_dir: PathBuf,
}

impl VectorIndex {
    /// Open (or create) the index described by `config`
    pub fn open(config: &IndexConfig, embedding_model: &str) -> Result<Self> {
        let store = Store::open(&config.persist_dir)?;
        let collection = store.collection(&config.collection, embedding_model, config.metric)?;

        tracing::info!(
            collection = %config.collection,
            persist_dir = %config.persist_dir.display(),
            records = collection.count(),
            model = embedding_model,
            "vector index ready"
        );

        Ok(Self {
            collection,
            persist_dir: config.persist_dir.clone(),
        })
    }

    /// Insert chunks with their vectors, pairing them by position.
    ///
    /// `chunks` and `vectors` must have equal length; a mismatch fails with
    /// no partial insert. One fresh id is generated per chunk and the whole
    /// batch lands through a single atomic collection write.
    pub fn insert(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<Vec<String>> {
        if chunks.len() != vectors.len() {
            return Err(Error::DimensionMismatch {
                chunks: chunks.len(),
                vectors: vectors.len(),
            });
        }
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::with_capacity(chunks.len());
        let mut records = Vec::with_capacity(chunks.len());
        for (i, (chunk, vector)) in chunks.iter().zip(vectors).enumerate() {
            let id = new_record_id(i);
            let mut metadata = chunk.metadata.clone();
            metadata.insert("doc_index".to_string(), serde_json::json!(i));
            metadata.insert(
                "content_length".to_string(),
                serde_json::json!(chunk.char_len()),
            );
            records.push(Record {
                id: id.clone(),
                vector: vector.clone(),
                text: chunk.text.clone(),
                metadata,
            });
            ids.push(id);
        }

        self.collection.add(records)?;
        tracing::info!(
            added = ids.len(),
            total = self.collection.count(),
            "added chunks to index"
        );
        Ok(ids)
    }

    /// Return up to `top_k` chunks ranked nearest-first
    pub fn query(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        let hits = self.collection.query(query_vector, top_k)?;
        Ok(hits
            .into_iter()
            .map(|hit| ScoredChunk {
                text: hit.text,
                metadata: hit.metadata,
                distance: hit.distance,
            })
            .collect())
    }

    /// Destroy all records; the empty collection keeps its name
    pub fn clear(&self) -> Result<()> {
        self.collection.clear()?;
        Ok(())
    }

    /// Number of persisted records
    pub fn count(&self) -> usize {
        self.collection.count()
    }

    /// Read-only index snapshot
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            count: self.collection.count(),
            collection_name: self.collection.name().to_string(),
            persist_path: self.persist_dir.clone(),
            embedding_model: self.collection.embedding_model().to_string(),
        }
    }
}

/// Fresh record id: `doc_<8 hex chars>_<batch position>`
fn new_record_id(position: usize) -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("doc_{}_{position}", &uuid[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn open_index(dir: &std::path::Path) -> VectorIndex {
        let config = IndexConfig {
            persist_dir: dir.to_path_buf(),
            collection: "test_docs".to_string(),
            ..IndexConfig::default()
        };
        VectorIndex::open(&config, "test-model").unwrap()
    }

    fn chunk(text: &str, index: usize) -> Chunk {
        Chunk::new(text.to_string(), HashMap::new(), index)
    }

    #[test]
    fn test_insert_returns_one_distinct_id_per_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let index = open_index(dir.path());

        let chunks = vec![chunk("one", 0), chunk("two", 1), chunk("three", 2)];
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];

        let ids = index.insert(&chunks, &vectors).unwrap();
        assert_eq!(ids.len(), chunks.len());
        let distinct: HashSet<&String> = ids.iter().collect();
        assert_eq!(distinct.len(), ids.len());
        assert_eq!(index.count(), 3);
    }

    #[test]
    fn test_count_mismatch_leaves_collection_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let index = open_index(dir.path());

        let chunks = vec![chunk("one", 0), chunk("two", 1), chunk("three", 2)];
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0]];

        let result = index.insert(&chunks, &vectors);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                chunks: 3,
                vectors: 2
            })
        ));
        assert_eq!(index.count(), 0);
    }

    #[test]
    fn test_query_sorted_and_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let index = open_index(dir.path());

        let chunks = vec![chunk("east", 0), chunk("north", 1), chunk("diagonal", 2)];
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
        index.insert(&chunks, &vectors).unwrap();

        let hits = index.query(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].distance <= hits[1].distance);
        assert_eq!(hits[0].text, "east");
    }

    #[test]
    fn test_insert_attaches_doc_index_and_content_length() {
        let dir = tempfile::tempdir().unwrap();
        let index = open_index(dir.path());

        index
            .insert(&[chunk("hello", 0)], &[vec![1.0, 0.0]])
            .unwrap();

        let hits = index.query(&[1.0, 0.0], 1).unwrap();
        assert_eq!(hits[0].metadata["doc_index"], serde_json::json!(0));
        assert_eq!(hits[0].metadata["content_length"], serde_json::json!(5));
    }

    #[test]
    fn test_stats_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let index = open_index(dir.path());

        index
            .insert(&[chunk("hello", 0)], &[vec![1.0, 0.0]])
            .unwrap();

        let stats = index.stats();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.collection_name, "test_docs");
        assert_eq!(stats.persist_path, dir.path());
        assert_eq!(stats.embedding_model, "test-model");

        index.clear().unwrap();
        assert_eq!(index.stats().count, 0);
    }
}
