//! Document and chunk types

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

/// A raw unit of ingested content.
///
/// Produced by an external loader; immutable once created and consumed only
/// by the chunker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document id
    pub id: Uuid,
    /// Raw text content
    pub content: String,
    /// Arbitrary metadata (e.g. source path), inherited by every chunk
    pub metadata: HashMap<String, serde_json::Value>,
    /// Content hash for deduplication
    pub content_hash: String,
    /// Ingestion timestamp
    pub ingested_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    /// Create a new document
    pub fn new(content: String, metadata: HashMap<String, serde_json::Value>) -> Self {
        let content_hash = hash_content(&content);
        Self {
            id: Uuid::new_v4(),
            content,
            metadata,
            content_hash,
            ingested_at: chrono::Utc::now(),
        }
    }

    /// Create a document with no metadata
    pub fn from_content(content: impl Into<String>) -> Self {
        Self::new(content.into(), HashMap::new())
    }
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A contiguous segment of a document's content, the unit of embedding and
/// retrieval. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Segment text
    pub text: String,
    /// Position of this chunk within its parent document
    pub chunk_index: usize,
    /// Parent document metadata plus `chunk_index` and `char_len`
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Chunk {
    /// Create a chunk, folding its index and character length into the
    /// inherited document metadata.
    pub fn new(
        text: String,
        mut metadata: HashMap<String, serde_json::Value>,
        chunk_index: usize,
    ) -> Self {
        metadata.insert("chunk_index".to_string(), serde_json::json!(chunk_index));
        metadata.insert("char_len".to_string(), serde_json::json!(char_len(&text)));
        Self {
            text,
            chunk_index,
            metadata,
        }
    }

    /// Character length of the chunk text
    pub fn char_len(&self) -> usize {
        char_len(&self.text)
    }
}

/// Length in user-perceived characters (grapheme clusters).
pub(crate) fn char_len(text: &str) -> usize {
    text.graphemes(true).count()
}
