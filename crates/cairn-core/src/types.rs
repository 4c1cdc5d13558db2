//! Record and query types for vector collections

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The persisted unit: one embedded text segment with its metadata.
///
/// Records are immutable once written; re-indexing a segment means inserting
/// a new record, not patching an existing one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Unique id within the collection for the lifetime of the store
    pub id: String,
    /// Embedding vector; dimension is fixed per collection
    pub vector: Vec<f32>,
    /// The text that was embedded
    pub text: String,
    /// Arbitrary metadata carried alongside the text
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Distance metric used for ranking.
///
/// Fixed per collection at creation so build and query always agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine distance (1 - cosine similarity)
    #[default]
    Cosine,
    /// Euclidean (L2) distance
    Euclidean,
}

/// One ranked query result
#[derive(Debug, Clone)]
pub struct Hit {
    /// Record id
    pub id: String,
    /// Stored text
    pub text: String,
    /// Stored metadata
    pub metadata: HashMap<String, serde_json::Value>,
    /// Distance to the query vector (smaller is closer)
    pub distance: f32,
}
