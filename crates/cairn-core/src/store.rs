//! File-backed store and its named collections
//!
//! One `Store` owns one directory; that directory is the unit of backup and
//! restore. Each collection persists as a single JSON snapshot inside it,
//! rewritten atomically (temp file + rename) on every mutation so readers
//! never observe a partially-written batch.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::types::{DistanceMetric, Hit, Record};

/// Handle to a store directory
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The directory backing this store
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Get or create a named collection.
    ///
    /// An existing collection must have been created with the same embedding
    /// model and distance metric; mixing models or metrics silently corrupts
    /// distance comparisons, so both are pinned at creation and checked here.
    pub fn collection(
        &self,
        name: &str,
        embedding_model: &str,
        metric: DistanceMetric,
    ) -> Result<Collection> {
        if name.is_empty() {
            return Err(StoreError::invalid_input("collection name must not be empty"));
        }

        let path = self.root.join(format!("{name}.json"));

        if path.exists() {
            let snapshot = read_snapshot(&path, name)?;
            if snapshot.meta.embedding_model != embedding_model {
                return Err(StoreError::ModelMismatch {
                    expected: snapshot.meta.embedding_model,
                    actual: embedding_model.to_string(),
                });
            }
            if snapshot.meta.metric != metric {
                return Err(StoreError::MetricMismatch {
                    expected: snapshot.meta.metric,
                    actual: metric,
                });
            }

            let mut ids = HashSet::with_capacity(snapshot.records.len());
            for record in &snapshot.records {
                if let Some(expected) = snapshot.meta.dimensions {
                    if record.vector.len() != expected {
                        return Err(StoreError::corrupted(
                            name,
                            format!(
                                "record '{}' has dimension {} but collection expects {}",
                                record.id,
                                record.vector.len(),
                                expected
                            ),
                        ));
                    }
                }
                if !ids.insert(record.id.clone()) {
                    return Err(StoreError::corrupted(
                        name,
                        format!("duplicate record id '{}'", record.id),
                    ));
                }
            }

            tracing::debug!(
                collection = name,
                records = snapshot.records.len(),
                "loaded collection"
            );

            Ok(Collection {
                path,
                name: name.to_string(),
                embedding_model: embedding_model.to_string(),
                metric,
                state: RwLock::new(State {
                    dimensions: snapshot.meta.dimensions,
                    records: snapshot.records,
                    ids,
                }),
            })
        } else {
            let collection = Collection {
                path,
                name: name.to_string(),
                embedding_model: embedding_model.to_string(),
                metric,
                state: RwLock::new(State {
                    dimensions: None,
                    records: Vec::new(),
                    ids: HashSet::new(),
                }),
            };

            // Persist the empty snapshot so the collection exists on disk
            // from the moment it is created.
            {
                let state = collection.state.read();
                collection.persist(&state)?;
            }

            tracing::debug!(collection = name, "created collection");
            Ok(collection)
        }
    }
}

struct State {
    /// Pinned on first insert; inserts with a different dimension are rejected
    dimensions: Option<usize>,
    records: Vec<Record>,
    ids: HashSet<String>,
}

/// A named, persistent group of records
pub struct Collection {
    path: PathBuf,
    name: String,
    embedding_model: String,
    metric: DistanceMetric,
    state: RwLock<State>,
}

impl Collection {
    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Embedding model this collection was created with
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Distance metric this collection was created with
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Number of records currently stored
    pub fn count(&self) -> usize {
        self.state.read().records.len()
    }

    /// True if the collection holds no records
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Vector dimension, once pinned by the first insert
    pub fn dimensions(&self) -> Option<usize> {
        self.state.read().dimensions
    }

    /// Insert a batch of records as one atomic operation.
    ///
    /// The whole batch is validated before any mutation: every vector must
    /// match the collection's pinned dimension (the first batch pins it) and
    /// every id must be new. A failed validation or a failed snapshot write
    /// leaves the collection exactly as it was.
    pub fn add(&self, records: Vec<Record>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut state = self.state.write();

        let mut dimensions = state.dimensions;
        {
            let mut batch_ids: HashSet<&str> = HashSet::with_capacity(records.len());
            for record in &records {
                if record.vector.is_empty() {
                    return Err(StoreError::invalid_input(format!(
                        "record '{}' has an empty vector",
                        record.id
                    )));
                }
                match dimensions {
                    Some(expected) if record.vector.len() != expected => {
                        return Err(StoreError::DimensionMismatch {
                            expected,
                            actual: record.vector.len(),
                        });
                    }
                    None => dimensions = Some(record.vector.len()),
                    _ => {}
                }
                if state.ids.contains(record.id.as_str()) || !batch_ids.insert(&record.id) {
                    return Err(StoreError::DuplicateId(record.id.clone()));
                }
            }
        }

        let previous_len = state.records.len();
        let previous_dimensions = state.dimensions;
        state.dimensions = dimensions;
        for record in records {
            state.ids.insert(record.id.clone());
            state.records.push(record);
        }

        if let Err(e) = self.persist(&state) {
            let added: Vec<String> = state.records.drain(previous_len..).map(|r| r.id).collect();
            for id in &added {
                state.ids.remove(id);
            }
            state.dimensions = previous_dimensions;
            return Err(e);
        }

        tracing::debug!(
            collection = %self.name,
            added = state.records.len() - previous_len,
            total = state.records.len(),
            "added records"
        );
        Ok(())
    }

    /// Return up to `k` records ranked by ascending distance to `vector`.
    ///
    /// An empty collection yields an empty result, never an error. A query
    /// vector whose dimension disagrees with the collection is rejected.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Hit>> {
        let state = self.state.read();

        if state.records.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if let Some(expected) = state.dimensions {
            if vector.len() != expected {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }

        let mut hits: Vec<Hit> = state
            .records
            .iter()
            .map(|record| Hit {
                id: record.id.clone(),
                text: record.text.clone(),
                metadata: record.metadata.clone(),
                distance: self.metric.distance(vector, &record.vector),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }

    /// Destroy every record and persist the empty collection under the same
    /// name. Irreversible; clearing an already-empty collection is a no-op.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.state.write();

        tracing::warn!(collection = %self.name, dropped = state.records.len(), "clearing collection");

        let previous_records = std::mem::take(&mut state.records);
        let previous_ids = std::mem::take(&mut state.ids);
        let previous_dimensions = state.dimensions.take();

        if let Err(e) = self.persist(&state) {
            state.records = previous_records;
            state.ids = previous_ids;
            state.dimensions = previous_dimensions;
            return Err(e);
        }
        Ok(())
    }

    /// Write the current state as a whole-file snapshot, atomically.
    fn persist(&self, state: &State) -> Result<()> {
        let snapshot = SnapshotOut {
            meta: MetaOut {
                name: &self.name,
                embedding_model: &self.embedding_model,
                metric: self.metric,
                dimensions: state.dimensions,
            },
            records: &state.records,
        };
        let bytes = serde_json::to_vec(&snapshot)?;

        let dir = self.path.parent().ok_or_else(|| {
            StoreError::corrupted(&self.name, "collection path has no parent directory")
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

#[derive(Serialize)]
struct SnapshotOut<'a> {
    meta: MetaOut<'a>,
    records: &'a [Record],
}

#[derive(Serialize)]
struct MetaOut<'a> {
    name: &'a str,
    embedding_model: &'a str,
    metric: DistanceMetric,
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct SnapshotIn {
    meta: MetaIn,
    records: Vec<Record>,
}

#[derive(Deserialize)]
struct MetaIn {
    name: String,
    embedding_model: String,
    metric: DistanceMetric,
    dimensions: Option<usize>,
}

fn read_snapshot(path: &Path, name: &str) -> Result<SnapshotIn> {
    let bytes = std::fs::read(path)?;
    let snapshot: SnapshotIn =
        serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupted(name, e.to_string()))?;
    if snapshot.meta.name != name {
        return Err(StoreError::corrupted(
            name,
            format!("snapshot belongs to collection '{}'", snapshot.meta.name),
        ));
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(id: &str, vector: Vec<f32>, text: &str) -> Record {
        Record {
            id: id.to_string(),
            vector,
            text: text.to_string(),
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn test_query_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let collection = store
            .collection("docs", "test-model", DistanceMetric::Cosine)
            .unwrap();

        let hits = collection.query(&[1.0, 0.0], 5).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_query_ranked_by_ascending_distance() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let collection = store
            .collection("docs", "test-model", DistanceMetric::Cosine)
            .unwrap();

        collection
            .add(vec![
                record("a", vec![1.0, 0.0], "east"),
                record("b", vec![0.0, 1.0], "north"),
                record("c", vec![1.0, 1.0], "northeast"),
            ])
            .unwrap();

        let hits = collection.query(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[1].id, "c");
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[test]
    fn test_query_returns_all_when_fewer_than_k() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let collection = store
            .collection("docs", "test-model", DistanceMetric::Cosine)
            .unwrap();

        collection
            .add(vec![record("only", vec![1.0, 0.0], "lonely")])
            .unwrap();

        let hits = collection.query(&[1.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let collection = store
            .collection("docs", "test-model", DistanceMetric::Cosine)
            .unwrap();

        collection
            .add(vec![record("a", vec![1.0, 0.0], "east")])
            .unwrap();
        assert_eq!(collection.count(), 1);

        collection.clear().unwrap();
        assert_eq!(collection.count(), 0);

        // Clearing an already-empty collection raises no error.
        collection.clear().unwrap();
        assert_eq!(collection.count(), 0);
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = Store::open(dir.path()).unwrap();
            let collection = store
                .collection("docs", "test-model", DistanceMetric::Cosine)
                .unwrap();
            collection
                .add(vec![record("a", vec![0.5, 0.5], "persisted")])
                .unwrap();
        }

        let store = Store::open(dir.path()).unwrap();
        let collection = store
            .collection("docs", "test-model", DistanceMetric::Cosine)
            .unwrap();
        assert_eq!(collection.count(), 1);
        assert_eq!(collection.dimensions(), Some(2));

        let hits = collection.query(&[0.5, 0.5], 1).unwrap();
        assert_eq!(hits[0].text, "persisted");
    }

    #[test]
    fn test_duplicate_id_rejected_without_partial_insert() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let collection = store
            .collection("docs", "test-model", DistanceMetric::Cosine)
            .unwrap();

        collection
            .add(vec![record("a", vec![1.0, 0.0], "first")])
            .unwrap();

        let result = collection.add(vec![
            record("b", vec![0.0, 1.0], "fine"),
            record("a", vec![1.0, 1.0], "duplicate"),
        ]);
        assert!(matches!(result, Err(StoreError::DuplicateId(ref id)) if id == "a"));
        // Nothing from the failed batch landed.
        assert_eq!(collection.count(), 1);
    }

    #[test]
    fn test_dimension_pinned_by_first_insert() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let collection = store
            .collection("docs", "test-model", DistanceMetric::Cosine)
            .unwrap();

        collection
            .add(vec![record("a", vec![1.0, 0.0, 0.0], "3d")])
            .unwrap();

        let result = collection.add(vec![record("b", vec![1.0, 0.0], "2d")]);
        assert!(matches!(
            result,
            Err(StoreError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert_eq!(collection.count(), 1);

        let result = collection.query(&[1.0, 0.0], 1);
        assert!(matches!(result, Err(StoreError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_model_mismatch_on_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = Store::open(dir.path()).unwrap();
            store
                .collection("docs", "model-a", DistanceMetric::Cosine)
                .unwrap();
        }

        let store = Store::open(dir.path()).unwrap();
        let result = store.collection("docs", "model-b", DistanceMetric::Cosine);
        assert!(matches!(result, Err(StoreError::ModelMismatch { .. })));
    }

    #[test]
    fn test_metric_mismatch_on_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = Store::open(dir.path()).unwrap();
            store
                .collection("docs", "test-model", DistanceMetric::Cosine)
                .unwrap();
        }

        let store = Store::open(dir.path()).unwrap();
        let result = store.collection("docs", "test-model", DistanceMetric::Euclidean);
        assert!(matches!(result, Err(StoreError::MetricMismatch { .. })));
    }

    #[test]
    fn test_collection_exists_on_disk_after_creation() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store
            .collection("docs", "test-model", DistanceMetric::Cosine)
            .unwrap();
        assert!(dir.path().join("docs.json").exists());
    }
}
