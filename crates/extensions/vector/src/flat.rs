//! In-memory flat vector store with explicit persistence.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use ragfuse_protocols::{
    DistanceMetric, Document, Persistence, RetrievalError, StoreCapabilities, VectorStore,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::embedding::{Embedding, EmbeddingProvider};
use crate::index::{FlatIndex, IndexedDocument};

/// File written inside the directory passed to `save` / `load`.
pub const INDEX_FILE: &str = "index.json";

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct PersistedIndexRef<'a> {
    version: u32,
    dimension: usize,
    entries: Vec<PersistedEntryRef<'a>>,
}

#[derive(Serialize)]
struct PersistedEntryRef<'a> {
    document: &'a Document,
    vector: &'a [f32],
}

#[derive(Deserialize)]
struct PersistedIndex {
    dimension: usize,
    #[serde(default)]
    entries: Vec<Value>,
}

#[derive(Deserialize)]
struct PersistedEntry {
    document: Document,
    vector: Vec<f32>,
}

/// Exact brute-force store ranked by squared Euclidean distance.
///
/// The index only exists after the first `add_documents` or `load`; searching
/// before that fails with [`RetrievalError::NotInitialized`].
pub struct FlatVectorStore {
    id: String,
    embedder: Arc<dyn EmbeddingProvider>,
    index: RwLock<Option<FlatIndex>>,
}

impl FlatVectorStore {
    pub fn new(id: impl Into<String>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            id: id.into(),
            embedder,
            index: RwLock::new(None),
        }
    }

    /// Whether an index exists yet.
    pub fn is_initialized(&self) -> bool {
        self.index.read().is_some()
    }

    fn not_initialized(&self) -> RetrievalError {
        RetrievalError::NotInitialized(format!(
            "flat store '{}' has no index; add documents or load one first",
            self.id
        ))
    }

    fn parse_index(&self, raw: &str) -> Result<FlatIndex, RetrievalError> {
        let persisted: PersistedIndex = serde_json::from_str(raw)?;
        let expected = self.embedder.dimension();
        if persisted.dimension != expected {
            return Err(RetrievalError::Storage(format!(
                "index dimension {} does not match embedder dimension {}",
                persisted.dimension, expected
            )));
        }

        let mut index = FlatIndex::new(persisted.dimension);
        for (position, raw_entry) in persisted.entries.into_iter().enumerate() {
            let entry = match serde_json::from_value::<PersistedEntry>(raw_entry) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable index entry {}: {}", position, e);
                    continue;
                }
            };
            let indexed = IndexedDocument {
                document: entry.document,
                embedding: Embedding::new(entry.vector),
            };
            if let Err(rejected) = index.push(indexed) {
                warn!(
                    "Skipping index entry {} with dimension {} (expected {})",
                    position,
                    rejected.embedding.dimension,
                    index.dimension()
                );
            }
        }
        Ok(index)
    }
}

#[async_trait]
impl VectorStore for FlatVectorStore {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            supports_delete: false,
            persistence: Persistence::Explicit,
            distance: DistanceMetric::SquaredEuclidean,
        }
    }

    async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>, RetrievalError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != documents.len() {
            return Err(RetrievalError::Embedding(format!(
                "expected {} embeddings, got {}",
                documents.len(),
                embeddings.len()
            )));
        }

        let mut guard = self.index.write();
        let dimension = guard
            .as_ref()
            .map_or_else(|| self.embedder.dimension(), FlatIndex::dimension);
        // Reject the whole batch before anything is pushed.
        if let Some(bad) = embeddings.iter().find(|e| e.dimension != dimension) {
            return Err(RetrievalError::Embedding(format!(
                "embedding dimension {} does not match index dimension {}",
                bad.dimension, dimension
            )));
        }
        let index = guard.get_or_insert_with(|| {
            info!("Creating flat index '{}' with dimension {}", self.id, dimension);
            FlatIndex::new(dimension)
        });

        let mut ids = Vec::with_capacity(documents.len());
        for (mut document, embedding) in documents.into_iter().zip(embeddings) {
            let id = document
                .id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            document.id = Some(id.clone());

            index
                .push(IndexedDocument { document, embedding })
                .map_err(|rejected| {
                    RetrievalError::Embedding(format!(
                        "embedding dimension {} does not match index dimension {}",
                        rejected.embedding.dimension, dimension
                    ))
                })?;
            ids.push(id);
        }

        debug!("Added {} documents to flat index '{}'", ids.len(), self.id);
        Ok(ids)
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>, RetrievalError> {
        if !self.is_initialized() {
            return Err(self.not_initialized());
        }

        let embedding = self.embedder.embed(query).await?;

        let guard = self.index.read();
        let index = guard.as_ref().ok_or_else(|| self.not_initialized())?;
        let results = index
            .search(&embedding, k)
            .into_iter()
            .filter_map(|(position, distance)| {
                index
                    .get(position)
                    .map(|entry| (entry.document.clone(), distance))
            })
            .collect();
        Ok(results)
    }

    async fn documents(&self) -> Result<Vec<Document>, RetrievalError> {
        let guard = self.index.read();
        let index = guard.as_ref().ok_or_else(|| self.not_initialized())?;
        Ok(index.entries().iter().map(|e| e.document.clone()).collect())
    }

    async fn len(&self) -> Result<usize, RetrievalError> {
        Ok(self.index.read().as_ref().map_or(0, FlatIndex::len))
    }

    async fn save(&self, path: &Path) -> Result<(), RetrievalError> {
        let serialized = {
            let guard = self.index.read();
            let index = guard.as_ref().ok_or_else(|| self.not_initialized())?;
            let persisted = PersistedIndexRef {
                version: FORMAT_VERSION,
                dimension: index.dimension(),
                entries: index
                    .entries()
                    .iter()
                    .map(|e| PersistedEntryRef {
                        document: &e.document,
                        vector: &e.embedding.vector,
                    })
                    .collect(),
            };
            serde_json::to_vec(&persisted)?
        };

        tokio::fs::create_dir_all(path).await?;
        let file = path.join(INDEX_FILE);
        tokio::fs::write(&file, serialized).await?;

        info!("Saved flat index '{}' to {}", self.id, file.display());
        Ok(())
    }

    async fn load(&self, path: &Path) -> Result<(), RetrievalError> {
        let file = path.join(INDEX_FILE);
        let raw = tokio::fs::read_to_string(&file).await.map_err(|e| {
            RetrievalError::Storage(format!("cannot read {}: {}", file.display(), e))
        })?;

        let index = self.parse_index(&raw)?;
        let count = index.len();
        *self.index.write() = Some(index);

        info!("Loaded flat index '{}' from {} ({} documents)", self.id, file.display(), count);
        Ok(())
    }

    async fn delete(&self, _ids: &[String]) -> Result<(), RetrievalError> {
        Err(RetrievalError::NotSupported(format!(
            "flat store '{}' does not support delete",
            self.id
        )))
    }
}

#[cfg(test)]
#[path = "flat_tests.rs"]
mod tests;
