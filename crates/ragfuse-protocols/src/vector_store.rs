//! Vector store protocol definitions.
//!
//! Backends differ in what they can do: some delete, some persist on their
//! own. Those differences are reported through [`StoreCapabilities`] and
//! enforced with [`RetrievalError::NotSupported`], never silently ignored.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::document::Document;
use crate::error::RetrievalError;

/// How a backend persists its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persistence {
    /// State lives in memory until `save` is called; `load` restores it.
    Explicit,
    /// Every write is durable; `save` and `load` are logged no-ops.
    Automatic,
}

/// Distance scale returned by `similarity_search_with_score`.
///
/// Lower is always more similar, but the range differs per metric, so callers
/// must not assume a fixed scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Squared Euclidean distance, `[0, inf)`.
    SquaredEuclidean,
    /// Cosine distance `1 - cos`, `[0, 2]`.
    Cosine,
}

/// Capability set of a vector store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCapabilities {
    pub supports_delete: bool,
    pub persistence: Persistence,
    pub distance: DistanceMetric,
}

/// Core trait for nearest-neighbor index backends.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Returns the backend ID.
    fn id(&self) -> &str;

    /// Returns what this backend supports.
    fn capabilities(&self) -> StoreCapabilities;

    /// Embed and insert documents, creating the index on first use.
    /// Returns the IDs of the inserted documents.
    async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>, RetrievalError>;

    /// Nearest documents with their distance (lower = more similar).
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>, RetrievalError>;

    /// Nearest documents, most similar first.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>, RetrievalError> {
        let scored = self.similarity_search_with_score(query, k).await?;
        Ok(scored.into_iter().map(|(doc, _)| doc).collect())
    }

    /// All stored documents in insertion order.
    async fn documents(&self) -> Result<Vec<Document>, RetrievalError>;

    /// Number of stored documents.
    async fn len(&self) -> Result<usize, RetrievalError>;

    /// Persist the index under `path`.
    async fn save(&self, path: &Path) -> Result<(), RetrievalError>;

    /// Restore the index from `path`.
    async fn load(&self, path: &Path) -> Result<(), RetrievalError>;

    /// Delete documents by ID.
    async fn delete(&self, ids: &[String]) -> Result<(), RetrievalError>;
}
