//! Vector store construction from configuration.

use std::sync::Arc;

use ragfuse_config::VectorStoreConfig;
use ragfuse_protocols::{RetrievalError, VectorStore};
use tracing::info;

use crate::embedding::{EmbeddingProvider, HashEmbedding};
use crate::flat::{FlatVectorStore, INDEX_FILE};
use crate::sqlite::SqliteVectorStore;

/// Builds vector store backends by name.
pub struct VectorStoreFactory;

impl VectorStoreFactory {
    /// Create the backend named by `config.backend`.
    ///
    /// A flat store with a configured path loads the existing index when one
    /// is present there.
    pub async fn create(
        config: &VectorStoreConfig,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Arc<dyn VectorStore>, RetrievalError> {
        match config.backend.as_str() {
            "flat" => {
                let store = FlatVectorStore::new("flat", embedder);
                if let Some(path) = &config.path {
                    if path.join(INDEX_FILE).exists() {
                        store.load(path).await?;
                    }
                }
                info!("Created flat vector store");
                Ok(Arc::new(store))
            }
            "sqlite" => {
                let store = match &config.path {
                    Some(path) => SqliteVectorStore::open("sqlite", path, embedder).await?,
                    None => SqliteVectorStore::in_memory("sqlite", embedder).await?,
                };
                info!("Created sqlite vector store");
                Ok(Arc::new(store))
            }
            other => Err(RetrievalError::InvalidArgument(format!(
                "unknown vector store backend '{}'",
                other
            ))),
        }
    }

    /// The built-in hashing embedder sized from configuration.
    pub fn default_embedder(config: &VectorStoreConfig) -> Arc<dyn EmbeddingProvider> {
        Arc::new(HashEmbedding::new(config.embedding_dimension))
    }
}
