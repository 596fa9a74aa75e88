//! Retrieval engine wiring store, retriever and cache from configuration.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use ragfuse_cache::{CacheFactory, CacheManager, CacheStatsSnapshot};
use ragfuse_config::{Config, ConfigLoader, ConfigValidator};
use ragfuse_hybrid::{CachedRetriever, HybridRetriever, ScoredCandidate};
use ragfuse_protocols::{Document, Persistence, VectorStore};
use ragfuse_vector::{EmbeddingProvider, VectorStoreFactory};

use crate::error::EngineError;

/// A ready-to-query hybrid retrieval stack.
pub struct RetrievalEngine {
    config: Config,
    store: Arc<dyn VectorStore>,
    retriever: Arc<HybridRetriever>,
    cached: CachedRetriever,
}

impl RetrievalEngine {
    /// Validate `config` and build every component.
    ///
    /// An existing index at the configured store path is loaded, so an
    /// engine built over a saved index is searchable right away.
    pub async fn from_config(
        config: Config,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, EngineError> {
        let warnings = ConfigValidator::validate(&config).into_result()?;
        for warning in &warnings {
            warn!("Config warning at {}: {}", warning.path, warning.message);
        }

        if embedder.dimension() != config.vector_store.embedding_dimension {
            warn!(
                "Embedder dimension {} differs from configured embedding_dimension {}",
                embedder.dimension(),
                config.vector_store.embedding_dimension
            );
        }

        let store = VectorStoreFactory::create(&config.vector_store, embedder).await?;
        let retriever = Arc::new(HybridRetriever::from_config(store.clone(), &config));
        let documents = retriever.load_index().await?;

        let cache = Arc::new(CacheFactory::manager(&config.cache).await?);
        let cached = CachedRetriever::new(retriever.clone(), cache);

        info!(
            "Retrieval engine ready: {} store, {} cache, {} documents",
            store.id(),
            cached.cache().backend_id(),
            documents
        );

        Ok(Self {
            config,
            store,
            retriever,
            cached,
        })
    }

    /// Build with the built-in hashing embedder sized from configuration.
    pub async fn with_default_embedder(config: Config) -> Result<Self, EngineError> {
        let embedder = VectorStoreFactory::default_embedder(&config.vector_store);
        Self::from_config(config, embedder).await
    }

    /// Load a TOML configuration file and build with the default embedder.
    pub async fn open(path: &Path) -> Result<Self, EngineError> {
        let config = ConfigLoader::load(path)?;
        Self::with_default_embedder(config).await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn retriever(&self) -> &Arc<HybridRetriever> {
        &self.retriever
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        self.cached.cache()
    }

    pub fn document_count(&self) -> usize {
        self.retriever.document_count().unwrap_or(0)
    }

    /// Index documents. Returns their store IDs.
    pub async fn ingest(&self, documents: Vec<Document>) -> Result<Vec<String>, EngineError> {
        let count = documents.len();
        let ids = self.retriever.add_documents(documents).await?;
        info!("Ingested {} documents", count);
        Ok(ids)
    }

    /// Remove documents by store ID. Needs a store that supports delete.
    pub async fn delete(&self, ids: &[String]) -> Result<(), EngineError> {
        self.retriever.delete(ids).await?;
        info!("Deleted {} documents", ids.len());
        Ok(())
    }

    /// Cached search. `k` and `alpha` default to the configured values.
    pub async fn search(
        &self,
        query: &str,
        k: Option<usize>,
        alpha: Option<f32>,
    ) -> Result<Vec<Document>, EngineError> {
        let (k, alpha) = self.resolve(k, alpha);
        Ok(self.cached.search(query, k, alpha).await?)
    }

    /// Uncached search keeping per-candidate scores.
    pub async fn search_scored(
        &self,
        query: &str,
        k: Option<usize>,
        alpha: Option<f32>,
    ) -> Result<Vec<ScoredCandidate>, EngineError> {
        let (k, alpha) = self.resolve(k, alpha);
        Ok(self.retriever.search_scored(query, k, alpha).await?)
    }

    fn resolve(&self, k: Option<usize>, alpha: Option<f32>) -> (usize, f32) {
        (
            k.unwrap_or(self.config.retriever.default_k),
            alpha.unwrap_or(self.config.retriever.default_alpha),
        )
    }

    /// Persist the vector store at the configured path.
    ///
    /// Stores that persist on write need no path.
    pub async fn save(&self) -> Result<(), EngineError> {
        match (&self.config.vector_store.path, self.store.capabilities().persistence) {
            (Some(path), _) => {
                self.store.save(path).await?;
                info!("Saved {} store to {}", self.store.id(), path.display());
                Ok(())
            }
            (None, Persistence::Automatic) => Ok(()),
            (None, Persistence::Explicit) => {
                Err(EngineError::MissingStorePath(self.store.id().to_string()))
            }
        }
    }

    pub fn cache_stats(&self) -> CacheStatsSnapshot {
        self.cache().stats()
    }

    pub async fn clear_cache(&self) -> Result<(), EngineError> {
        self.cache().clear().await?;
        info!("Cleared retrieval cache");
        Ok(())
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
