//! Memoized retrieval.

use std::sync::Arc;
use std::time::Duration;

use ragfuse_cache::{CacheManager, cache_key};
use ragfuse_protocols::{Document, ProtocolError};

use crate::retriever::HybridRetriever;

/// A [`HybridRetriever`] whose searches are cached.
///
/// Keys include the corpus generation, so results cached before an ingestion
/// are never served after it.
pub struct CachedRetriever {
    retriever: Arc<HybridRetriever>,
    cache: Arc<CacheManager>,
    prefix: String,
    ttl: Option<Duration>,
}

impl CachedRetriever {
    /// Key prefix and TTL come from the retriever's configuration.
    pub fn new(retriever: Arc<HybridRetriever>, cache: Arc<CacheManager>) -> Self {
        let config = retriever.config();
        let prefix = config.cache_key_prefix.clone();
        let ttl = config.cache_ttl_seconds.map(Duration::from_secs);
        Self {
            retriever,
            cache,
            prefix,
            ttl,
        }
    }

    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn retriever(&self) -> &Arc<HybridRetriever> {
        &self.retriever
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    /// Cached [`HybridRetriever::search`]. Failed searches are not cached.
    pub async fn search(&self, query: &str, k: usize, alpha: f32) -> Result<Vec<Document>, ProtocolError> {
        let generation = self.retriever.generation();
        let key = cache_key(&self.prefix, "search", &(query, k, alpha, generation))?;

        self.cache
            .memoize(&key, self.ttl, || async {
                self.retriever
                    .search(query, k, alpha)
                    .await
                    .map_err(ProtocolError::from)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragfuse_cache::MemoryCache;
    use ragfuse_config::RetrieverConfig;
    use ragfuse_protocols::{RetrievalError, VectorStore};
    use ragfuse_vector::{FlatVectorStore, HashEmbedding, SqliteVectorStore};

    fn setup() -> CachedRetriever {
        let store: Arc<dyn VectorStore> =
            Arc::new(FlatVectorStore::new("test", Arc::new(HashEmbedding::new(32))));
        let retriever = Arc::new(HybridRetriever::new(store, RetrieverConfig::default()));
        let cache = Arc::new(CacheManager::new(Arc::new(MemoryCache::new())));
        CachedRetriever::new(retriever, cache)
    }

    fn docs() -> Vec<Document> {
        vec![
            Document::new("Listino prezzi dei servizi di manutenzione"),
            Document::new("Contratto quadro firmato a marzo"),
            Document::new("Verbale della riunione di avvio progetto"),
        ]
    }

    #[tokio::test]
    async fn test_second_search_is_a_hit() {
        let cached = setup();
        cached.retriever().add_documents(docs()).await.unwrap();

        let first = cached.search("listino prezzi", 2, 0.8).await.unwrap();
        let second = cached.search("listino prezzi", 2, 0.8).await.unwrap();
        assert_eq!(first, second);

        let stats = cached.cache().stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.sets, 1);
    }

    #[tokio::test]
    async fn test_different_arguments_use_different_keys() {
        let cached = setup();
        cached.retriever().add_documents(docs()).await.unwrap();

        cached.search("listino", 2, 0.8).await.unwrap();
        cached.search("listino", 3, 0.8).await.unwrap();
        cached.search("listino", 2, 0.5).await.unwrap();
        assert_eq!(cached.cache().stats().misses, 3);
    }

    #[tokio::test]
    async fn test_ingestion_invalidates_results() {
        let cached = setup();
        cached.retriever().add_documents(docs()).await.unwrap();
        let before = cached.search("offerta", 10, 0.8).await.unwrap();

        cached
            .retriever()
            .add_documents(vec![Document::new("Offerta economica aggiornata")])
            .await
            .unwrap();
        let after = cached.search("offerta", 10, 0.8).await.unwrap();

        assert_eq!(before.len() + 1, after.len());
        assert_eq!(cached.cache().stats().hits, 0);
    }

    #[tokio::test]
    async fn test_deletion_invalidates_results() {
        let store: Arc<dyn VectorStore> = Arc::new(
            SqliteVectorStore::in_memory("test", Arc::new(HashEmbedding::new(32)))
                .await
                .unwrap(),
        );
        let retriever = Arc::new(HybridRetriever::new(store, RetrieverConfig::default()));
        let cache = Arc::new(CacheManager::new(Arc::new(MemoryCache::new())));
        let cached = CachedRetriever::new(retriever, cache);

        let ids = cached.retriever().add_documents(docs()).await.unwrap();
        let before = cached.search("listino prezzi", 10, 0.8).await.unwrap();
        assert_eq!(before.len(), 3);

        cached.retriever().delete(&ids[..1]).await.unwrap();
        let after = cached.search("listino prezzi", 10, 0.8).await.unwrap();
        assert_eq!(after.len(), 2);
        assert!(after.iter().all(|d| !d.content.starts_with("Listino")));
        assert_eq!(cached.cache().stats().hits, 0);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cached = setup();
        let err = cached.search("listino", 2, 0.8).await.unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Retrieval(RetrievalError::NotInitialized(_))
        ));
        assert_eq!(cached.cache().stats().sets, 0);
    }

    #[test]
    fn test_ttl_from_config() {
        let cached = setup();
        assert_eq!(cached.ttl, Some(Duration::from_secs(3600)));
        assert_eq!(cached.prefix, "retrieval");
        let cached = cached.with_ttl(None);
        assert!(cached.ttl.is_none());
    }
}
