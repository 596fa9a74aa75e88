//! Higher-level search helpers over any vector store.

use std::collections::HashSet;
use std::sync::Arc;

use ragfuse_protocols::{Document, MetadataFilter, RetrievalError, VectorStore};
use tracing::debug;

/// Keyword weight used by [`VectorStoreManager::hybrid_search`] callers that
/// have no preference.
pub const DEFAULT_KEYWORD_WEIGHT: f32 = 0.3;

const FILTER_OVER_FETCH: usize = 3;
const HYBRID_OVER_FETCH: usize = 2;

/// Wraps a vector store with filtering and keyword blending.
pub struct VectorStoreManager {
    store: Arc<dyn VectorStore>,
}

impl VectorStoreManager {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>, RetrievalError> {
        self.store.add_documents(documents).await
    }

    /// Semantic search restricted to documents whose metadata matches every
    /// filter pair exactly.
    ///
    /// Over-fetches `3 * k` before filtering, so fewer than `k` results may
    /// come back when matches are rare.
    pub async fn search_with_metadata_filter(
        &self,
        query: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<Document>, RetrievalError> {
        let Some(filter) = filter.filter(|f| !f.is_empty()) else {
            return self.store.similarity_search(query, k).await;
        };

        let candidates = self
            .store
            .similarity_search(query, k.saturating_mul(FILTER_OVER_FETCH))
            .await?;
        let fetched = candidates.len();
        let results: Vec<Document> = candidates
            .into_iter()
            .filter(|doc| doc.metadata.matches(filter))
            .take(k)
            .collect();

        debug!("Metadata filter kept {} of {} candidates", results.len(), fetched);
        Ok(results)
    }

    /// Semantic search blended with plain word overlap.
    ///
    /// Score is `(1 - w) * 1 / (1 + distance) + w * overlap`, where overlap is
    /// the fraction of query words present in the document.
    pub async fn hybrid_search(
        &self,
        query: &str,
        k: usize,
        keyword_weight: f32,
    ) -> Result<Vec<(Document, f32)>, RetrievalError> {
        if !(0.0..=1.0).contains(&keyword_weight) {
            return Err(RetrievalError::InvalidArgument(format!(
                "keyword_weight must be within [0, 1], got {}",
                keyword_weight
            )));
        }

        let candidates = self
            .store
            .similarity_search_with_score(query, k.saturating_mul(HYBRID_OVER_FETCH))
            .await?;

        let query_words = word_set(query);
        let mut scored: Vec<(Document, f32)> = candidates
            .into_iter()
            .map(|(doc, distance)| {
                let semantic = 1.0 / (1.0 + distance);
                let keyword = keyword_overlap(&query_words, &doc.content);
                let score = (1.0 - keyword_weight) * semantic + keyword_weight * keyword;
                (doc, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        Ok(scored)
    }
}

fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

fn keyword_overlap(query_words: &HashSet<String>, content: &str) -> f32 {
    if query_words.is_empty() {
        return 0.0;
    }
    let doc_words = word_set(content);
    let shared = query_words.intersection(&doc_words).count();
    shared as f32 / query_words.len() as f32
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
