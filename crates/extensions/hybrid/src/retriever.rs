//! Hybrid retriever implementation.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info};

use ragfuse_config::{BoostConfig, Config, DateConfig, RetrieverConfig};
use ragfuse_lexical::{Bm25Index, Bm25Params};
use ragfuse_protocols::{Document, RetrievalError, VectorStore};

use crate::boost::BoostStack;
use crate::date::{Clock, DateDetector, SystemClock};
use crate::fusion::{CandidatePool, ScoredCandidate};

/// Documents plus the lexical index built over them.
struct Corpus {
    documents: Vec<Document>,
    lexical: Bm25Index,
}

/// Retriever fusing vector similarity with BM25 and heuristic boosts.
pub struct HybridRetriever {
    store: Arc<dyn VectorStore>,
    config: RetrieverConfig,
    bm25: Bm25Params,
    boosts: BoostStack,
    dates: DateDetector,
    clock: Arc<dyn Clock>,
    corpus: RwLock<Option<Arc<Corpus>>>,
    rebuild_lock: Mutex<()>,
    generation: AtomicU64,
}

impl HybridRetriever {
    /// Create a retriever with the default boost rules and date vocabulary.
    pub fn new(store: Arc<dyn VectorStore>, config: RetrieverConfig) -> Self {
        let dates = DateConfig::default();
        Self {
            store,
            config,
            bm25: Bm25Params::default(),
            boosts: BoostStack::from_config(&BoostConfig::default(), &dates),
            dates: DateDetector::new(&dates),
            clock: Arc::new(SystemClock),
            corpus: RwLock::new(None),
            rebuild_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Create a retriever wired from the full configuration.
    pub fn from_config(store: Arc<dyn VectorStore>, config: &Config) -> Self {
        Self::new(store, config.retriever.clone())
            .with_boost_stack(BoostStack::from_config(&config.boosts, &config.dates))
            .with_date_detector(DateDetector::new(&config.dates))
    }

    pub fn with_boost_stack(mut self, boosts: BoostStack) -> Self {
        self.boosts = boosts;
        self
    }

    pub fn with_date_detector(mut self, dates: DateDetector) -> Self {
        self.dates = dates;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_bm25_params(mut self, params: Bm25Params) -> Self {
        self.bm25 = params;
        self
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Incremented on every rebuild of the corpus.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Number of indexed documents, `None` before the first load.
    pub fn document_count(&self) -> Option<usize> {
        self.corpus.read().as_ref().map(|c| c.documents.len())
    }

    /// Pull every document from the vector store and build the lexical
    /// index. Returns the corpus size.
    pub async fn load_index(&self) -> Result<usize, RetrievalError> {
        let _guard = self.rebuild_lock.lock().await;
        self.rebuild().await
    }

    /// Insert documents into the vector store and rebuild the lexical index.
    pub async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>, RetrievalError> {
        let _guard = self.rebuild_lock.lock().await;
        let ids = if documents.is_empty() {
            Vec::new()
        } else {
            self.store.add_documents(documents).await?
        };
        self.rebuild().await?;
        Ok(ids)
    }

    /// Remove documents from the store and rebuild, so deleted documents stop
    /// showing up as lexical hits and cached results keyed on the old
    /// generation are never served again.
    pub async fn delete(&self, ids: &[String]) -> Result<(), RetrievalError> {
        let _guard = self.rebuild_lock.lock().await;
        if !ids.is_empty() {
            self.store.delete(ids).await?;
        }
        self.rebuild().await?;
        Ok(())
    }

    async fn rebuild(&self) -> Result<usize, RetrievalError> {
        let documents = if self.store.len().await? == 0 {
            Vec::new()
        } else {
            self.store.documents().await?
        };

        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let lexical = Bm25Index::with_params(&texts, self.bm25);
        let count = documents.len();

        *self.corpus.write() = Some(Arc::new(Corpus { documents, lexical }));
        self.generation.fetch_add(1, Ordering::SeqCst);

        info!("Built hybrid index over {} documents", count);
        Ok(count)
    }

    /// The `k` most relevant documents for `query`, best first.
    ///
    /// `alpha` weighs the semantic signal against the lexical one.
    pub async fn search(&self, query: &str, k: usize, alpha: f32) -> Result<Vec<Document>, RetrievalError> {
        let scored = self.search_scored(query, k, alpha).await?;
        Ok(scored.into_iter().map(|c| c.document).collect())
    }

    /// Like [`search`](Self::search), keeping the per-candidate scores.
    pub async fn search_scored(
        &self,
        query: &str,
        k: usize,
        alpha: f32,
    ) -> Result<Vec<ScoredCandidate>, RetrievalError> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(RetrievalError::InvalidArgument(format!(
                "alpha must be within [0, 1], got {}",
                alpha
            )));
        }

        let corpus = self
            .corpus
            .read()
            .clone()
            .ok_or_else(|| RetrievalError::NotInitialized("hybrid index not loaded".to_string()))?;

        if k == 0 || corpus.documents.is_empty() {
            return Ok(Vec::new());
        }

        let fetch = k.saturating_mul(self.config.over_fetch.max(1));

        let (semantic, lexical_scores) = tokio::join!(
            self.store.similarity_search_with_score(query, fetch),
            async { corpus.lexical.score(query) }
        );
        let semantic = semantic?;

        let today = self.clock.today();
        let date_query = self.dates.detect(query, today);
        let date_matches = self.dates.find_matches(&date_query, &corpus.documents);

        // Date matches first, then the best BM25 hits.
        let mut lexical_order = Vec::with_capacity(date_matches.len() + fetch);
        let mut seen = HashSet::new();
        for i in date_matches
            .iter()
            .copied()
            .chain(Bm25Index::top_k(&lexical_scores, fetch))
        {
            if seen.insert(i) {
                lexical_order.push(i);
            }
        }
        let date_matches: HashSet<usize> = date_matches.into_iter().collect();

        let lexical_max = lexical_order
            .iter()
            .map(|&i| lexical_scores[i])
            .fold(0.0f32, f32::max);

        let mut pool = CandidatePool::new(self.config.dedup_prefix_chars);
        for (document, distance) in semantic {
            pool.add_semantic(document, distance);
        }
        for &i in &lexical_order {
            pool.add_lexical(&corpus.documents[i], lexical_scores[i], date_matches.contains(&i));
        }

        let ctx = self.boosts.context(query, date_query, today);
        let mut candidates = pool.fuse(alpha, lexical_max);
        for candidate in &mut candidates {
            let factor = self.boosts.boost_factor(&ctx, &candidate.document);
            candidate.apply_boost(factor);
        }

        candidates.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        candidates.truncate(k);

        self.log_ranking(query, &candidates);
        Ok(candidates)
    }

    fn log_ranking(&self, query: &str, candidates: &[ScoredCandidate]) {
        debug!("Hybrid search for '{}' returned {} results", query, candidates.len());
        for (rank, c) in candidates.iter().take(self.config.debug_results_limit).enumerate() {
            debug!(
                "#{} {:?} semantic={:.4} lexical={:.4} boost={:.2} final={:.4}",
                rank + 1,
                c.document.metadata.filename.as_deref().unwrap_or("-"),
                c.semantic_score,
                c.lexical_score,
                c.boost_factor,
                c.final_score
            );
        }
    }
}

#[cfg(test)]
#[path = "retriever_tests.rs"]
mod tests;
