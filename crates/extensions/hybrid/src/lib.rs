//! Hybrid retrieval for ragfuse.
//!
//! [`HybridRetriever`] runs a semantic search against a vector store and a
//! BM25 search over the same corpus concurrently, merges the candidates,
//! normalizes and blends their scores, then applies a configurable stack of
//! heuristic boosts. [`CachedRetriever`] memoizes searches through a
//! [`CacheManager`](ragfuse_cache::CacheManager).

mod boost;
mod cached;
mod date;
mod fusion;
mod retriever;

pub use boost::{
    BoostRule, BoostStack, CombinedEntityFileBoost, CostRelevanceBoost, DateQueryBoost,
    EntityAliases, EntityMatchBoost, FileKeywordBoost, QueryContext, RecencyBoost,
    ShortDocumentBoost, SummaryDocumentBoost,
};
pub use cached::CachedRetriever;
pub use date::{Clock, DateDetector, DateQuery, FixedClock, JournalMatcher, SystemClock};
pub use fusion::{CandidatePool, ScoredCandidate};
pub use retriever::HybridRetriever;
