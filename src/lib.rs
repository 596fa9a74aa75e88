//! # ragfuse
//!
//! Hybrid document retrieval. Documents are indexed twice, in a vector store
//! for semantic search and in a BM25 index for lexical search; queries run
//! against both, the scores are fused and adjusted by heuristic boosts, and
//! results are cached.
//!
//! [`RetrievalEngine`] wires the pieces from a [`Config`]:
//!
//! ```no_run
//! # async fn run() -> Result<(), ragfuse::EngineError> {
//! use ragfuse::{Config, RetrievalEngine};
//!
//! let engine = RetrievalEngine::with_default_embedder(Config::default()).await?;
//! let results = engine.search("informazioni generali su Acme", None, None).await?;
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;

pub use engine::RetrievalEngine;
pub use error::EngineError;

pub use ragfuse_cache::{CacheManager, CacheStatsSnapshot};
pub use ragfuse_config::{Config, ConfigLoader};
pub use ragfuse_hybrid::{CachedRetriever, HybridRetriever, ScoredCandidate};
pub use ragfuse_protocols::{Document, DocumentMetadata};
pub use ragfuse_vector::{EmbeddingProvider, HashEmbedding};
