//! Retriever and vector store configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hybrid retriever configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// Candidates fetched from each index, as a multiple of `k`.
    #[serde(default = "default_over_fetch")]
    pub over_fetch: usize,

    /// Characters of content used as the deduplication key.
    #[serde(default = "default_dedup_prefix_chars")]
    pub dedup_prefix_chars: usize,

    /// Result count when the caller does not pass one.
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Semantic weight when the caller does not pass one (lexical gets 1 - alpha).
    #[serde(default = "default_alpha")]
    pub default_alpha: f32,

    /// Ranked candidates written to the debug log per query.
    #[serde(default = "default_debug_results_limit")]
    pub debug_results_limit: usize,

    /// TTL for cached search results; `None` caches without expiry.
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: Option<u64>,

    /// Prefix mixed into cached search keys.
    #[serde(default = "default_cache_key_prefix")]
    pub cache_key_prefix: String,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            over_fetch: default_over_fetch(),
            dedup_prefix_chars: default_dedup_prefix_chars(),
            default_k: default_k(),
            default_alpha: default_alpha(),
            debug_results_limit: default_debug_results_limit(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
            cache_key_prefix: default_cache_key_prefix(),
        }
    }
}

fn default_over_fetch() -> usize {
    4
}

fn default_dedup_prefix_chars() -> usize {
    100
}

fn default_k() -> usize {
    5
}

fn default_alpha() -> f32 {
    0.8
}

fn default_debug_results_limit() -> usize {
    10
}

fn default_cache_ttl_seconds() -> Option<u64> {
    Some(3600)
}

fn default_cache_key_prefix() -> String {
    "retrieval".to_string()
}

/// Vector store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Backend type ("flat" or "sqlite").
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// Index location: a directory for "flat", a database file for "sqlite".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Dimension of the built-in hashing embedder.
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: None,
            embedding_dimension: default_embedding_dimension(),
        }
    }
}

fn default_store_backend() -> String {
    "flat".to_string()
}

fn default_embedding_dimension() -> usize {
    128
}
