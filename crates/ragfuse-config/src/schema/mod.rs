//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_boost;
mod schema_cache;
mod schema_dates;
mod schema_retrieval;

pub use schema_boost::*;
pub use schema_cache::*;
pub use schema_dates::*;
pub use schema_retrieval::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub retriever: RetrieverConfig,

    #[serde(default)]
    pub boosts: BoostConfig,

    #[serde(default)]
    pub dates: DateConfig,

    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
