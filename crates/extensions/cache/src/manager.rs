//! Typed cache access with statistics and memoization.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ragfuse_protocols::{CacheBackend, CacheError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
}

/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub total_requests: u64,
    pub hit_rate: f64,
}

/// Front end over a cache backend.
///
/// Lookups never fail: backend errors and undecodable values are logged and
/// counted as misses. Writes report their errors to the caller.
pub struct CacheManager {
    backend: Arc<dyn CacheBackend>,
    default_ttl: Option<Duration>,
    stats: CacheStats,
}

impl CacheManager {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            default_ttl: None,
            stats: CacheStats::default(),
        }
    }

    /// TTL applied by [`set`](Self::set) when the caller passes none.
    pub fn with_default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    pub fn backend_id(&self) -> &str {
        self.backend.id()
    }

    /// Fetch and decode a value. Each call counts exactly one hit or miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let decoded = match self.backend.get(key).await {
            Ok(Some(value)) => match serde_json::from_value::<T>(value) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!("Undecodable cache value for {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Cache get failed for {}: {}", key, e);
                None
            }
        };

        if decoded.is_some() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Cache hit: {}", key);
        } else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            debug!("Cache miss: {}", key);
        }
        decoded
    }

    /// Encode and store a value. `ttl = None` falls back to the default TTL.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let value = serde_json::to_value(value)?;
        self.backend.set(key, value, ttl.or(self.default_ttl)).await?;
        self.stats.sets.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.backend.delete(key).await?;
        self.stats.deletes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), CacheError> {
        self.backend.clear().await
    }

    /// Whether a live value exists. Backend errors read as absent.
    pub async fn exists(&self, key: &str) -> bool {
        self.backend.exists(key).await.unwrap_or_else(|e| {
            warn!("Cache exists failed for {}: {}", key, e);
            false
        })
    }

    /// Return the cached value for `key`, or run `compute` and cache its
    /// successful result. A failed store is logged, never returned.
    pub async fn memoize<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get::<T>(key).await {
            return Ok(cached);
        }

        let value = compute().await?;
        if let Err(e) = self.set(key, &value, ttl).await {
            warn!("Failed to cache result for {}: {}", key, e);
        }
        Ok(value)
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        let hits = self.stats.hits.load(Ordering::Relaxed);
        let misses = self.stats.misses.load(Ordering::Relaxed);
        let total_requests = hits + misses;
        let hit_rate = if total_requests == 0 {
            0.0
        } else {
            hits as f64 / total_requests as f64
        };

        CacheStatsSnapshot {
            hits,
            misses,
            sets: self.stats.sets.load(Ordering::Relaxed),
            deletes: self.stats.deletes.load(Ordering::Relaxed),
            total_requests,
            hit_rate,
        }
    }

    pub fn reset_stats(&self) {
        self.stats.hits.store(0, Ordering::Relaxed);
        self.stats.misses.store(0, Ordering::Relaxed);
        self.stats.sets.store(0, Ordering::Relaxed);
        self.stats.deletes.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
