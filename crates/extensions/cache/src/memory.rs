//! In-process cache backend.

use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use ragfuse_protocols::{CacheBackend, CacheEntry, CacheError};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

/// Concurrent in-memory cache.
///
/// Expired entries are dropped lazily on access; [`MemoryCache::cleanup_expired`]
/// and the optional sweeper only reclaim memory earlier.
pub struct MemoryCache {
    id: String,
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_id("memory")
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entries: DashMap::new(),
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every expired entry; returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.is_expired())
            .map(|e| e.key().clone())
            .collect();

        let removed = expired
            .iter()
            .filter(|key| self.entries.remove_if(*key, |_, e| e.is_expired()).is_some())
            .count();

        if removed > 0 {
            debug!("Removed {} expired entries from '{}'", removed, self.id);
        }
        removed
    }

    /// Run [`cleanup_expired`](Self::cleanup_expired) every `interval` until
    /// the cache is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match cache.upgrade() {
                    Some(cache) => {
                        cache.cleanup_expired();
                    }
                    None => break,
                }
            }
        })
    }

    fn live_value(&self, key: &str) -> Option<Value> {
        match self.entries.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
            Some(_) => {}
        }
        self.entries.remove_if(key, |_, e| e.is_expired());
        None
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    fn id(&self) -> &str {
        &self.id
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(self.live_value(key))
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.entries
            .insert(key.to_string(), CacheEntry::new(key, value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.clear();
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.live_value(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new();
        cache.set("k", json!({"a": 1}), None).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(json!({"a": 1})));
        assert!(cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_key() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("nope").await.unwrap(), None);
        assert!(!cache.exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_last_set_wins() {
        let cache = MemoryCache::new();
        cache.set("k", json!(1), None).await.unwrap();
        cache.set("k", json!(2), None).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed_on_get() {
        let cache = MemoryCache::new();
        cache
            .set("short", json!("v"), Some(Duration::from_millis(20)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.get("short").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let cache = MemoryCache::new();
        cache.set("a", json!(1), None).await.unwrap();
        cache.set("b", json!(2), None).await.unwrap();
        cache.delete("a").await.unwrap();
        cache.delete("missing").await.unwrap();
        assert!(!cache.exists("a").await.unwrap());
        cache.clear().await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let cache = MemoryCache::new();
        cache.set("keep", json!(1), None).await.unwrap();
        cache
            .set("drop", json!(2), Some(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_sweeper_reclaims_and_stops() {
        let cache = Arc::new(MemoryCache::new());
        cache
            .set("drop", json!(2), Some(Duration::from_millis(10)))
            .await
            .unwrap();
        let handle = cache.spawn_sweeper(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(cache.is_empty());

        drop(cache);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
