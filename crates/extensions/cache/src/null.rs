//! Cache backend that stores nothing.

use std::time::Duration;

use async_trait::async_trait;
use ragfuse_protocols::{CacheBackend, CacheError};
use serde_json::Value;

/// Backend used when caching is disabled. Every lookup misses.
#[derive(Debug, Default)]
pub struct NullCache;

#[async_trait]
impl CacheBackend for NullCache {
    fn id(&self) -> &str {
        "null"
    }

    async fn get(&self, _key: &str) -> Result<Option<Value>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Value, _ttl: Option<Duration>) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        Ok(())
    }

    async fn exists(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }
}
