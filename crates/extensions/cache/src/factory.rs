//! Cache construction from configuration.

use std::sync::Arc;
use std::time::Duration;

use ragfuse_config::CacheConfig;
use ragfuse_protocols::{CacheBackend, CacheError};
use tracing::info;

use crate::disk::DiskCache;
use crate::manager::CacheManager;
use crate::memory::MemoryCache;
use crate::null::NullCache;
use crate::remote::RemoteCache;

/// Builds cache backends by name.
pub struct CacheFactory;

impl CacheFactory {
    /// Create the backend named by `config.backend`, or the null backend
    /// when caching is disabled.
    ///
    /// A memory backend with `sweep_interval_seconds` set gets a background
    /// sweeper, so this must run inside a tokio runtime.
    pub async fn create(config: &CacheConfig) -> Result<Arc<dyn CacheBackend>, CacheError> {
        if !config.enabled {
            info!("Caching disabled, using null cache");
            return Ok(Arc::new(NullCache));
        }

        let backend: Arc<dyn CacheBackend> = match config.backend.as_str() {
            "memory" => {
                let cache = Arc::new(MemoryCache::new());
                if let Some(secs) = config.sweep_interval_seconds.filter(|s| *s > 0) {
                    cache.spawn_sweeper(Duration::from_secs(secs));
                }
                cache
            }
            "disk" => Arc::new(DiskCache::open(config.disk.path.clone()).await?),
            "remote" => {
                let url = config.remote.url.clone().ok_or_else(|| {
                    CacheError::BackendUnavailable("remote cache requires a url".to_string())
                })?;
                let timeout = Duration::from_secs(config.remote.timeout_seconds);
                Arc::new(RemoteCache::connect(url, config.remote.token.clone(), timeout).await?)
            }
            "null" => Arc::new(NullCache),
            other => {
                return Err(CacheError::BackendUnavailable(format!(
                    "unknown cache backend '{}'",
                    other
                )));
            }
        };

        info!("Created {} cache backend", backend.id());
        Ok(backend)
    }

    /// Create a manager over the configured backend with its default TTL.
    pub async fn manager(config: &CacheConfig) -> Result<CacheManager, CacheError> {
        let backend = Self::create(config).await?;
        let ttl = config.ttl_seconds.map(Duration::from_secs);
        Ok(CacheManager::new(backend).with_default_ttl(ttl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn config(backend: &str) -> CacheConfig {
        CacheConfig {
            backend: backend.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_disabled_uses_null() {
        let mut config = config("memory");
        config.enabled = false;
        let backend = CacheFactory::create(&config).await.unwrap();
        assert_eq!(backend.id(), "null");
    }

    #[tokio::test]
    async fn test_memory_with_sweeper() {
        let mut config = config("memory");
        config.sweep_interval_seconds = Some(60);
        let backend = CacheFactory::create(&config).await.unwrap();
        assert_eq!(backend.id(), "memory");
    }

    #[tokio::test]
    async fn test_disk_backend() {
        let dir = TempDir::new().unwrap();
        let mut config = config("disk");
        config.disk.path = dir.path().join("cache");
        let backend = CacheFactory::create(&config).await.unwrap();
        backend.set("k", json!(1), None).await.unwrap();
        assert!(dir.path().join("cache").join("index.json").exists());
    }

    #[tokio::test]
    async fn test_remote_without_url() {
        let result = CacheFactory::create(&config("remote")).await;
        assert!(matches!(result, Err(CacheError::BackendUnavailable(_))));
    }

    #[tokio::test]
    async fn test_unknown_backend() {
        let result = CacheFactory::create(&config("memcached")).await;
        assert!(matches!(result, Err(CacheError::BackendUnavailable(_))));
    }

    #[tokio::test]
    async fn test_manager_default_ttl() {
        let mut config = config("memory");
        config.ttl_seconds = Some(30);
        let manager = CacheFactory::manager(&config).await.unwrap();
        assert_eq!(manager.backend_id(), "memory");
    }
}
