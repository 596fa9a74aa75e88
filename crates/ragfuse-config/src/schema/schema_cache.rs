//! Cache configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::default_true;

/// Result cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// When false, the null backend is used and nothing is stored.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Backend type ("memory", "disk", "remote" or "null").
    #[serde(default = "default_cache_backend")]
    pub backend: String,

    /// Default TTL for entries written without an explicit one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<u64>,

    /// Interval of the in-memory expiry sweeper; disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep_interval_seconds: Option<u64>,

    #[serde(default)]
    pub disk: DiskCacheConfig,

    #[serde(default)]
    pub remote: RemoteCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: default_cache_backend(),
            ttl_seconds: None,
            sweep_interval_seconds: None,
            disk: DiskCacheConfig::default(),
            remote: RemoteCacheConfig::default(),
        }
    }
}

fn default_cache_backend() -> String {
    "memory".to_string()
}

/// Disk cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskCacheConfig {
    #[serde(default = "default_disk_path")]
    pub path: PathBuf,
}

impl Default for DiskCacheConfig {
    fn default() -> Self {
        Self {
            path: default_disk_path(),
        }
    }
}

fn default_disk_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("ragfuse")
        .join("cache")
}

/// Remote (Redis REST) cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCacheConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Bearer token, usually `${VAR}`-substituted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default = "default_remote_timeout")]
    pub timeout_seconds: u64,
}

impl Default for RemoteCacheConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout_seconds: default_remote_timeout(),
        }
    }
}

fn default_remote_timeout() -> u64 {
    5
}
