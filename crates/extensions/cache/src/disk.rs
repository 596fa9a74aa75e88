//! File-backed cache backend.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ragfuse_protocols::{CacheBackend, CacheEntry, CacheError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const INDEX_FILE: &str = "index.json";

/// Index record describing one entry file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexRecord {
    file: String,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

/// Cache persisted as one JSON file per entry.
///
/// Files are named by the BLAKE3 hash of the key. `index.json` maps keys to
/// files and expiry times and is rewritten on every mutation. A corrupt
/// entry file reads as a miss; a corrupt index starts empty.
pub struct DiskCache {
    id: String,
    dir: PathBuf,
    index: Mutex<BTreeMap<String, IndexRecord>>,
}

impl DiskCache {
    /// Open a cache directory, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        let index = Self::read_index(&dir).await;
        info!("Opened disk cache at {} ({} entries)", dir.display(), index.len());

        Ok(Self {
            id: "disk".to_string(),
            dir,
            index: Mutex::new(index),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of indexed entries.
    pub async fn len(&self) -> usize {
        self.index.lock().await.len()
    }

    fn file_name(key: &str) -> String {
        format!("{}.json", blake3::hash(key.as_bytes()).to_hex())
    }

    async fn read_index(dir: &Path) -> BTreeMap<String, IndexRecord> {
        let path = dir.join(INDEX_FILE);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!("Cannot read cache index {}: {}", path.display(), e);
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Corrupt cache index {}, starting empty: {}", path.display(), e);
            BTreeMap::new()
        })
    }

    async fn write_index(&self, index: &BTreeMap<String, IndexRecord>) -> Result<(), CacheError> {
        let raw = serde_json::to_vec(index)?;
        tokio::fs::write(self.dir.join(INDEX_FILE), raw).await?;
        Ok(())
    }

    async fn remove_file(&self, file: &str) -> Result<(), CacheError> {
        match tokio::fs::remove_file(self.dir.join(file)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_entry(&self, key: &str) -> Option<CacheEntry> {
        let path = self.dir.join(Self::file_name(key));
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Cannot read cache entry {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) if entry.key == key => Some(entry),
            Ok(_) => {
                warn!("Cache entry {} belongs to another key", path.display());
                None
            }
            Err(e) => {
                warn!("Corrupt cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Live value for `key`, removing the entry when it has expired.
    async fn live_value(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let Some(entry) = self.read_entry(key).await else {
            return Ok(None);
        };
        if !entry.is_expired() {
            return Ok(Some(entry.value));
        }

        debug!("Disk cache entry expired: {}", key);
        self.delete(key).await?;
        Ok(None)
    }
}

#[async_trait]
impl CacheBackend for DiskCache {
    fn id(&self) -> &str {
        &self.id
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        self.live_value(key).await
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), CacheError> {
        let entry = CacheEntry::new(key, value, ttl);
        let file = Self::file_name(key);
        let raw = serde_json::to_vec(&entry)?;

        let mut index = self.index.lock().await;
        tokio::fs::write(self.dir.join(&file), raw).await?;
        index.insert(
            key.to_string(),
            IndexRecord {
                file,
                created_at: entry.created_at,
                expires_at: entry.expires_at,
            },
        );
        self.write_index(&index).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut index = self.index.lock().await;
        self.remove_file(&Self::file_name(key)).await?;
        if index.remove(key).is_some() {
            self.write_index(&index).await?;
        }
        Ok(())
    }

    /// Removes every entry file in the directory, indexed or not, so entries
    /// orphaned by a lost index cannot be served afterwards.
    async fn clear(&self) -> Result<(), CacheError> {
        let mut index = self.index.lock().await;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut removed = 0usize;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name != INDEX_FILE && name.ends_with(".json") {
                self.remove_file(name).await?;
                removed += 1;
            }
        }
        debug!("Removed {} cache entry files", removed);
        index.clear();
        self.write_index(&index).await?;
        info!("Cleared disk cache at {}", self.dir.display());
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.live_value(key).await?.is_some())
    }
}

#[cfg(test)]
#[path = "disk_tests.rs"]
mod tests;
