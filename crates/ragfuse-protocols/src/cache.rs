//! Cache backend protocol definitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::CacheError;

/// Core trait for cache storage backends.
///
/// Values are opaque JSON; typed access lives in the cache manager.
/// `ttl = None` means the entry never expires.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the backend ID.
    fn id(&self) -> &str;

    /// Fetch a live value. Expired entries are removed and reported as absent.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Store a value, replacing any previous one.
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Remove a value. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every value.
    async fn clear(&self) -> Result<(), CacheError>;

    /// Whether a live value exists. Expired entries are removed.
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;
}

/// A stored cache value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub value: Value,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Create an entry stamped with the current time.
    pub fn new(key: impl Into<String>, value: Value, ttl: Option<Duration>) -> Self {
        let created_at = Utc::now();
        Self {
            key: key.into(),
            value,
            created_at,
            expires_at: expiry_from(created_at, ttl),
        }
    }

    /// Whether the entry is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Absolute expiry for a TTL starting at `from`.
///
/// A missing or zero TTL never expires, as does one too large to represent.
pub fn expiry_from(from: DateTime<Utc>, ttl: Option<Duration>) -> Option<DateTime<Utc>> {
    let ttl = ttl.filter(|ttl| !ttl.is_zero())?;
    let delta = chrono::Duration::from_std(ttl).ok()?;
    from.checked_add_signed(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_without_ttl_never_expires() {
        let entry = CacheEntry::new("k", json!(1), None);
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired_at(Utc::now() + chrono::Duration::days(3650)));
    }

    #[test]
    fn test_zero_ttl_never_expires() {
        let entry = CacheEntry::new("k", json!(1), Some(Duration::ZERO));
        assert!(entry.expires_at.is_none());
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let entry = CacheEntry::new("k", json!("v"), Some(Duration::from_secs(1)));
        assert!(!entry.is_expired_at(entry.created_at));
        assert!(entry.is_expired_at(entry.created_at + chrono::Duration::seconds(2)));
    }

    #[test]
    fn test_expiry_is_strict() {
        let entry = CacheEntry::new("k", json!("v"), Some(Duration::from_secs(5)));
        let expires_at = entry.expires_at.unwrap();
        assert!(!entry.is_expired_at(expires_at));
    }

    #[test]
    fn test_huge_ttl_is_treated_as_no_expiry() {
        let expiry = expiry_from(Utc::now(), Some(Duration::from_secs(u64::MAX)));
        assert!(expiry.is_none());
    }

    #[test]
    fn test_entry_serialization() {
        let entry = CacheEntry::new("key", json!({"a": 1}), None);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("created_at"));
        assert!(!json.contains("expires_at"));
    }
}
