//! Remote cache backend speaking the Redis REST command protocol.
//!
//! Each command is a JSON array POSTed to the base URL, e.g.
//! `["SET", "key", "value", "EX", 60]`. The server replies with
//! `{"result": ...}` or `{"error": "..."}`. Values are stored as their JSON
//! text; expiry is enforced server-side.

use std::time::Duration;

use async_trait::async_trait;
use ragfuse_protocols::{CacheBackend, CacheError};
use reqwest::{Client, header};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Redis REST client used as a cache backend.
pub struct RemoteCache {
    id: String,
    client: Client,
    url: String,
    token: Option<String>,
}

impl RemoteCache {
    /// Connect and verify the server answers `PING`.
    pub async fn connect(
        url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CacheError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CacheError::BackendUnavailable(e.to_string()))?;

        let cache = Self {
            id: "remote".to_string(),
            client,
            url: url.into(),
            token,
        };

        match cache.command(json!(["PING"])).await {
            Ok(Value::String(reply)) if reply.eq_ignore_ascii_case("PONG") => {}
            Ok(other) => {
                return Err(CacheError::BackendUnavailable(format!(
                    "unexpected PING reply: {}",
                    other
                )));
            }
            Err(e) => return Err(CacheError::BackendUnavailable(e.to_string())),
        }

        info!("Connected to remote cache at {}", cache.url);
        Ok(cache)
    }

    async fn command(&self, command: Value) -> Result<Value, CacheError> {
        let mut request = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .json(&command)
            .send()
            .await
            .map_err(|e| CacheError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CacheError::Request(e.to_string()))?;

        let parsed: Option<CommandResponse> = serde_json::from_str(&body).ok();
        if let Some(error) = parsed.as_ref().and_then(|r| r.error.clone()) {
            return Err(CacheError::Backend(error));
        }
        if !status.is_success() {
            return Err(CacheError::Request(format!("HTTP {}: {}", status, body)));
        }

        let parsed = parsed.ok_or_else(|| {
            CacheError::Serialization(format!("unreadable response: {}", body))
        })?;
        Ok(parsed.result.unwrap_or(Value::Null))
    }

    /// Whole seconds for `EX`, rounding sub-second TTLs up.
    fn ttl_seconds(ttl: Duration) -> u64 {
        let secs = ttl.as_secs();
        if ttl.subsec_nanos() > 0 { secs + 1 } else { secs }
    }
}

#[async_trait]
impl CacheBackend for RemoteCache {
    fn id(&self) -> &str {
        &self.id
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        match self.command(json!(["GET", key])).await? {
            Value::Null => Ok(None),
            Value::String(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            other => Err(CacheError::Serialization(format!(
                "unexpected GET reply: {}",
                other
            ))),
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), CacheError> {
        let raw = serde_json::to_string(&value)?;
        let command = match ttl.filter(|t| !t.is_zero()) {
            Some(ttl) => json!(["SET", key, raw, "EX", Self::ttl_seconds(ttl)]),
            None => json!(["SET", key, raw]),
        };
        self.command(command).await?;
        debug!("Remote cache set: {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.command(json!(["DEL", key])).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.command(json!(["FLUSHDB"])).await?;
        info!("Cleared remote cache at {}", self.url);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let reply = self.command(json!(["EXISTS", key])).await?;
        Ok(reply.as_u64().unwrap_or(0) > 0)
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
