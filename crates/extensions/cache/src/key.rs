//! Deterministic cache keys.

use ragfuse_protocols::CacheError;
use serde::Serialize;

/// Hex BLAKE3 digest of `prefix:function:json(args)`.
///
/// Arguments are serialized with serde, so equal arguments always produce the
/// same key regardless of process or platform.
pub fn cache_key<A: Serialize + ?Sized>(
    prefix: &str,
    function: &str,
    args: &A,
) -> Result<String, CacheError> {
    let args = serde_json::to_string(args)?;
    let material = format!("{}:{}:{}", prefix, function, args);
    Ok(blake3::hash(material.as_bytes()).to_hex().to_string())
}
