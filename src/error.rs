//! Engine error type.

use ragfuse_config::ConfigError;
use ragfuse_protocols::{CacheError, ProtocolError, RetrievalError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("No vector store path configured for {0}")]
    MissingStorePath(String),
}
