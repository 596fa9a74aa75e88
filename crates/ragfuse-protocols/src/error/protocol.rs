//! Top-level protocol error type.

use thiserror::Error;

use super::{CacheError, RetrievalError};

/// Top-level protocol error type.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Validation error: {0}")]
    Validation(String),
}
