//! Retrieval and index errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Index not initialized: {0}")]
    NotInitialized(String),

    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<serde_json::Error> for RetrievalError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for RetrievalError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
