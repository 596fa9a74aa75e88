//! # ragfuse Protocols
//!
//! Core type and trait definitions shared by every ragfuse crate.
//! Contains only interface definitions and plain data - no backends.
//!
//! ## Core Traits
//!
//! - [`VectorStore`] - Trait for nearest-neighbor index backends
//! - [`CacheBackend`] - Trait for key-value cache storage backends
//!
//! ## Core Types
//!
//! - [`Document`] - Unit of retrieval: text content plus typed metadata
//! - [`CacheEntry`] - A stored cache value with its expiration

pub mod cache;
pub mod document;
pub mod error;
pub mod vector_store;

pub use cache::{CacheBackend, CacheEntry};
pub use document::{Document, DocumentMetadata, MetadataFilter};
pub use error::{CacheError, ProtocolError, RetrievalError};
pub use vector_store::{DistanceMetric, Persistence, StoreCapabilities, VectorStore};
