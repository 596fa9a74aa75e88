//! Vector stores for ragfuse.
//!
//! Two backends implement [`VectorStore`](ragfuse_protocols::VectorStore):
//!
//! - [`FlatVectorStore`]: exact in-memory search, squared Euclidean distance,
//!   persisted on demand as `index.json`.
//! - [`SqliteVectorStore`]: SQLite-backed, cosine distance, durable on write.
//!
//! [`VectorStoreManager`] adds metadata filtering and a keyword-blended
//! search on top of any backend.

mod embedding;
mod factory;
mod flat;
mod index;
mod manager;
mod sqlite;

pub use embedding::{Embedding, EmbeddingError, EmbeddingProvider, HashEmbedding};
pub use factory::VectorStoreFactory;
pub use flat::FlatVectorStore;
pub use index::{FlatIndex, IndexedDocument};
pub use manager::{DEFAULT_KEYWORD_WEIGHT, VectorStoreManager};
pub use sqlite::SqliteVectorStore;
