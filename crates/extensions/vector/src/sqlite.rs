//! SQLite-backed vector store.
//!
//! Documents and their embeddings live in a single `documents` table, so
//! every write is durable as soon as it returns. Search is exact: all
//! embeddings are scanned and ranked by cosine distance.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use ragfuse_protocols::{
    DistanceMetric, Document, DocumentMetadata, Persistence, RetrievalError, StoreCapabilities,
    VectorStore,
};
use rusqlite::params;
use tokio_rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::embedding::{Embedding, EmbeddingProvider};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    content TEXT NOT NULL,
    metadata TEXT NOT NULL DEFAULT '{}',
    embedding BLOB NOT NULL
);
"#;

/// A row as stored, before decoding.
struct RawRow {
    id: String,
    content: String,
    metadata: String,
    embedding: Vec<u8>,
}

impl RawRow {
    fn decode_document(&self) -> Result<Document, String> {
        let metadata: DocumentMetadata = serde_json::from_str(&self.metadata)
            .map_err(|e| format!("metadata: {}", e))?;
        Ok(Document {
            id: Some(self.id.clone()),
            content: self.content.clone(),
            metadata,
        })
    }

    fn decode_embedding(&self) -> Result<Embedding, String> {
        decode_vector(&self.embedding).map(Embedding::new)
    }
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_vector(bytes: &[u8]) -> Result<Vec<f32>, String> {
    if bytes.len() % 4 != 0 {
        return Err(format!("embedding blob of {} bytes", bytes.len()));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn storage_error(err: tokio_rusqlite::Error) -> RetrievalError {
    RetrievalError::Storage(err.to_string())
}

/// Persistent vector store on SQLite, ranked by cosine distance.
pub struct SqliteVectorStore {
    id: String,
    embedder: Arc<dyn EmbeddingProvider>,
    conn: Connection,
}

impl SqliteVectorStore {
    /// Open (or create) a database file.
    pub async fn open(
        id: impl Into<String>,
        path: impl AsRef<Path>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, RetrievalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let conn = Connection::open(path.clone()).await.map_err(storage_error)?;
        let store = Self::init(id.into(), conn, embedder).await?;
        info!("Opened sqlite vector store '{}' at {}", store.id, path.display());
        Ok(store)
    }

    /// Create a store backed by an in-memory database.
    pub async fn in_memory(
        id: impl Into<String>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, RetrievalError> {
        let conn = Connection::open_in_memory().await.map_err(storage_error)?;
        Self::init(id.into(), conn, embedder).await
    }

    async fn init(
        id: String,
        conn: Connection,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, RetrievalError> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(storage_error)?;

        Ok(Self { id, embedder, conn })
    }

    async fn raw_rows(&self) -> Result<Vec<RawRow>, RetrievalError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, content, metadata, embedding FROM documents ORDER BY seq",
                )?;
                let mapped = stmt.query_map([], |row| {
                    Ok(RawRow {
                        id: row.get(0)?,
                        content: row.get(1)?,
                        metadata: row.get(2)?,
                        embedding: row.get(3)?,
                    })
                })?;
                let mut rows = Vec::new();
                for row in mapped {
                    match row {
                        Ok(row) => rows.push(row),
                        Err(e) => warn!("Skipping unreadable row: {}", e),
                    }
                }
                Ok(rows)
            })
            .await
            .map_err(storage_error)
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            supports_delete: true,
            persistence: Persistence::Automatic,
            distance: DistanceMetric::Cosine,
        }
    }

    async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>, RetrievalError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != documents.len() {
            return Err(RetrievalError::Embedding(format!(
                "expected {} embeddings, got {}",
                documents.len(),
                embeddings.len()
            )));
        }

        let mut rows = Vec::with_capacity(documents.len());
        for (document, embedding) in documents.into_iter().zip(embeddings) {
            let id = document
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let metadata = serde_json::to_string(&document.metadata)?;
            rows.push((id, document.content, metadata, encode_vector(&embedding.vector)));
        }
        let ids: Vec<String> = rows.iter().map(|r| r.0.clone()).collect();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for (id, content, metadata, embedding) in rows {
                    tx.execute(
                        "INSERT INTO documents (id, content, metadata, embedding)
                         VALUES (?1, ?2, ?3, ?4)",
                        params![id, content, metadata, embedding],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(storage_error)?;

        debug!("Added {} documents to sqlite store '{}'", ids.len(), self.id);
        Ok(ids)
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>, RetrievalError> {
        let query_embedding = self.embedder.embed(query).await?;
        let rows = self.raw_rows().await?;

        let mut scored = Vec::with_capacity(rows.len());
        for row in rows {
            let decoded = row
                .decode_embedding()
                .and_then(|e| row.decode_document().map(|d| (d, e)));
            let (document, embedding) = match decoded {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("Skipping corrupt row '{}': {}", row.id, e);
                    continue;
                }
            };
            if embedding.dimension != query_embedding.dimension {
                warn!(
                    "Skipping row '{}' with dimension {} (expected {})",
                    row.id, embedding.dimension, query_embedding.dimension
                );
                continue;
            }
            let distance = query_embedding.cosine_distance(&embedding);
            scored.push((document, distance));
        }

        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        Ok(scored)
    }

    async fn documents(&self) -> Result<Vec<Document>, RetrievalError> {
        let rows = self.raw_rows().await?;
        Ok(rows
            .iter()
            .filter_map(|row| match row.decode_document() {
                Ok(document) => Some(document),
                Err(e) => {
                    warn!("Skipping corrupt row '{}': {}", row.id, e);
                    None
                }
            })
            .collect())
    }

    async fn len(&self) -> Result<usize, RetrievalError> {
        self.conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(storage_error)
    }

    async fn save(&self, path: &Path) -> Result<(), RetrievalError> {
        info!(
            "Sqlite store '{}' persists on write; ignoring save to {}",
            self.id,
            path.display()
        );
        Ok(())
    }

    async fn load(&self, path: &Path) -> Result<(), RetrievalError> {
        info!(
            "Sqlite store '{}' persists on write; ignoring load from {}",
            self.id,
            path.display()
        );
        Ok(())
    }

    async fn delete(&self, ids: &[String]) -> Result<(), RetrievalError> {
        let ids = ids.to_vec();
        let removed = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut removed = 0usize;
                for id in &ids {
                    removed += tx.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
                }
                tx.commit()?;
                Ok(removed)
            })
            .await
            .map_err(storage_error)?;

        debug!("Deleted {} documents from sqlite store '{}'", removed, self.id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
