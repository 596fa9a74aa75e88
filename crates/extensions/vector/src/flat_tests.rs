use super::*;
use crate::embedding::{EmbeddingError, HashEmbedding};
use ragfuse_protocols::DocumentMetadata;
use tempfile::TempDir;

fn store() -> FlatVectorStore {
    FlatVectorStore::new("test", Arc::new(HashEmbedding::new(64)))
}

fn sample_documents() -> Vec<Document> {
    vec![
        Document::new("preventivo sito web per Acme").with_metadata(
            DocumentMetadata::default()
                .with_client("Acme")
                .with_filename("preventivo.md"),
        ),
        Document::new("riunione di progetto con Beta"),
        Document::new("ricetta della pasta al forno"),
    ]
}

#[tokio::test]
async fn test_capabilities() {
    let caps = store().capabilities();
    assert!(!caps.supports_delete);
    assert_eq!(caps.persistence, Persistence::Explicit);
    assert_eq!(caps.distance, DistanceMetric::SquaredEuclidean);
}

#[tokio::test]
async fn test_search_before_init_fails() {
    let store = store();
    let result = store.similarity_search("anything", 3).await;
    assert!(matches!(result, Err(RetrievalError::NotInitialized(_))));
    assert!(matches!(store.documents().await, Err(RetrievalError::NotInitialized(_))));
    assert_eq!(store.len().await.unwrap(), 0);
}

#[tokio::test]
async fn test_add_assigns_ids_and_keeps_order() {
    let store = store();
    let ids = store
        .add_documents(vec![Document::new("a").with_id("fixed"), Document::new("b")])
        .await
        .unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[0], "fixed");
    assert!(uuid::Uuid::parse_str(&ids[1]).is_ok());

    let docs = store.documents().await.unwrap();
    assert_eq!(docs[0].content, "a");
    assert_eq!(docs[1].id.as_deref(), Some(ids[1].as_str()));
}

#[tokio::test]
async fn test_add_appends_to_existing_index() {
    let store = store();
    store.add_documents(vec![Document::new("primo")]).await.unwrap();
    store.add_documents(vec![Document::new("secondo")]).await.unwrap();
    assert_eq!(store.len().await.unwrap(), 2);
}

/// Embeds texts containing "lungo" with one extra component.
struct UnevenEmbedding(HashEmbedding);

#[async_trait]
impl EmbeddingProvider for UnevenEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut embedding = self.0.embed(text).await?;
        if text.contains("lungo") {
            let mut vector = embedding.vector;
            vector.push(0.0);
            embedding = Embedding::new(vector);
        }
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimension(&self) -> usize {
        self.0.dimension()
    }
}

#[tokio::test]
async fn test_mismatched_batch_is_rejected_whole() {
    let store = FlatVectorStore::new("test", Arc::new(UnevenEmbedding(HashEmbedding::new(16))));
    store.add_documents(vec![Document::new("primo")]).await.unwrap();

    let err = store
        .add_documents(vec![
            Document::new("secondo"),
            Document::new("testo lungo"),
            Document::new("terzo"),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::Embedding(_)));
    assert_eq!(store.len().await.unwrap(), 1);
}

#[tokio::test]
async fn test_mismatched_first_batch_leaves_store_uninitialized() {
    let store = FlatVectorStore::new("test", Arc::new(UnevenEmbedding(HashEmbedding::new(16))));
    let err = store
        .add_documents(vec![Document::new("breve"), Document::new("testo lungo")])
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::Embedding(_)));
    assert!(matches!(store.documents().await, Err(RetrievalError::NotInitialized(_))));
}

#[tokio::test]
async fn test_add_empty_batch_does_not_initialize() {
    let store = store();
    let ids = store.add_documents(Vec::new()).await.unwrap();
    assert!(ids.is_empty());
    assert!(!store.is_initialized());
}

#[tokio::test]
async fn test_similarity_search_ranks_closest_first() {
    let store = store();
    store.add_documents(sample_documents()).await.unwrap();

    let results = store
        .similarity_search_with_score("preventivo sito web per Acme", 3)
        .await
        .unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0.content, "preventivo sito web per Acme");
    assert!(results[0].1 < 1e-6);
    assert!(results.windows(2).all(|w| w[0].1 <= w[1].1));

    let docs = store.similarity_search("preventivo sito web per Acme", 1).await.unwrap();
    assert_eq!(docs.len(), 1);
}

#[tokio::test]
async fn test_delete_not_supported() {
    let store = store();
    store.add_documents(sample_documents()).await.unwrap();
    let result = store.delete(&["x".to_string()]).await;
    assert!(matches!(result, Err(RetrievalError::NotSupported(_))));
}

#[tokio::test]
async fn test_save_before_init_fails() {
    let dir = TempDir::new().unwrap();
    let result = store().save(dir.path()).await;
    assert!(matches!(result, Err(RetrievalError::NotInitialized(_))));
}

#[tokio::test]
async fn test_save_and_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let original = store();
    original.add_documents(sample_documents()).await.unwrap();
    original.save(dir.path()).await.unwrap();
    assert!(dir.path().join(INDEX_FILE).exists());

    let restored = store();
    restored.load(dir.path()).await.unwrap();
    assert_eq!(restored.documents().await.unwrap(), original.documents().await.unwrap());

    let results = restored.similarity_search("preventivo sito web per Acme", 1).await.unwrap();
    assert_eq!(results[0].metadata.client.as_deref(), Some("Acme"));
}

#[tokio::test]
async fn test_load_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let result = store().load(dir.path()).await;
    assert!(matches!(result, Err(RetrievalError::Storage(_))));
}

#[tokio::test]
async fn test_load_skips_corrupt_entries() {
    let dir = TempDir::new().unwrap();
    let good = vec![0.0f32; 64];
    let raw = serde_json::json!({
        "version": 1,
        "dimension": 64,
        "entries": [
            { "document": { "content": "buono" }, "vector": good },
            { "document": "not a document", "vector": [] },
            { "document": { "content": "corto" }, "vector": [1.0, 2.0] }
        ]
    });
    std::fs::write(dir.path().join(INDEX_FILE), raw.to_string()).unwrap();

    let store = store();
    store.load(dir.path()).await.unwrap();
    let docs = store.documents().await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].content, "buono");
}

#[tokio::test]
async fn test_load_rejects_dimension_mismatch() {
    let dir = TempDir::new().unwrap();
    let raw = serde_json::json!({ "version": 1, "dimension": 8, "entries": [] });
    std::fs::write(dir.path().join(INDEX_FILE), raw.to_string()).unwrap();

    let result = store().load(dir.path()).await;
    assert!(matches!(result, Err(RetrievalError::Storage(_))));
}

#[tokio::test]
async fn test_load_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(INDEX_FILE), "{ not json").unwrap();

    let result = store().load(dir.path()).await;
    assert!(matches!(result, Err(RetrievalError::Serialization(_))));
}
