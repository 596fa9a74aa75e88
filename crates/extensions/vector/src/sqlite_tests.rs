use super::*;
use crate::embedding::HashEmbedding;
use tempfile::TempDir;

fn embedder() -> Arc<dyn EmbeddingProvider> {
    Arc::new(HashEmbedding::new(64))
}

async fn store() -> SqliteVectorStore {
    SqliteVectorStore::in_memory("sqlite", embedder()).await.unwrap()
}

#[tokio::test]
async fn test_capabilities() {
    let caps = store().await.capabilities();
    assert!(caps.supports_delete);
    assert_eq!(caps.persistence, Persistence::Automatic);
    assert_eq!(caps.distance, DistanceMetric::Cosine);
}

#[tokio::test]
async fn test_empty_store_searches_empty() {
    let store = store().await;
    assert!(store.similarity_search("qualcosa", 5).await.unwrap().is_empty());
    assert!(store.documents().await.unwrap().is_empty());
    assert_eq!(store.len().await.unwrap(), 0);
}

#[tokio::test]
async fn test_add_and_documents_in_order() {
    let store = store().await;
    let meta = DocumentMetadata::default()
        .with_filename("15-07-2025.md")
        .with_type("journal")
        .with_extra("project", "sito");
    let ids = store
        .add_documents(vec![
            Document::new("primo").with_metadata(meta.clone()),
            Document::new("secondo").with_id("doc-2"),
        ])
        .await
        .unwrap();
    assert_eq!(ids[1], "doc-2");

    let docs = store.documents().await.unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].content, "primo");
    assert_eq!(docs[0].metadata, meta);
    assert_eq!(docs[0].id.as_deref(), Some(ids[0].as_str()));
    assert_eq!(store.len().await.unwrap(), 2);
}

#[tokio::test]
async fn test_duplicate_id_rejected() {
    let store = store().await;
    store.add_documents(vec![Document::new("a").with_id("same")]).await.unwrap();
    let result = store.add_documents(vec![Document::new("b").with_id("same")]).await;
    assert!(matches!(result, Err(RetrievalError::Storage(_))));
}

#[tokio::test]
async fn test_cosine_ranking() {
    let store = store().await;
    store
        .add_documents(vec![
            Document::new("ricetta della pasta al forno"),
            Document::new("preventivo sito web"),
            Document::new("preventivo sito web per Acme"),
        ])
        .await
        .unwrap();

    let results = store.similarity_search_with_score("preventivo sito web", 2).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0.content, "preventivo sito web");
    assert!(results[0].1 < 1e-5);
    assert!(results.iter().all(|(_, d)| (0.0..=2.0).contains(d)));
    assert!(results[0].1 <= results[1].1);
}

#[tokio::test]
async fn test_delete() {
    let store = store().await;
    let ids = store
        .add_documents(vec![Document::new("tenere"), Document::new("rimuovere")])
        .await
        .unwrap();
    store.delete(&[ids[1].clone(), "missing".to_string()]).await.unwrap();

    let docs = store.documents().await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].content, "tenere");
}

#[tokio::test]
async fn test_save_and_load_are_noops() {
    let dir = TempDir::new().unwrap();
    let store = store().await;
    store.add_documents(vec![Document::new("x")]).await.unwrap();
    store.save(dir.path()).await.unwrap();
    store.load(dir.path()).await.unwrap();
    assert_eq!(store.len().await.unwrap(), 1);
    assert!(!dir.path().join("index.json").exists());
}

#[tokio::test]
async fn test_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("index.db");

    {
        let store = SqliteVectorStore::open("sqlite", &path, embedder()).await.unwrap();
        store.add_documents(vec![Document::new("durevole")]).await.unwrap();
    }

    let reopened = SqliteVectorStore::open("sqlite", &path, embedder()).await.unwrap();
    let docs = reopened.documents().await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].content, "durevole");
}

#[tokio::test]
async fn test_corrupt_rows_are_skipped() {
    let store = store().await;
    store.add_documents(vec![Document::new("sano")]).await.unwrap();
    store
        .conn
        .call(|conn| {
            conn.execute(
                "INSERT INTO documents (id, content, metadata, embedding) VALUES ('bad-meta', 'x', 'not json', x'00000000')",
                [],
            )?;
            conn.execute(
                "INSERT INTO documents (id, content, metadata, embedding) VALUES ('bad-blob', 'y', '{}', x'000000')",
                [],
            )?;
            conn.execute(
                "INSERT INTO documents (id, content, metadata, embedding) VALUES ('short', 'z', '{}', x'0000803f')",
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();

    let results = store.similarity_search("sano", 10).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content, "sano");

    // Unreadable metadata is dropped; rows with odd embeddings still list.
    let docs = store.documents().await.unwrap();
    assert_eq!(docs.len(), 3);
}

#[tokio::test]
async fn test_unreadable_rows_are_skipped() {
    let store = store().await;
    store.add_documents(vec![Document::new("sano")]).await.unwrap();
    store
        .conn
        .call(|conn| {
            conn.execute(
                "INSERT INTO documents (id, content, metadata, embedding) VALUES ('blob-content', x'ff', '{}', x'00000000')",
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();

    let results = store.similarity_search("sano", 10).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content, "sano");
}

#[test]
fn test_vector_blob_encoding() {
    let vector = vec![1.0f32, -0.5, 0.25];
    let bytes = encode_vector(&vector);
    assert_eq!(bytes.len(), 12);
    assert_eq!(decode_vector(&bytes).unwrap(), vector);
    assert!(decode_vector(&bytes[..5]).is_err());
}
