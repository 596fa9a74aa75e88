//! Exact brute-force vector index.

use ragfuse_protocols::Document;
use serde::{Deserialize, Serialize};

use crate::embedding::Embedding;

/// A document together with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub document: Document,
    pub embedding: Embedding,
}

/// Append-only in-memory index ranked by squared Euclidean distance.
///
/// Entries keep insertion order, which is also the corpus order exposed to
/// the lexical index.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    entries: Vec<IndexedDocument>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Append an entry. Entries with the wrong dimension are rejected and returned.
    pub fn push(&mut self, entry: IndexedDocument) -> Result<(), IndexedDocument> {
        if entry.embedding.dimension != self.dimension {
            return Err(entry);
        }
        self.entries.push(entry);
        Ok(())
    }

    /// The `k` nearest entries as `(position, distance)`, nearest first.
    ///
    /// Equal distances keep insertion order.
    pub fn search(&self, query: &Embedding, k: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, query.squared_l2_distance(&entry.embedding)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        scored
    }

    pub fn get(&self, position: usize) -> Option<&IndexedDocument> {
        self.entries.get(position)
    }

    pub fn entries(&self) -> &[IndexedDocument] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
