//! Document definitions.
//!
//! A [`Document`] is produced by the ingestion pipeline and consumed by the
//! indexes. The engine reads a handful of well-known metadata keys, which are
//! typed fields on [`DocumentMetadata`]; anything else lands in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Exact-match metadata predicates (`key == value` for every pair).
pub type MetadataFilter = BTreeMap<String, Value>;

/// A retrievable unit of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Optional ID (assigned by the vector store if not provided).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Text content.
    pub content: String,

    /// Typed metadata.
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            metadata: DocumentMetadata::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Content prefix of at most `chars` characters, used to collapse
    /// duplicate candidates. Never splits a multi-byte character.
    pub fn dedup_key(&self, chars: usize) -> &str {
        match self.content.char_indices().nth(chars) {
            Some((end, _)) => &self.content[..end],
            None => &self.content,
        }
    }
}

/// Metadata attached to a [`Document`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Source path of the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// File name (e.g. `15-07-2025.md`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Entity (client) the document belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,

    /// Free-text document type (e.g. "journal").
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,

    /// Date mentioned in the document, as free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_mentioned: Option<String>,

    /// Whether the document contains prices.
    #[serde(default)]
    pub has_prices: bool,

    /// Whether the document is short.
    #[serde(default)]
    pub is_short_file: bool,

    /// Collaborator-defined keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DocumentMetadata {
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    pub fn with_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    pub fn with_date_mentioned(mut self, date: impl Into<String>) -> Self {
        self.date_mentioned = Some(date.into());
        self
    }

    pub fn with_prices(mut self, has_prices: bool) -> Self {
        self.has_prices = has_prices;
        self
    }

    pub fn short(mut self, is_short_file: bool) -> Self {
        self.is_short_file = is_short_file;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Look up a metadata value by its serialized key name.
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "source" => self.source.clone().map(Value::String),
            "filename" => self.filename.clone().map(Value::String),
            "client" => self.client.clone().map(Value::String),
            "type" => self.doc_type.clone().map(Value::String),
            "date_mentioned" => self.date_mentioned.clone().map(Value::String),
            "has_prices" => Some(Value::Bool(self.has_prices)),
            "is_short_file" => Some(Value::Bool(self.is_short_file)),
            other => self.extra.get(other).cloned(),
        }
    }

    /// True when every predicate in `filter` matches exactly.
    pub fn matches(&self, filter: &MetadataFilter) -> bool {
        filter
            .iter()
            .all(|(key, expected)| self.get(key).as_ref() == Some(expected))
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
