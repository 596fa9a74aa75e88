//! Heuristic boost configuration types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Increments and vocabulary for the heuristic boost stack.
///
/// Every increment is added to a candidate's boost factor, which starts at 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostConfig {
    #[serde(default = "default_short_document")]
    pub short_document: f32,

    #[serde(default = "default_entity_match")]
    pub entity_match: f32,

    #[serde(default = "default_recency")]
    pub recency: f32,

    /// Year treated as most recent. Defaults to the current year at query time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recency_year: Option<i32>,

    #[serde(default = "default_cost_relevance")]
    pub cost_relevance: f32,

    /// Query terms that signal a cost or pricing question.
    #[serde(default = "default_cost_terms")]
    pub cost_terms: Vec<String>,

    #[serde(default = "default_date_exact")]
    pub date_exact: f32,

    #[serde(default = "default_date_calendar")]
    pub date_calendar: f32,

    /// Applied when the summary belongs to the entity named in the query.
    #[serde(default = "default_summary_match")]
    pub summary_match: f32,

    /// Applied to any other summary document.
    #[serde(default = "default_summary_other")]
    pub summary_other: f32,

    #[serde(default = "default_summary_filename")]
    pub summary_filename: String,

    /// Phrases of a generic "tell me about this entity" query.
    #[serde(default = "default_summary_terms")]
    pub summary_terms: Vec<String>,

    #[serde(default = "default_file_keyword")]
    pub file_keyword: f32,

    #[serde(default = "default_combined_entity_file")]
    pub combined_entity_file: f32,

    /// Alias (as written in queries) to canonical entity name.
    #[serde(default)]
    pub entity_aliases: BTreeMap<String, String>,

    /// Ordered file-category keywords; the first one found in a query wins.
    #[serde(default)]
    pub file_keywords: Vec<FileKeyword>,
}

/// Maps a query keyword to the filename it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileKeyword {
    pub keyword: String,
    pub filename: String,
}

impl FileKeyword {
    pub fn new(keyword: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            filename: filename.into(),
        }
    }
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            short_document: default_short_document(),
            entity_match: default_entity_match(),
            recency: default_recency(),
            recency_year: None,
            cost_relevance: default_cost_relevance(),
            cost_terms: default_cost_terms(),
            date_exact: default_date_exact(),
            date_calendar: default_date_calendar(),
            summary_match: default_summary_match(),
            summary_other: default_summary_other(),
            summary_filename: default_summary_filename(),
            summary_terms: default_summary_terms(),
            file_keyword: default_file_keyword(),
            combined_entity_file: default_combined_entity_file(),
            entity_aliases: BTreeMap::new(),
            file_keywords: Vec::new(),
        }
    }
}

impl BoostConfig {
    /// Named increments, for validation and diagnostics.
    pub fn increments(&self) -> [(&'static str, f32); 10] {
        [
            ("short_document", self.short_document),
            ("entity_match", self.entity_match),
            ("recency", self.recency),
            ("cost_relevance", self.cost_relevance),
            ("date_exact", self.date_exact),
            ("date_calendar", self.date_calendar),
            ("summary_match", self.summary_match),
            ("summary_other", self.summary_other),
            ("file_keyword", self.file_keyword),
            ("combined_entity_file", self.combined_entity_file),
        ]
    }
}

fn default_short_document() -> f32 {
    0.3
}

fn default_entity_match() -> f32 {
    0.8
}

fn default_recency() -> f32 {
    0.2
}

fn default_cost_relevance() -> f32 {
    0.4
}

fn default_cost_terms() -> Vec<String> {
    ["€", "$", "costo", "prezzo", "proposta", "mese", "cost", "price", "pricing", "quote"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_date_exact() -> f32 {
    1.5
}

fn default_date_calendar() -> f32 {
    0.7
}

fn default_summary_match() -> f32 {
    3.5
}

fn default_summary_other() -> f32 {
    0.2
}

fn default_summary_filename() -> String {
    "summary.md".to_string()
}

fn default_summary_terms() -> Vec<String> {
    [
        "informazioni generali",
        "generale",
        "ditta",
        "azienda",
        "che tipo",
        "tell me about",
        "general information",
        "company",
        "overview",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_file_keyword() -> f32 {
    0.9
}

fn default_combined_entity_file() -> f32 {
    2.0
}
