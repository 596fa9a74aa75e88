//! Date vocabulary configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Words the date detector recognizes in queries.
///
/// Defaults cover Italian and English. All entries are matched lowercase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateConfig {
    /// Month name to month number (1-12).
    #[serde(default = "default_month_names")]
    pub month_names: BTreeMap<String, u32>,

    /// Relative day term to offset in days from today.
    #[serde(default = "default_relative_terms")]
    pub relative_terms: BTreeMap<String, i64>,

    /// Weekday names; they mark a query as date-bearing without a target.
    #[serde(default = "default_weekday_names")]
    pub weekday_names: Vec<String>,

    /// Terms that make a dated query a calendar question.
    #[serde(default = "default_calendar_keywords")]
    pub calendar_keywords: Vec<String>,

    /// Metadata `type` of calendar entries.
    #[serde(default = "default_journal_type")]
    pub journal_type: String,

    /// Substring of `source` that marks a calendar entry.
    #[serde(default = "default_journal_path_marker")]
    pub journal_path_marker: String,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            month_names: default_month_names(),
            relative_terms: default_relative_terms(),
            weekday_names: default_weekday_names(),
            calendar_keywords: default_calendar_keywords(),
            journal_type: default_journal_type(),
            journal_path_marker: default_journal_path_marker(),
        }
    }
}

fn default_month_names() -> BTreeMap<String, u32> {
    const ITALIAN: [&str; 12] = [
        "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto",
        "settembre", "ottobre", "novembre", "dicembre",
    ];
    const ENGLISH: [&str; 12] = [
        "january", "february", "march", "april", "may", "june", "july", "august",
        "september", "october", "november", "december",
    ];

    let mut months = BTreeMap::new();
    for names in [ITALIAN, ENGLISH] {
        for (i, name) in names.iter().enumerate() {
            months.insert((*name).to_string(), i as u32 + 1);
        }
    }
    months
}

fn default_relative_terms() -> BTreeMap<String, i64> {
    [
        ("oggi", 0),
        ("ieri", -1),
        ("domani", 1),
        ("today", 0),
        ("yesterday", -1),
        ("tomorrow", 1),
    ]
    .into_iter()
    .map(|(term, offset)| (term.to_string(), offset))
    .collect()
}

fn default_weekday_names() -> Vec<String> {
    [
        "lunedì", "martedì", "mercoledì", "giovedì", "venerdì", "sabato", "domenica",
        "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_calendar_keywords() -> Vec<String> {
    [
        "data", "calendario", "attività", "appuntamento", "meeting", "riunione", "impegno",
        "calendar", "appointment", "schedule",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_journal_type() -> String {
    "journal".to_string()
}

fn default_journal_path_marker() -> String {
    "Journal/".to_string()
}
