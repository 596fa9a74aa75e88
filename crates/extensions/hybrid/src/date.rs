//! Date expressions in queries and calendar entries in the corpus.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use ragfuse_config::DateConfig;
use ragfuse_protocols::Document;
use regex::Regex;

/// `DD/MM`, `DD-MM`, optionally followed by `/YYYY` or `-YYYY`.
static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})[/-](\d{1,2})(?:[/-](\d{4}))?\b").expect("valid numeric date pattern")
});

/// Calendar entry filenames.
static ENTRY_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})-(\d{2})-(\d{4})\.md$").expect("valid filename pattern"));

/// Source of the current date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Date information extracted from a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateQuery {
    /// The query carries some date expression, even without a concrete day.
    pub mentions_date: bool,
    /// Concrete days referenced, rendered `DD-MM-YYYY`, in discovery order.
    pub targets: Vec<String>,
    /// The query also contains a calendar keyword.
    pub calendar_keyword: bool,
}

impl DateQuery {
    pub fn targets_day(&self, date: &str) -> bool {
        self.targets.iter().any(|t| t == date)
    }
}

/// Recognizes calendar entries: journal documents named `DD-MM-YYYY.md`.
#[derive(Debug, Clone)]
pub struct JournalMatcher {
    journal_type: String,
    path_marker: String,
}

impl JournalMatcher {
    pub fn new(journal_type: impl Into<String>, path_marker: impl Into<String>) -> Self {
        Self {
            journal_type: journal_type.into(),
            path_marker: path_marker.into(),
        }
    }

    pub fn from_config(config: &DateConfig) -> Self {
        Self::new(&config.journal_type, &config.journal_path_marker)
    }

    /// Whether the document is tagged as journal content.
    pub fn is_journal(&self, doc: &Document) -> bool {
        let meta = &doc.metadata;
        meta.doc_type.as_deref() == Some(self.journal_type.as_str())
            || (!self.path_marker.is_empty()
                && meta
                    .source
                    .as_deref()
                    .is_some_and(|s| s.contains(&self.path_marker)))
    }

    /// The `DD-MM-YYYY` day of a calendar entry, or `None` for other documents.
    pub fn entry_date(&self, doc: &Document) -> Option<String> {
        if !self.is_journal(doc) {
            return None;
        }
        let filename = doc.metadata.filename.as_deref()?;
        let caps = ENTRY_FILENAME.captures(filename)?;
        Some(format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
    }
}

/// Finds date expressions in queries using a configurable vocabulary.
pub struct DateDetector {
    months: BTreeMap<String, u32>,
    relative: BTreeMap<String, i64>,
    weekdays: HashSet<String>,
    calendar_keywords: Vec<String>,
    day_month: Option<Regex>,
    month_year: Option<Regex>,
    journal: JournalMatcher,
}

impl DateDetector {
    pub fn new(config: &DateConfig) -> Self {
        let months: BTreeMap<String, u32> = config
            .month_names
            .iter()
            .map(|(name, n)| (name.to_lowercase(), *n))
            .collect();

        let (day_month, month_year) = match Self::month_alternation(&months) {
            Some(alt) => (
                Regex::new(&format!(r"\b(\d{{1,2}})\s+({alt})(?:\s+(\d{{4}}))?\b")).ok(),
                Regex::new(&format!(r"\b({alt})\s+(\d{{4}})\b")).ok(),
            ),
            None => (None, None),
        };

        Self {
            months,
            relative: config
                .relative_terms
                .iter()
                .map(|(term, offset)| (term.to_lowercase(), *offset))
                .collect(),
            weekdays: config.weekday_names.iter().map(|w| w.to_lowercase()).collect(),
            calendar_keywords: config
                .calendar_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            day_month,
            month_year,
            journal: JournalMatcher::from_config(config),
        }
    }

    /// Regex alternation of month names, longest first so prefixes never win.
    fn month_alternation(months: &BTreeMap<String, u32>) -> Option<String> {
        let mut names: Vec<&String> = months.keys().filter(|n| !n.is_empty()).collect();
        if names.is_empty() {
            return None;
        }
        names.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        Some(
            names
                .iter()
                .map(|n| regex::escape(n))
                .collect::<Vec<_>>()
                .join("|"),
        )
    }

    pub fn journal(&self) -> &JournalMatcher {
        &self.journal
    }

    /// Extract date information from `query`, resolving partial and relative
    /// dates against `today`. Impossible dates are ignored.
    pub fn detect(&self, query: &str, today: NaiveDate) -> DateQuery {
        let query = query.to_lowercase();
        let mut result = DateQuery {
            calendar_keyword: self.calendar_keywords.iter().any(|k| query.contains(k.as_str())),
            ..Default::default()
        };

        for caps in NUMERIC_DATE.captures_iter(&query) {
            let year = match caps.get(3) {
                Some(y) => y.as_str().parse().ok(),
                None => Some(today.year()),
            };
            if let (Some(day), Some(month), Some(year)) =
                (caps[1].parse().ok(), caps[2].parse().ok(), year)
            {
                Self::push_target(&mut result, year, month, day);
            }
        }

        if let Some(re) = &self.day_month {
            for caps in re.captures_iter(&query) {
                let month = self.months.get(&caps[2]).copied();
                let year = match caps.get(3) {
                    Some(y) => y.as_str().parse().ok(),
                    None => Some(today.year()),
                };
                if let (Some(day), Some(month), Some(year)) = (caps[1].parse().ok(), month, year) {
                    Self::push_target(&mut result, year, month, day);
                }
            }
        }

        if let Some(re) = &self.month_year {
            if re.is_match(&query) {
                result.mentions_date = true;
            }
        }

        for word in query.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            if let Some(offset) = self.relative.get(word) {
                let day = today.checked_add_signed(chrono::Duration::days(*offset));
                if let Some(day) = day {
                    Self::push_target(&mut result, day.year(), day.month(), day.day());
                }
            } else if self.weekdays.contains(word) {
                result.mentions_date = true;
            }
        }

        result
    }

    fn push_target(result: &mut DateQuery, year: i32, month: u32, day: u32) {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            return;
        };
        result.mentions_date = true;
        let rendered = date.format("%d-%m-%Y").to_string();
        if !result.targets.contains(&rendered) {
            result.targets.push(rendered);
        }
    }

    /// Corpus positions of calendar entries for any targeted day.
    pub fn find_matches(&self, query: &DateQuery, corpus: &[Document]) -> Vec<usize> {
        if query.targets.is_empty() {
            return Vec::new();
        }
        corpus
            .iter()
            .enumerate()
            .filter(|(_, doc)| {
                self.journal
                    .entry_date(doc)
                    .is_some_and(|date| query.targets_day(&date))
            })
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
#[path = "date_tests.rs"]
mod tests;
