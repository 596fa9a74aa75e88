//! Heuristic boost rules.
//!
//! Each rule contributes an additive increment to a candidate's boost factor,
//! which starts at 1.0 and multiplies the fused score. Rules run in a fixed
//! order and are driven entirely by configuration data.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};
use ragfuse_config::{BoostConfig, DateConfig, FileKeyword};
use ragfuse_lexical::tokenize;
use ragfuse_protocols::Document;

use crate::date::{DateQuery, JournalMatcher};

/// Query-derived facts shared by every rule.
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub query_lower: String,
    pub words: HashSet<String>,
    pub dates: DateQuery,
    pub today: NaiveDate,
    /// Canonical entity names (lowercase) whose alias appears in the query.
    pub entities: Vec<String>,
}

impl QueryContext {
    pub fn new(query: &str, dates: DateQuery, today: NaiveDate, aliases: &EntityAliases) -> Self {
        let query_lower = query.to_lowercase();
        let entities = aliases.mentioned(&query_lower);
        Self {
            words: tokenize(&query_lower).into_iter().collect(),
            query_lower,
            dates,
            today,
            entities,
        }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.query_lower.contains(term)
    }

    /// The entity was named through an alias.
    pub fn names_entity_by_alias(&self, client: &str) -> bool {
        let client = client.to_lowercase();
        self.entities.iter().any(|e| *e == client)
    }

    /// The entity was named through an alias or by its full name.
    pub fn names_entity(&self, client: &str) -> bool {
        let client = client.trim().to_lowercase();
        !client.is_empty() && (self.names_entity_by_alias(&client) || self.contains(&client))
    }

    /// Any word of the entity name appears as a query word.
    pub fn mentions_entity_word(&self, client: &str) -> bool {
        tokenize(client).iter().any(|w| self.words.contains(w))
    }
}

/// Alias table mapping query spellings to canonical entity names.
#[derive(Debug, Clone, Default)]
pub struct EntityAliases {
    aliases: Vec<(String, String)>,
}

impl EntityAliases {
    pub fn new(aliases: &BTreeMap<String, String>) -> Self {
        Self {
            aliases: aliases
                .iter()
                .filter(|(alias, canonical)| !alias.trim().is_empty() && !canonical.trim().is_empty())
                .map(|(alias, canonical)| (alias.to_lowercase(), canonical.to_lowercase()))
                .collect(),
        }
    }

    /// Canonical names whose alias occurs in the (lowercase) query.
    pub fn mentioned(&self, query_lower: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for (alias, canonical) in &self.aliases {
            if query_lower.contains(alias.as_str()) && !found.contains(canonical) {
                found.push(canonical.clone());
            }
        }
        found
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// A single heuristic adjustment.
pub trait BoostRule: Send + Sync {
    fn name(&self) -> &str;

    /// Non-negative amount added to the boost factor for `doc`.
    fn increment(&self, ctx: &QueryContext, doc: &Document) -> f32;
}

fn lowercase_all(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn lower_filename(doc: &Document) -> String {
    doc.metadata
        .filename
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Prefers documents flagged as short.
pub struct ShortDocumentBoost {
    pub increment: f32,
}

impl BoostRule for ShortDocumentBoost {
    fn name(&self) -> &str {
        "short_document"
    }

    fn increment(&self, _ctx: &QueryContext, doc: &Document) -> f32 {
        if doc.metadata.is_short_file { self.increment } else { 0.0 }
    }
}

/// Documents of the entity named in the query, through an alias or by the
/// document's own client name.
pub struct EntityMatchBoost {
    pub increment: f32,
}

impl BoostRule for EntityMatchBoost {
    fn name(&self) -> &str {
        "entity_match"
    }

    fn increment(&self, ctx: &QueryContext, doc: &Document) -> f32 {
        match doc.metadata.client.as_deref() {
            Some(client) if ctx.names_entity(client) => self.increment,
            _ => 0.0,
        }
    }
}

/// Documents mentioning the most recent year.
pub struct RecencyBoost {
    pub increment: f32,
    /// Fixed year; the current year when `None`.
    pub year: Option<i32>,
}

impl BoostRule for RecencyBoost {
    fn name(&self) -> &str {
        "recency"
    }

    fn increment(&self, ctx: &QueryContext, doc: &Document) -> f32 {
        let year = self.year.unwrap_or_else(|| ctx.today.year()).to_string();
        match doc.metadata.date_mentioned.as_deref() {
            Some(mentioned) if mentioned.contains(&year) => self.increment,
            _ => 0.0,
        }
    }
}

/// Priced documents for cost questions.
pub struct CostRelevanceBoost {
    pub increment: f32,
    terms: Vec<String>,
}

impl CostRelevanceBoost {
    pub fn new(increment: f32, terms: &[String]) -> Self {
        Self {
            increment,
            terms: lowercase_all(terms),
        }
    }
}

impl BoostRule for CostRelevanceBoost {
    fn name(&self) -> &str {
        "cost_relevance"
    }

    fn increment(&self, ctx: &QueryContext, doc: &Document) -> f32 {
        if doc.metadata.has_prices && self.terms.iter().any(|t| ctx.contains(t)) {
            self.increment
        } else {
            0.0
        }
    }
}

/// Calendar entries for dated queries.
///
/// An entry for a targeted day gets `exact`; any entry gets `calendar` when
/// the query is dated and asks about the calendar.
pub struct DateQueryBoost {
    pub exact: f32,
    pub calendar: f32,
    journal: JournalMatcher,
}

impl DateQueryBoost {
    pub fn new(exact: f32, calendar: f32, journal: JournalMatcher) -> Self {
        Self {
            exact,
            calendar,
            journal,
        }
    }
}

impl BoostRule for DateQueryBoost {
    fn name(&self) -> &str {
        "date_query"
    }

    fn increment(&self, ctx: &QueryContext, doc: &Document) -> f32 {
        if !ctx.dates.mentions_date {
            return 0.0;
        }
        let Some(entry_date) = self.journal.entry_date(doc) else {
            return 0.0;
        };
        if ctx.dates.targets_day(&entry_date) {
            self.exact
        } else if ctx.dates.calendar_keyword {
            self.calendar
        } else {
            0.0
        }
    }
}

/// Summary documents for "tell me about this entity" queries.
pub struct SummaryDocumentBoost {
    pub matched: f32,
    pub other: f32,
    filename: String,
    terms: Vec<String>,
}

impl SummaryDocumentBoost {
    pub fn new(matched: f32, other: f32, filename: &str, terms: &[String]) -> Self {
        Self {
            matched,
            other,
            filename: filename.to_lowercase(),
            terms: lowercase_all(terms),
        }
    }
}

impl BoostRule for SummaryDocumentBoost {
    fn name(&self) -> &str {
        "summary_document"
    }

    fn increment(&self, ctx: &QueryContext, doc: &Document) -> f32 {
        if self.filename.is_empty()
            || lower_filename(doc) != self.filename
            || !self.terms.iter().any(|t| ctx.contains(t))
        {
            return 0.0;
        }
        match doc.metadata.client.as_deref() {
            Some(client) if ctx.names_entity(client) => self.matched,
            _ => self.other,
        }
    }
}

/// Shared keyword-to-filename matching for the file rules.
#[derive(Debug, Clone, Default)]
struct FileKeywords(Vec<FileKeyword>);

impl FileKeywords {
    fn new(keywords: &[FileKeyword]) -> Self {
        Self(
            keywords
                .iter()
                .filter(|k| !k.keyword.is_empty() && !k.filename.is_empty())
                .map(|k| FileKeyword::new(k.keyword.to_lowercase(), k.filename.to_lowercase()))
                .collect(),
        )
    }

    /// Some keyword found in the query maps to this document's filename.
    fn matches(&self, ctx: &QueryContext, doc: &Document) -> bool {
        let filename = lower_filename(doc);
        !filename.is_empty()
            && self
                .0
                .iter()
                .any(|k| ctx.contains(&k.keyword) && k.filename == filename)
    }
}

/// Documents whose filename matches a file-category keyword in the query.
pub struct FileKeywordBoost {
    pub increment: f32,
    keywords: FileKeywords,
}

impl FileKeywordBoost {
    pub fn new(increment: f32, keywords: &[FileKeyword]) -> Self {
        Self {
            increment,
            keywords: FileKeywords::new(keywords),
        }
    }
}

impl BoostRule for FileKeywordBoost {
    fn name(&self) -> &str {
        "file_keyword"
    }

    fn increment(&self, ctx: &QueryContext, doc: &Document) -> f32 {
        if self.keywords.matches(ctx, doc) { self.increment } else { 0.0 }
    }
}

/// The right file of the right entity: entity named in the query and the
/// filename keyword matching.
pub struct CombinedEntityFileBoost {
    pub increment: f32,
    keywords: FileKeywords,
}

impl CombinedEntityFileBoost {
    pub fn new(increment: f32, keywords: &[FileKeyword]) -> Self {
        Self {
            increment,
            keywords: FileKeywords::new(keywords),
        }
    }
}

impl BoostRule for CombinedEntityFileBoost {
    fn name(&self) -> &str {
        "combined_entity_file"
    }

    fn increment(&self, ctx: &QueryContext, doc: &Document) -> f32 {
        let Some(client) = doc.metadata.client.as_deref() else {
            return 0.0;
        };
        if ctx.mentions_entity_word(client) && self.keywords.matches(ctx, doc) {
            self.increment
        } else {
            0.0
        }
    }
}

/// Ordered list of boost rules plus the alias table they share.
#[derive(Default)]
pub struct BoostStack {
    rules: Vec<Box<dyn BoostRule>>,
    aliases: EntityAliases,
}

impl BoostStack {
    /// A stack with no rules: every boost factor is 1.0.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard rule order built from configuration.
    pub fn from_config(boosts: &BoostConfig, dates: &DateConfig) -> Self {
        Self::empty()
            .with_aliases(EntityAliases::new(&boosts.entity_aliases))
            .with_rule(ShortDocumentBoost {
                increment: boosts.short_document,
            })
            .with_rule(EntityMatchBoost {
                increment: boosts.entity_match,
            })
            .with_rule(RecencyBoost {
                increment: boosts.recency,
                year: boosts.recency_year,
            })
            .with_rule(CostRelevanceBoost::new(boosts.cost_relevance, &boosts.cost_terms))
            .with_rule(DateQueryBoost::new(
                boosts.date_exact,
                boosts.date_calendar,
                JournalMatcher::from_config(dates),
            ))
            .with_rule(SummaryDocumentBoost::new(
                boosts.summary_match,
                boosts.summary_other,
                &boosts.summary_filename,
                &boosts.summary_terms,
            ))
            .with_rule(FileKeywordBoost::new(boosts.file_keyword, &boosts.file_keywords))
            .with_rule(CombinedEntityFileBoost::new(
                boosts.combined_entity_file,
                &boosts.file_keywords,
            ))
    }

    pub fn with_rule(mut self, rule: impl BoostRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn with_aliases(mut self, aliases: EntityAliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Query context resolved against this stack's alias table.
    pub fn context(&self, query: &str, dates: DateQuery, today: NaiveDate) -> QueryContext {
        QueryContext::new(query, dates, today, &self.aliases)
    }

    /// `1.0` plus every rule's increment, in rule order.
    pub fn boost_factor(&self, ctx: &QueryContext, doc: &Document) -> f32 {
        self.rules
            .iter()
            .fold(1.0, |factor, rule| factor + rule.increment(ctx, doc).max(0.0))
    }
}

#[cfg(test)]
#[path = "boost_tests.rs"]
mod tests;
