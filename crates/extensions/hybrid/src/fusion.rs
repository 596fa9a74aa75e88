//! Candidate merging and score fusion.

use std::collections::HashMap;

use ragfuse_protocols::Document;

/// Added to the lexical maximum before dividing.
const LEXICAL_EPSILON: f32 = 1e-10;

/// A fused retrieval candidate.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub document: Document,
    /// `1 / (1 + distance)`, 0 when the semantic search missed it.
    pub semantic_score: f32,
    /// BM25 score normalized by the batch maximum, 0 when absent.
    pub lexical_score: f32,
    pub boost_factor: f32,
    pub final_score: f32,
    /// The candidate is a calendar entry for a day named in the query.
    pub date_match: bool,
}

impl ScoredCandidate {
    /// Multiply the fused score by `factor`.
    pub fn apply_boost(&mut self, factor: f32) {
        self.boost_factor = factor;
        self.final_score *= factor;
    }
}

#[derive(Debug)]
struct PoolEntry {
    document: Document,
    semantic: f32,
    lexical_raw: Option<f32>,
    date_match: bool,
}

/// Candidates keyed by content prefix, kept in discovery order.
#[derive(Debug)]
pub struct CandidatePool {
    dedup_chars: usize,
    entries: Vec<PoolEntry>,
    positions: HashMap<String, usize>,
}

impl CandidatePool {
    pub fn new(dedup_chars: usize) -> Self {
        Self {
            dedup_chars,
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a semantic hit. The first hit for a dedup key wins.
    pub fn add_semantic(&mut self, document: Document, distance: f32) {
        let key = document.dedup_key(self.dedup_chars).to_string();
        if self.positions.contains_key(&key) {
            return;
        }
        let semantic = 1.0 / (1.0 + distance.max(0.0));
        self.positions.insert(key, self.entries.len());
        self.entries.push(PoolEntry {
            document,
            semantic,
            lexical_raw: None,
            date_match: false,
        });
    }

    /// Record a lexical hit, merging into an existing candidate with the same
    /// dedup key. The highest raw score is kept.
    pub fn add_lexical(&mut self, document: &Document, raw: f32, date_match: bool) {
        let key = document.dedup_key(self.dedup_chars);
        if let Some(&i) = self.positions.get(key) {
            let entry = &mut self.entries[i];
            entry.lexical_raw = Some(entry.lexical_raw.map_or(raw, |prev| prev.max(raw)));
            entry.date_match |= date_match;
            return;
        }
        self.positions.insert(key.to_string(), self.entries.len());
        self.entries.push(PoolEntry {
            document: document.clone(),
            semantic: 0.0,
            lexical_raw: Some(raw),
            date_match,
        });
    }

    /// Normalize and blend: `alpha * semantic + (1 - alpha) * lexical`.
    ///
    /// `lexical_max` is the largest raw BM25 score of the batch; date matches
    /// are scored as if they had twice that.
    pub fn fuse(self, alpha: f32, lexical_max: f32) -> Vec<ScoredCandidate> {
        let max = lexical_max.max(0.0);
        let denominator = max + LEXICAL_EPSILON;
        let date_score = if max > 0.0 { 2.0 * max / denominator } else { 2.0 };

        self.entries
            .into_iter()
            .map(|entry| {
                let lexical_score = if entry.date_match {
                    date_score
                } else {
                    entry.lexical_raw.map_or(0.0, |raw| raw.max(0.0) / denominator)
                };
                let final_score = alpha * entry.semantic + (1.0 - alpha) * lexical_score;
                ScoredCandidate {
                    document: entry.document,
                    semantic_score: entry.semantic,
                    lexical_score,
                    boost_factor: 1.0,
                    final_score,
                    date_match: entry.date_match,
                }
            })
            .collect()
    }
}
