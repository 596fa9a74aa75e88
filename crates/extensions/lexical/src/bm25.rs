//! BM25 Okapi scoring.
//!
//! Implemented here rather than through a BM25 crate: terms whose IDF comes
//! out negative are floored to `epsilon` times the corpus average IDF, and
//! [`Bm25Index::score`] returns one score per document in build order, which
//! the hybrid retriever indexes by position.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::tokenizer::tokenize;

/// BM25 Okapi tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term frequency saturation.
    pub k1: f32,
    /// Document length normalization.
    pub b: f32,
    /// Floor for negative IDF values, as a fraction of the average IDF.
    pub epsilon: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.5,
            b: 0.75,
            epsilon: 0.25,
        }
    }
}

/// Immutable BM25 index over a tokenized corpus.
///
/// Scores are returned in build order, one per document.
#[derive(Debug, Clone, Default)]
pub struct Bm25Index {
    params: Bm25Params,
    term_freqs: Vec<HashMap<String, u32>>,
    doc_lens: Vec<usize>,
    avgdl: f32,
    idf: HashMap<String, f32>,
}

impl Bm25Index {
    /// Build an index from raw document texts with default parameters.
    pub fn build<S: AsRef<str>>(documents: &[S]) -> Self {
        Self::with_params(documents, Bm25Params::default())
    }

    /// Build an index from raw document texts.
    pub fn with_params<S: AsRef<str>>(documents: &[S], params: Bm25Params) -> Self {
        let corpus: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d.as_ref())).collect();
        Self::from_tokens(corpus, params)
    }

    /// Build an index from pre-tokenized documents.
    pub fn from_tokens(corpus: Vec<Vec<String>>, params: Bm25Params) -> Self {
        let n = corpus.len();
        let mut term_freqs = Vec::with_capacity(n);
        let mut doc_lens = Vec::with_capacity(n);
        let mut doc_freq: HashMap<String, u32> = HashMap::new();
        let mut total_len = 0usize;

        for tokens in corpus {
            total_len += tokens.len();
            doc_lens.push(tokens.len());

            let mut freqs: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *freqs.entry(token).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            term_freqs.push(freqs);
        }

        let avgdl = if n == 0 { 0.0 } else { total_len as f32 / n as f32 };
        let idf = Self::compute_idf(&doc_freq, n, params.epsilon);

        debug!(documents = n, terms = idf.len(), avgdl, "Built BM25 index");

        Self {
            params,
            term_freqs,
            doc_lens,
            avgdl,
            idf,
        }
    }

    fn compute_idf(doc_freq: &HashMap<String, u32>, n: usize, epsilon: f32) -> HashMap<String, f32> {
        let n = n as f32;
        let mut idf = HashMap::with_capacity(doc_freq.len());
        let mut idf_sum = 0.0f32;
        let mut negative = Vec::new();

        for (term, &df) in doc_freq {
            let df = df as f32;
            let value = (n - df + 0.5).ln() - (df + 0.5).ln();
            idf_sum += value;
            if value < 0.0 {
                negative.push(term.clone());
            }
            idf.insert(term.clone(), value);
        }

        if !idf.is_empty() {
            let floor = epsilon * (idf_sum / idf.len() as f32);
            for term in negative {
                idf.insert(term, floor);
            }
        }

        idf
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.doc_lens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lens.is_empty()
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// Score every document against a raw query string.
    pub fn score(&self, query: &str) -> Vec<f32> {
        self.score_tokens(&tokenize(query))
    }

    /// Score every document against already tokenized query terms.
    pub fn score_tokens(&self, query: &[String]) -> Vec<f32> {
        let Bm25Params { k1, b, .. } = self.params;

        self.term_freqs
            .iter()
            .zip(&self.doc_lens)
            .map(|(freqs, &dl)| {
                let length_norm = if self.avgdl > 0.0 {
                    1.0 - b + b * dl as f32 / self.avgdl
                } else {
                    1.0
                };
                query
                    .iter()
                    .map(|term| {
                        let tf = freqs.get(term).copied().unwrap_or(0) as f32;
                        if tf == 0.0 {
                            return 0.0;
                        }
                        let idf = self.idf.get(term).copied().unwrap_or(0.0);
                        idf * tf * (k1 + 1.0) / (tf + k1 * length_norm)
                    })
                    .sum()
            })
            .collect()
    }

    /// Indices of the `n` highest scores, best first. Ties keep index order.
    pub fn top_k(scores: &[f32], n: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..scores.len()).collect();
        indices.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
        indices.truncate(n);
        indices
    }
}

#[cfg(test)]
#[path = "bm25_tests.rs"]
mod tests;
