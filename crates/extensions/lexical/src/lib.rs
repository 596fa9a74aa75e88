//! Lexical index for ragfuse.
//!
//! Scores documents against a query with BM25 Okapi over a simple
//! lowercase word tokenization. The index is rebuilt from scratch whenever
//! the corpus changes.

mod bm25;
mod tokenizer;

pub use bm25::{Bm25Index, Bm25Params};
pub use tokenizer::tokenize;
