//! Query and document tokenization.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"));

/// Split text into lowercase word tokens.
///
/// Every character that is neither a word character nor whitespace becomes a
/// separator, so `"15-07-2025.md"` yields `["15", "07", "2025", "md"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, " ")
        .split_whitespace()
        .map(String::from)
        .collect()
}
