//! Lexical tokenization shared by scoring and deduplication.

use std::collections::HashSet;

/// Lowercase `text` and split it on whitespace into a set of tokens.
///
/// Punctuation stays attached to its word, so `"input."` and `"input"` are
/// different tokens.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
