//! Relevance scoring of a bullet against a query.

use std::collections::HashSet;

use ace_core::Bullet;

use crate::tokens::tokenize;

/// Weight of one net feedback vote relative to one overlapping token.
const FEEDBACK_WEIGHT: f64 = 0.1;

/// Score `bullet` against an already-tokenized query.
///
/// `|query ∩ tokens(content)| + 0.1 * (helpful - harmful)`. Pure and
/// deterministic.
pub fn score(bullet: &Bullet, query_words: &HashSet<String>) -> f64 {
    let bullet_words = tokenize(&bullet.content);
    let overlap = query_words.intersection(&bullet_words).count();
    overlap as f64 + bullet.net_feedback() as f64 * FEEDBACK_WEIGHT
}
