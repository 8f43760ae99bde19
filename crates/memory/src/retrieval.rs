//! Top-K retrieval of relevant bullets for prompt construction.

use ace_core::{Bullet, ContextState};
use tracing::trace;

use crate::scoring::score;
use crate::tokens::tokenize;

/// Default number of bullets placed into a prompt.
pub const DEFAULT_MAX_BULLETS: usize = 10;

/// Return up to `max_bullets` bullets with a strictly positive score,
/// best first.
///
/// The sort is stable, so bullets with equal scores keep the context's id
/// order and repeated calls on the same snapshot return the same sequence.
pub fn get_relevant_bullets(context: &ContextState, query: &str, max_bullets: usize) -> Vec<Bullet> {
    if context.is_empty() || max_bullets == 0 {
        return Vec::new();
    }

    let query_words = tokenize(query);
    let mut scored: Vec<(f64, &Bullet)> = context
        .iter()
        .map(|b| (score(b, &query_words), b))
        .filter(|(s, _)| *s > 0.0)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(max_bullets);

    trace!(
        candidates = context.len(),
        selected = scored.len(),
        "Retrieved relevant bullets"
    );

    scored.into_iter().map(|(_, b)| b.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ContextState {
        let mut helpful = Bullet::with_id("b2", "Handle errors gracefully");
        helpful.helpful_count = 4;
        let mut harmful = Bullet::with_id("b4", "Skip input validation for speed");
        harmful.harmful_count = 30;
        ContextState::from_bullets([
            Bullet::with_id("b1", "Validate input before processing"),
            helpful,
            Bullet::with_id("b3", "Log all operations"),
            harmful,
        ])
    }

    #[test]
    fn empty_context_returns_nothing() {
        assert!(get_relevant_bullets(&ContextState::new(), "anything", 10).is_empty());
    }

    #[test]
    fn best_match_first_and_positive_only() {
        let results = get_relevant_bullets(&context(), "how to validate input data?", 10);
        let ids: Vec<&str> = results.iter().map(|b| b.id.as_str()).collect();
        // b1 overlaps twice; b2 only scores through feedback; b3 scores 0;
        // b4 overlaps once but feedback drags it below zero.
        assert_eq!(ids, vec!["b1", "b2"]);
    }

    #[test]
    fn respects_max_bullets() {
        let results = get_relevant_bullets(&context(), "validate input errors", 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "b1");
    }

    #[test]
    fn ties_keep_id_order_and_are_reproducible() {
        let ctx = ContextState::from_bullets([
            Bullet::with_id("z", "cache results"),
            Bullet::with_id("a", "cache queries"),
            Bullet::with_id("m", "cache pages"),
        ]);
        let first = get_relevant_bullets(&ctx, "cache", 10);
        let second = get_relevant_bullets(&ctx, "cache", 10);
        let ids: Vec<&str> = first.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "m", "z"]);
        assert_eq!(first, second);
    }

    #[test]
    fn never_returns_non_positive_scores() {
        let ctx = context();
        let query_words = tokenize("unrelated words entirely");
        for bullet in get_relevant_bullets(&ctx, "unrelated words entirely", 10) {
            assert!(score(&bullet, &query_words) > 0.0);
        }
    }
}
