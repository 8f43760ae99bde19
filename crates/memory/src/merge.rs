//! Merging deltas into a context, folding near-duplicates into feedback.

use std::collections::{BTreeMap, HashSet};

use ace_core::{Bullet, ContextState, DeltaUpdate, SHORT_ID_LEN};
use tracing::debug;

use crate::tokens::tokenize;

/// Containment at or above which a candidate is treated as a duplicate.
pub const DUPLICATE_THRESHOLD: f64 = 0.7;

/// Share of `candidate` tokens that also appear in `existing`.
///
/// Returns `None` when either side has no tokens: an empty bullet is never
/// a duplicate of anything, and nothing is a duplicate of an empty bullet.
pub fn containment(candidate: &HashSet<String>, existing: &HashSet<String>) -> Option<f64> {
    if candidate.is_empty() || existing.is_empty() {
        return None;
    }
    let overlap = candidate.intersection(existing).count();
    Some(overlap as f64 / candidate.len() as f64)
}

/// Id of the first bullet (in ascending id order) that `candidate` duplicates.
pub fn find_duplicate<'a>(
    candidate: &Bullet,
    bullets: &'a BTreeMap<String, Bullet>,
    threshold: f64,
) -> Option<&'a str> {
    let candidate_tokens = tokenize(&candidate.content);
    bullets
        .iter()
        .find(|(_, existing)| {
            containment(&candidate_tokens, &tokenize(&existing.content))
                .is_some_and(|c| c >= threshold)
        })
        .map(|(id, _)| id.as_str())
}

/// Merge `delta` into `context` with the default duplicate threshold.
pub fn merge_delta(context: &ContextState, delta: &DeltaUpdate) -> ContextState {
    merge_delta_with_threshold(context, delta, DUPLICATE_THRESHOLD)
}

/// Merge `delta` into `context`.
///
/// Candidates are processed in delta order against the working set, which
/// includes candidates inserted earlier in the same delta. A duplicate bumps
/// the `helpful_count` of the first matching bullet instead of being
/// inserted, so two near-identical candidates in one delta yield one bullet
/// with one helpful vote.
///
/// The result is always `context.version + 1`, even for an empty delta.
pub fn merge_delta_with_threshold(
    context: &ContextState,
    delta: &DeltaUpdate,
    threshold: f64,
) -> ContextState {
    let mut bullets = context.bullets().clone();
    let mut token_index: BTreeMap<String, HashSet<String>> = bullets
        .iter()
        .map(|(id, b)| (id.clone(), tokenize(&b.content)))
        .collect();

    let mut inserted = 0usize;
    let mut folded = 0usize;

    for candidate in &delta.bullets {
        let candidate_tokens = tokenize(&candidate.content);
        let duplicate_of = token_index
            .iter()
            .find(|(_, existing)| {
                containment(&candidate_tokens, existing).is_some_and(|c| c >= threshold)
            })
            .map(|(id, _)| id.clone());

        let folded_into = duplicate_of
            .and_then(|id| bullets.get(&id).map(|b| b.with_feedback(true)))
            .map(|updated| (updated.id.clone(), updated));

        match folded_into {
            Some((id, updated)) => {
                bullets.insert(id, updated);
                folded += 1;
            }
            None => {
                token_index.insert(candidate.id.clone(), candidate_tokens);
                bullets.insert(candidate.id.clone(), candidate.clone());
                inserted += 1;
            }
        }
    }

    let next = context.successor(bullets);
    debug!(
        inserted,
        folded,
        version = next.version(),
        "Merged delta into context"
    );
    next
}

/// Record one helpful (or harmful) vote on every listed bullet.
///
/// Ids may be full ids, the 8-character short ids shown in prompts, or any
/// prefix or suffix of at least that length; a partial id only counts when
/// it identifies exactly one bullet. Unknown ids are ignored. The version is
/// bumped even when nothing matched.
pub fn apply_feedback(context: &ContextState, ids: &[String], helpful: bool) -> ContextState {
    let mut bullets = context.bullets().clone();
    let mut seen = HashSet::new();

    for raw in ids {
        let Some(id) = resolve_id(&bullets, raw.trim()) else {
            debug!(id = %raw, "Feedback for unknown bullet ignored");
            continue;
        };
        if !seen.insert(id.clone()) {
            continue;
        }
        if let Some(existing) = bullets.get(&id) {
            let updated = existing.with_feedback(helpful);
            bullets.insert(id, updated);
        }
    }

    context.successor(bullets)
}


fn resolve_id(bullets: &BTreeMap<String, Bullet>, id: &str) -> Option<String> {
    if id.is_empty() {
        return None;
    }
    if bullets.contains_key(id) {
        return Some(id.to_string());
    }
    if id.chars().count() < SHORT_ID_LEN {
        return None;
    }

    let mut matches = bullets
        .keys()
        .filter(|key| key.starts_with(id) || key.ends_with(id));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only.clone()),
        _ => None,
    }
}
