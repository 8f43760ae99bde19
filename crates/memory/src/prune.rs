//! Grow-and-refine: quality pruning and size limiting.

use ace_core::{Bullet, ContextState};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Neutral bullets older than this many days are pruned by default.
pub const DEFAULT_MIN_DAYS_OLD: i64 = 30;

/// Default upper bound on the number of bullets in a context.
pub const DEFAULT_MAX_SIZE: usize = 1000;

/// Bullets younger than this many days receive a recency bonus.
const RECENCY_WINDOW_DAYS: i64 = 7;

const RECENCY_WEIGHT: f64 = 0.1;

/// Drop bullets that have not earned their place.
///
/// Kept: bullets with more helpful than harmful votes, and neutral bullets
/// (no votes at all) at most `min_days_old` whole days old. Everything else
/// is removed, including tied bullets that have votes.
pub fn prune_low_quality(context: &ContextState, min_days_old: i64) -> ContextState {
    prune_low_quality_at(context, min_days_old, Utc::now())
}

/// [`prune_low_quality`] with an explicit clock.
pub fn prune_low_quality_at(
    context: &ContextState,
    min_days_old: i64,
    now: DateTime<Utc>,
) -> ContextState {
    let kept = context
        .bullets()
        .iter()
        .filter(|(_, b)| {
            b.helpful_count > b.harmful_count
                || (b.is_neutral() && b.age_days(now) <= min_days_old)
        })
        .map(|(id, b)| (id.clone(), b.clone()))
        .collect();

    let next = context.successor(kept);
    debug!(
        before = context.len(),
        after = next.len(),
        version = next.version(),
        "Pruned low-quality bullets"
    );
    next
}

/// Retention score used by [`limit_size`]: net feedback plus a small bonus
/// for bullets created within the last week.
pub fn retention_score(bullet: &Bullet, now: DateTime<Utc>) -> f64 {
    let recency_days = (RECENCY_WINDOW_DAYS - bullet.age_days(now)).max(0);
    bullet.net_feedback() as f64 + recency_days as f64 * RECENCY_WEIGHT
}

/// Keep at most `max_size` bullets, highest retention score first.
///
/// A context already within the limit keeps every bullet; the version is
/// bumped either way.
pub fn limit_size(context: &ContextState, max_size: usize) -> ContextState {
    limit_size_at(context, max_size, Utc::now())
}

/// [`limit_size`] with an explicit clock.
pub fn limit_size_at(context: &ContextState, max_size: usize, now: DateTime<Utc>) -> ContextState {
    if context.len() <= max_size {
        return context.successor(context.bullets().clone());
    }

    let mut scored: Vec<(f64, &Bullet)> = context
        .iter()
        .map(|b| (retention_score(b, now), b))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(max_size);

    let kept = scored
        .into_iter()
        .map(|(_, b)| (b.id.clone(), b.clone()))
        .collect();

    let next = context.successor(kept);
    debug!(
        before = context.len(),
        after = next.len(),
        max_size,
        "Limited context size"
    );
    next
}

/// Prune, then limit. Advances the version by two.
pub fn grow_and_refine(context: &ContextState, min_days_old: i64, max_size: usize) -> ContextState {
    let now = Utc::now();
    let pruned = prune_low_quality_at(context, min_days_old, now);
    limit_size_at(&pruned, max_size, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn aged(id: &str, helpful: u32, harmful: u32, days: i64, now: DateTime<Utc>) -> Bullet {
        let mut b = Bullet::with_id(id, format!("bullet {id}"));
        b.helpful_count = helpful;
        b.harmful_count = harmful;
        b.created_at = now - Duration::days(days);
        b
    }

    #[test]
    fn prune_keeps_helpful_and_recent_neutral() {
        let now = Utc::now();
        let ctx = ContextState::from_bullets([
            aged("helpful_old", 3, 1, 400, now),
            aged("neutral_recent", 0, 0, 30, now),
            aged("neutral_old", 0, 0, 31, now),
            aged("tied", 2, 2, 1, now),
            aged("harmful_new", 0, 1, 0, now),
        ]);
        let pruned = prune_low_quality_at(&ctx, DEFAULT_MIN_DAYS_OLD, now);

        let ids: Vec<&str> = pruned.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["helpful_old", "neutral_recent"]);
        assert_eq!(pruned.version(), ctx.version() + 1);
    }

    #[test]
    fn harmful_bullet_removed_regardless_of_age() {
        let now = Utc::now();
        for days in [0, 5, 29, 365] {
            let ctx = ContextState::from_bullets([aged("h", 0, 1, days, now)]);
            assert!(prune_low_quality_at(&ctx, DEFAULT_MIN_DAYS_OLD, now).is_empty());
        }
    }

    #[test]
    fn prune_bumps_version_even_when_nothing_removed() {
        let now = Utc::now();
        let ctx = ContextState::from_bullets([aged("a", 1, 0, 1, now)]);
        let pruned = prune_low_quality_at(&ctx, DEFAULT_MIN_DAYS_OLD, now);
        assert_eq!(pruned.bullets(), ctx.bullets());
        assert_eq!(pruned.version(), 1);
    }

    #[test]
    fn limit_is_noop_within_bound() {
        let now = Utc::now();
        let ctx = ContextState::from_bullets([aged("a", 0, 0, 1, now), aged("b", 1, 0, 2, now)]);
        let limited = limit_size_at(&ctx, 2, now);
        assert_eq!(limited.bullets(), ctx.bullets());
        assert_eq!(limited.version(), ctx.version() + 1);
    }

    #[test]
    fn limit_keeps_top_scores() {
        let now = Utc::now();
        let ctx = ContextState::from_bullets([
            aged("old_neutral", 0, 0, 100, now),
            aged("new_neutral", 0, 0, 0, now),
            aged("old_helpful", 2, 0, 100, now),
            aged("old_harmful", 0, 3, 100, now),
            aged("week_old", 0, 0, 6, now),
        ]);
        let limited = limit_size_at(&ctx, 3, now);
        assert_eq!(limited.len(), 3);
        assert!(limited.contains("old_helpful"));
        assert!(limited.contains("new_neutral"));
        assert!(limited.contains("week_old"));

        let min_kept = limited
            .iter()
            .map(|b| retention_score(b, now))
            .fold(f64::INFINITY, f64::min);
        for dropped in ctx.iter().filter(|b| !limited.contains(&b.id)) {
            assert!(retention_score(dropped, now) <= min_kept);
        }
    }

    #[test]
    fn retention_score_recency_bonus() {
        let now = Utc::now();
        assert!((retention_score(&aged("x", 0, 0, 0, now), now) - 0.7).abs() < 1e-9);
        assert!((retention_score(&aged("x", 1, 0, 6, now), now) - 1.1).abs() < 1e-9);
        assert!((retention_score(&aged("x", 0, 0, 30, now), now)).abs() < 1e-9);
    }

    #[test]
    fn grow_and_refine_bounds_context() {
        let now = Utc::now();
        let ctx = ContextState::from_bullets(
            (0..20).map(|i| aged(&format!("b{i:02}"), i % 3, 0, i64::from(i), now)),
        );
        let refined = grow_and_refine(&ctx, DEFAULT_MIN_DAYS_OLD, 5);
        assert_eq!(refined.len(), 5);
        assert_eq!(refined.version(), ctx.version() + 2);
    }
}
