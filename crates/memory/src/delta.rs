//! Turning reflected insights into candidate bullets.

use ace_core::{Bullet, DeltaUpdate, Insight};
use tracing::debug;

/// Insights below this confidence are discarded by default.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// Build a delta holding one fresh bullet per insight with
/// `confidence >= min_confidence`, in input order.
pub fn insights_to_delta(insights: &[Insight], min_confidence: f64) -> DeltaUpdate {
    let bullets: Vec<Bullet> = insights
        .iter()
        .filter(|insight| insight.confidence >= min_confidence)
        .map(|insight| {
            Bullet::new(
                insight.content.clone(),
                vec![insight.insight_type.to_string()],
            )
        })
        .collect();

    if bullets.len() < insights.len() {
        debug!(
            dropped = insights.len() - bullets.len(),
            min_confidence, "Discarded low-confidence insights"
        );
    }

    DeltaUpdate::new(bullets)
}
