//! Curator role: owns the current context snapshot and applies every
//! change to it.
//!
//! Each operation derives a new [`ContextState`] and swaps the shared
//! snapshot, so readers holding an earlier `Arc` never observe a partial
//! update.

use std::sync::Arc;

use ace_config::CuratorConfig;
use ace_core::{ContextState, DeltaUpdate, Insight, Trajectory};
use ace_memory::{
    ContextStats, apply_feedback, grow_and_refine, insights_to_delta, merge_delta_with_threshold,
};
use tracing::{debug, info};

pub struct Curator {
    context: Arc<ContextState>,
    config: CuratorConfig,
    /// Curations since the last grow-and-refine
    since_refine: u32,
}

impl Curator {
    pub fn new(config: CuratorConfig) -> Self {
        Self::with_context(ContextState::new(), config)
    }

    /// Start from an existing context, e.g. one loaded from disk.
    pub fn with_context(context: ContextState, config: CuratorConfig) -> Self {
        Self {
            context: Arc::new(context),
            config,
            since_refine: 0,
        }
    }

    /// The current context. Cheap to clone and safe to hold across updates.
    pub fn snapshot(&self) -> Arc<ContextState> {
        Arc::clone(&self.context)
    }

    pub fn config(&self) -> &CuratorConfig {
        &self.config
    }

    pub fn stats(&self) -> ContextStats {
        ContextStats::from_context(&self.context)
    }

    /// Turn insights into a delta using the configured confidence floor.
    pub fn create_delta(&self, insights: &[Insight]) -> DeltaUpdate {
        insights_to_delta(insights, self.config.min_confidence)
    }

    pub fn apply_delta(&mut self, delta: &DeltaUpdate) -> Arc<ContextState> {
        let next = merge_delta_with_threshold(&self.context, delta, self.config.duplicate_threshold);
        self.replace(next)
    }

    /// Record one vote on each listed bullet: helpful when `success`.
    pub fn update_feedback(&mut self, bullet_ids: &[String], success: bool) -> Arc<ContextState> {
        let next = apply_feedback(&self.context, bullet_ids, success);
        self.replace(next)
    }

    pub fn grow_and_refine(&mut self) -> Arc<ContextState> {
        let next = grow_and_refine(
            &self.context,
            self.config.prune_min_days,
            self.config.max_context_size,
        );
        self.since_refine = 0;
        info!(
            bullets = next.len(),
            version = next.version(),
            "Refined context"
        );
        self.replace(next)
    }

    /// The full curation step for one run: merge the reflected insights,
    /// credit (or blame) the bullets the trajectory used, and refine when
    /// the configured interval is reached.
    ///
    /// Runs synchronously, so the caller can hold its lock across it
    /// without yielding.
    pub fn curate(
        &mut self,
        insights: &[Insight],
        trajectory: &Trajectory,
    ) -> (DeltaUpdate, Arc<ContextState>) {
        let delta = self.create_delta(insights);
        self.apply_delta(&delta);
        let mut context = self.update_feedback(&trajectory.used_bullets, trajectory.success);

        self.since_refine += 1;
        if self.config.refine_interval > 0 && self.since_refine >= self.config.refine_interval {
            context = self.grow_and_refine();
        }

        debug!(
            new_bullets = delta.len(),
            version = context.version(),
            "Curated run"
        );
        (delta, context)
    }

    fn replace(&mut self, next: ContextState) -> Arc<ContextState> {
        self.context = Arc::new(next);
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ace_core::{Bullet, InsightType};

    fn insight(content: &str, confidence: f64) -> Insight {
        Insight {
            content: content.into(),
            insight_type: InsightType::Strategy,
            confidence,
            source_id: "q".into(),
        }
    }

    fn trajectory(used: &[&str], success: bool) -> Trajectory {
        Trajectory {
            query: "q".into(),
            steps: vec![],
            outcome: "done".into(),
            success,
            used_bullets: used.iter().map(|s| s.to_string()).collect(),
            feedback: None,
        }
    }

    fn no_refine() -> CuratorConfig {
        CuratorConfig {
            refine_interval: 0,
            ..CuratorConfig::default()
        }
    }

    #[test]
    fn curate_merges_and_credits_used_bullets() {
        let ctx = ContextState::from_bullets([Bullet::with_id("b1", "check the docs")]);
        let mut curator = Curator::with_context(ctx, no_refine());
        let before = curator.snapshot();

        let (delta, after) = curator.curate(
            &[insight("write tests first", 0.9), insight("guess wildly", 0.2)],
            &trajectory(&["b1"], true),
        );

        assert_eq!(delta.len(), 1);
        assert_eq!(after.len(), 2);
        assert_eq!(after.version(), before.version() + 2);
        assert_eq!(after.get("b1").unwrap().helpful_count, 1);
        // Old snapshot untouched.
        assert_eq!(before.get("b1").unwrap().helpful_count, 0);
        assert_eq!(before.len(), 1);
    }

    #[test]
    fn failed_trajectory_blames_used_bullets() {
        let ctx = ContextState::from_bullets([Bullet::with_id("b1", "check the docs")]);
        let mut curator = Curator::with_context(ctx, no_refine());
        let (_, after) = curator.curate(&[], &trajectory(&["b1"], false));
        assert_eq!(after.get("b1").unwrap().harmful_count, 1);
    }

    #[test]
    fn refine_runs_on_interval() {
        let config = CuratorConfig {
            refine_interval: 2,
            max_context_size: 1,
            ..CuratorConfig::default()
        };
        let mut curator = Curator::new(config);

        let (_, first) = curator.curate(&[insight("alpha beta", 0.9)], &trajectory(&[], true));
        assert_eq!(first.version(), 2);

        let (_, second) = curator.curate(&[insight("gamma delta", 0.9)], &trajectory(&[], true));
        // merge + feedback + prune + limit
        assert_eq!(second.version(), 6);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn stats_reflect_current_snapshot() {
        let mut curator = Curator::new(no_refine());
        curator.apply_delta(&DeltaUpdate::new(vec![Bullet::new("one", vec![])]));
        let stats = curator.stats();
        assert_eq!(stats.total_bullets, 1);
        assert_eq!(stats.version, 1);
    }
}
