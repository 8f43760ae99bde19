//! Summary statistics over a context snapshot.

use ace_core::ContextState;
use serde::{Deserialize, Serialize};

/// Aggregate view of a context, for status output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextStats {
    pub total_bullets: usize,
    /// Bullets with more helpful than harmful votes
    pub helpful_bullets: usize,
    pub version: u64,
    /// Mean helpful votes per bullet (0 for an empty context)
    pub avg_helpfulness: f64,
}

impl ContextStats {
    pub fn from_context(context: &ContextState) -> Self {
        let helpful_bullets = context
            .iter()
            .filter(|b| b.helpful_count > b.harmful_count)
            .count();
        let helpful_votes: u64 = context.iter().map(|b| u64::from(b.helpful_count)).sum();

        Self {
            total_bullets: context.len(),
            helpful_bullets,
            version: context.version(),
            avg_helpfulness: helpful_votes as f64 / context.len().max(1) as f64,
        }
    }
}
