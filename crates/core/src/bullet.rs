//! Bullets — the individual insight records a context is made of.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Characters of the id shown to the model.
pub const SHORT_ID_LEN: usize = 8;

/// A single curated insight with its feedback counters.
///
/// Bullets are values: the feedback helpers return a new bullet that keeps
/// the same `id`, `content`, `created_at` and `tags`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Unique ID within a context
    pub id: String,

    /// The insight text
    pub content: String,

    /// Times this bullet was confirmed useful
    #[serde(default)]
    pub helpful_count: u32,

    /// Times this bullet was used in a failed run
    #[serde(default)]
    pub harmful_count: u32,

    /// When this bullet was created
    pub created_at: DateTime<Utc>,

    /// Insight type and other labels
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Bullet {
    /// Create a fresh bullet with a new time-ordered id and zero counters.
    pub fn new(content: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            content: content.into(),
            helpful_count: 0,
            harmful_count: 0,
            created_at: Utc::now(),
            tags,
        }
    }

    /// Create a bullet with an explicit id (imports, fixtures).
    pub fn with_id(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::new(content, Vec::new())
        }
    }

    /// Return a copy with one more helpful (or harmful) vote.
    pub fn with_feedback(&self, helpful: bool) -> Self {
        let mut next = self.clone();
        if helpful {
            next.helpful_count = next.helpful_count.saturating_add(1);
        } else {
            next.harmful_count = next.harmful_count.saturating_add(1);
        }
        next
    }

    /// Helpful minus harmful votes.
    pub fn net_feedback(&self) -> i64 {
        i64::from(self.helpful_count) - i64::from(self.harmful_count)
    }

    /// True when no feedback has been recorded either way.
    pub fn is_neutral(&self) -> bool {
        self.helpful_count == 0 && self.harmful_count == 0
    }

    /// Age in whole days relative to `now`.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days()
    }

    /// Short id shown to the model in prompts: the last 8 characters.
    ///
    /// The leading characters of a v7 id encode its creation time and are
    /// shared by every bullet made within the same minute; the tail is random.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().rev().nth(SHORT_ID_LEN - 1) {
            Some((idx, _)) => &self.id[idx..],
            None => &self.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn new_bullets_have_unique_ids() {
        let a = Bullet::new("Always validate input", vec!["strategy".into()]);
        let b = Bullet::new("Always validate input", vec!["strategy".into()]);
        assert_ne!(a.id, b.id);
        assert!(a.is_neutral());
        assert_eq!(a.tags, vec!["strategy".to_string()]);
    }

    #[test]
    fn feedback_returns_new_value() {
        let original = Bullet::with_id("b1", "Handle errors gracefully");
        let helped = original.with_feedback(true);
        let harmed = helped.with_feedback(false);

        assert_eq!(original.helpful_count, 0);
        assert_eq!(helped.helpful_count, 1);
        assert_eq!(harmed.helpful_count, 1);
        assert_eq!(harmed.harmful_count, 1);
        assert_eq!(harmed.id, original.id);
        assert_eq!(harmed.created_at, original.created_at);
        assert_eq!(harmed.net_feedback(), 0);
        assert!(!harmed.is_neutral());
    }

    #[test]
    fn age_in_whole_days() {
        let mut bullet = Bullet::with_id("b1", "old");
        let now = Utc::now();
        bullet.created_at = now - Duration::hours(49);
        assert_eq!(bullet.age_days(now), 2);
    }

    #[test]
    fn short_id_keeps_the_tail() {
        let bullet = Bullet::with_id("0123456789abcdef", "x");
        assert_eq!(bullet.short_id(), "89abcdef");
        let short = Bullet::with_id("b1", "x");
        assert_eq!(short.short_id(), "b1");
    }

    #[test]
    fn short_ids_differ_for_bullets_made_together() {
        let a = Bullet::new("first lesson", vec![]);
        let b = Bullet::new("second lesson", vec![]);
        assert_eq!(a.short_id().len(), SHORT_ID_LEN);
        assert_ne!(a.short_id(), b.short_id());
    }
}
