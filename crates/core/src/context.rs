//! The versioned, immutable bullet container.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bullet::Bullet;

/// An immutable snapshot of the curated context.
///
/// Bullets are keyed by id and iterate in ascending id order. Bullet ids are
/// UUIDv7, so for generated bullets this is also creation order. The
/// deduplicator relies on this order being stable.
///
/// Every transformation goes through [`ContextState::successor`], which
/// returns a new instance with `version + 1`.
///
/// Deserializing rejects snapshots whose map keys differ from the ids of the
/// bullets stored under them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SavedContext")]
pub struct ContextState {
    bullets: BTreeMap<String, Bullet>,
    version: u64,
}

/// Wire form of a [`ContextState`], checked before it becomes one.
#[derive(Deserialize)]
struct SavedContext {
    bullets: BTreeMap<String, Bullet>,
    #[serde(default)]
    version: u64,
}

impl TryFrom<SavedContext> for ContextState {
    type Error = String;

    fn try_from(saved: SavedContext) -> Result<Self, Self::Error> {
        if let Some((key, bullet)) = saved.bullets.iter().find(|(key, b)| **key != b.id) {
            return Err(format!(
                "bullet stored under key '{key}' has id '{}'",
                bullet.id
            ));
        }
        Ok(Self {
            bullets: saved.bullets,
            version: saved.version,
        })
    }
}

impl ContextState {
    /// An empty context at version 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a version-0 context from bullets. Later bullets replace earlier
    /// ones with the same id.
    pub fn from_bullets(bullets: impl IntoIterator<Item = Bullet>) -> Self {
        Self {
            bullets: bullets.into_iter().map(|b| (b.id.clone(), b)).collect(),
            version: 0,
        }
    }

    /// The next state in this lineage: the given bullets at `version + 1`.
    pub fn successor(&self, bullets: BTreeMap<String, Bullet>) -> Self {
        Self {
            bullets,
            version: self.version.saturating_add(1),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn bullets(&self) -> &BTreeMap<String, Bullet> {
        &self.bullets
    }

    pub fn get(&self, id: &str) -> Option<&Bullet> {
        self.bullets.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.bullets.contains_key(id)
    }

    /// Bullets in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Bullet> {
        self.bullets.values()
    }

    pub fn len(&self) -> usize {
        self.bullets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty()
    }
}
