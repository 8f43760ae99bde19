//! Context curation for ACE.
//!
//! Everything here is a pure function over [`ContextState`] snapshots: no
//! I/O, no locking, no mutation of inputs. Each transformation returns a new
//! context whose version is exactly one higher than its input.
//!
//! [`ContextState`]: ace_core::ContextState

pub mod delta;
pub mod merge;
pub mod prune;
pub mod retrieval;
pub mod scoring;
pub mod stats;
pub mod tokens;

pub use delta::{DEFAULT_MIN_CONFIDENCE, insights_to_delta};
pub use merge::{
    DUPLICATE_THRESHOLD, apply_feedback, containment, find_duplicate, merge_delta,
    merge_delta_with_threshold,
};
pub use prune::{
    DEFAULT_MAX_SIZE, DEFAULT_MIN_DAYS_OLD, grow_and_refine, limit_size, limit_size_at,
    prune_low_quality, prune_low_quality_at, retention_score,
};
pub use retrieval::{DEFAULT_MAX_BULLETS, get_relevant_bullets};
pub use scoring::score;
pub use stats::ContextStats;
pub use tokens::tokenize;
