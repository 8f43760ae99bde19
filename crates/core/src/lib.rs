//! # ACE Core
//!
//! Domain types, traits, and error definitions for the ACE (Agentic Context
//! Engineering) runtime. This crate has **no framework dependencies**: it
//! defines the value types every other crate works against.
//!
//! ## Design Philosophy
//!
//! - Every value here is immutable once built. "Updating" a bullet or a
//!   context produces a new value; nothing is mutated in place.
//! - The inference backend is a trait so the pipeline can be driven by the
//!   Ollama client in production and by scripted mocks in tests.

pub mod bullet;
pub mod context;
pub mod error;
pub mod inference;
pub mod trajectory;

// Re-export key types at crate root for ergonomics
pub use bullet::{Bullet, SHORT_ID_LEN};
pub use context::ContextState;
pub use error::{Error, InferenceError, Result};
pub use inference::{ChunkKind, ChunkReceiver, InferenceBackend, StreamChunk};
pub use trajectory::{DeltaUpdate, Insight, InsightType, ReasoningStep, Trajectory};
