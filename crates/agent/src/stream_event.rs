//! Pipeline-level streaming events.
//!
//! `PipelineEvent` wraps backend stream chunks into events a front end can
//! render directly: answer text, reasoning text, the markers separating
//! them, and the final curation result.

use ace_core::ChunkKind;
use serde::{Deserialize, Serialize};

/// Marker emitted when the model starts reasoning.
pub const THINKING_MARKER: &str = "[Thinking...]";

/// Marker emitted when the model switches from reasoning to its answer.
pub const ANSWER_MARKER: &str = "[Answer:]";

/// Events emitted while a query is processed in streaming mode.
///
/// - `chunk`     — partial answer text
/// - `reasoning` — partial extended-reasoning text
/// - `marker`    — reasoning started or ended
/// - `curated`   — the run finished and the context was updated
/// - `error`     — generation or reflection failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    Chunk { content: String },

    Reasoning { content: String },

    Marker { label: String },

    Curated { version: u64, new_bullets: usize },

    Error { message: String },
}

impl PipelineEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Chunk { .. } => "chunk",
            Self::Reasoning { .. } => "reasoning",
            Self::Marker { .. } => "marker",
            Self::Curated { .. } => "curated",
            Self::Error { .. } => "error",
        }
    }
}

/// Tracks whether the stream is inside a reasoning segment.
#[derive(Debug, Default)]
pub struct ReasoningTracker {
    in_reasoning: bool,
}

impl ReasoningTracker {
    /// Marker to emit before a non-empty chunk of `kind`, if the segment
    /// changes.
    pub fn observe(&mut self, kind: ChunkKind) -> Option<&'static str> {
        match (kind, self.in_reasoning) {
            (ChunkKind::Reasoning, false) => {
                self.in_reasoning = true;
                Some(THINKING_MARKER)
            }
            (ChunkKind::Answer, true) => {
                self.in_reasoning = false;
                Some(ANSWER_MARKER)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_chunk() {
        let event = PipelineEvent::Chunk {
            content: "Hello".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"chunk""#));
        assert!(json.contains(r#""content":"Hello""#));
    }

    #[test]
    fn event_serialization_curated() {
        let event = PipelineEvent::Curated {
            version: 4,
            new_bullets: 1,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"curated""#));
        assert!(json.contains(r#""version":4"#));
        assert_eq!(event.event_type(), "curated");
    }

    #[test]
    fn event_roundtrip_marker() {
        let event = PipelineEvent::Marker {
            label: THINKING_MARKER.into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: PipelineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn markers_bracket_each_reasoning_segment() {
        let mut tracker = ReasoningTracker::default();
        assert_eq!(tracker.observe(ChunkKind::Answer), None);
        assert_eq!(tracker.observe(ChunkKind::Reasoning), Some(THINKING_MARKER));
        assert_eq!(tracker.observe(ChunkKind::Reasoning), None);
        assert_eq!(tracker.observe(ChunkKind::Answer), Some(ANSWER_MARKER));
        assert_eq!(tracker.observe(ChunkKind::Answer), None);
        assert_eq!(tracker.observe(ChunkKind::Reasoning), Some(THINKING_MARKER));
    }
}
