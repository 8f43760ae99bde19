//! Transient records produced while processing one query: trajectories,
//! insights, and the delta proposed to the context.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bullet::Bullet;

/// A single reasoning step reported by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl ReasoningStep {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The structured record of how one query was answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// The user query this trajectory answers
    pub query: String,

    /// Reasoning steps, in order
    pub steps: Vec<ReasoningStep>,

    /// The final answer text
    pub outcome: String,

    /// Whether the model considered the task solved
    pub success: bool,

    /// Ids of context bullets the model says it relied on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub used_bullets: Vec<String>,

    /// Optional feedback supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl Trajectory {
    /// Return a copy carrying caller feedback.
    pub fn with_feedback(self, feedback: impl Into<String>) -> Self {
        Self {
            feedback: Some(feedback.into()),
            ..self
        }
    }

    /// Step descriptions joined with `"; "`.
    pub fn steps_text(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.description.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Kind of lesson an insight captures.
///
/// Unknown labels coming back from the model are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InsightType {
    Strategy,
    FailureMode,
    Optimization,
    Other(String),
}

impl InsightType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Strategy => "strategy",
            Self::FailureMode => "failure_mode",
            Self::Optimization => "optimization",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for InsightType {
    fn from(label: String) -> Self {
        match label.to_lowercase().as_str() {
            "strategy" => Self::Strategy,
            "failure_mode" => Self::FailureMode,
            "optimization" => Self::Optimization,
            _ => Self::Other(label),
        }
    }
}

impl From<&str> for InsightType {
    fn from(label: &str) -> Self {
        Self::from(label.to_string())
    }
}

impl From<InsightType> for String {
    fn from(kind: InsightType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lesson distilled from a trajectory; a candidate bullet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub content: String,
    pub insight_type: InsightType,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// What produced the insight (the originating query)
    pub source_id: String,
}

/// A proposed change to a context. Applied whole or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaUpdate {
    pub bullets: Vec<Bullet>,
    pub timestamp: DateTime<Utc>,
}

impl DeltaUpdate {
    pub fn new(bullets: Vec<Bullet>) -> Self {
        Self {
            bullets,
            timestamp: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.bullets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty()
    }
}
