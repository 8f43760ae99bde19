//! Reflector role: distill insights from a trajectory.

use std::sync::Arc;

use ace_core::{InferenceBackend, InferenceError, Insight, Trajectory};
use tracing::debug;

use crate::parser::parse_insights;
use crate::prompt::reflection_prompt;

pub struct Reflector {
    backend: Arc<dyn InferenceBackend>,
}

impl Reflector {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self { backend }
    }

    /// Ask the backend what the trajectory teaches. Never returns an empty
    /// list on success.
    pub async fn reflect(&self, trajectory: &Trajectory) -> Result<Vec<Insight>, InferenceError> {
        let raw = self
            .backend
            .generate(&reflection_prompt(trajectory), false)
            .await?;
        let insights = parse_insights(&raw, &trajectory.query);
        debug!(count = insights.len(), "Reflected on trajectory");
        Ok(insights)
    }
}
