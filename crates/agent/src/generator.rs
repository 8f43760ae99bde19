//! Generator role: retrieve relevant bullets and produce a trajectory.

use std::sync::Arc;

use ace_core::{ContextState, InferenceBackend, InferenceError, Trajectory};
use ace_memory::get_relevant_bullets;
use tracing::debug;

use crate::parser::parse_trajectory;
use crate::prompt::{build_context_prompt, trajectory_prompt};

pub struct Generator {
    backend: Arc<dyn InferenceBackend>,
    max_bullets: usize,
}

impl Generator {
    pub fn new(backend: Arc<dyn InferenceBackend>, max_bullets: usize) -> Self {
        Self {
            backend,
            max_bullets,
        }
    }

    /// Build the generation prompt for `query` against a context snapshot.
    pub fn prompt_for(&self, query: &str, context: &ContextState) -> String {
        let relevant = get_relevant_bullets(context, query, self.max_bullets);
        debug!(
            retrieved = relevant.len(),
            version = context.version(),
            "Retrieved context for query"
        );
        trajectory_prompt(query, &build_context_prompt(&relevant))
    }

    /// Ask the backend for a trajectory answering `query`.
    pub async fn generate_trajectory(
        &self,
        query: &str,
        context: &ContextState,
    ) -> Result<Trajectory, InferenceError> {
        let prompt = self.prompt_for(query, context);
        let raw = self.backend.generate(&prompt, false).await?;
        Ok(parse_trajectory(query, &raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedBackend;
    use ace_core::Bullet;

    #[tokio::test]
    async fn prompt_contains_relevant_bullets_only() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let generator = Generator::new(backend, 10);
        let ctx = ContextState::from_bullets([
            Bullet::with_id("b1", "sort the list first"),
            Bullet::with_id("b2", "unrelated advice"),
        ]);

        let prompt = generator.prompt_for("how do I sort a list", &ctx);
        assert!(prompt.contains("[b1] sort the list first"));
        assert!(!prompt.contains("unrelated advice"));
    }

    #[tokio::test]
    async fn generates_parsed_trajectory() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(
            "STEPS: [think]\nOUTCOME: 4\nSUCCESS: true".into(),
        )]));
        let generator = Generator::new(backend.clone(), 10);

        let t = generator
            .generate_trajectory("2+2?", &ContextState::new())
            .await
            .unwrap();
        assert_eq!(t.outcome, "4");
        assert!(backend.prompts()[0].contains("No previous context available."));
    }

    #[tokio::test]
    async fn backend_error_propagates() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(InferenceError::Timeout("120s".into()))]));
        let generator = Generator::new(backend, 10);
        let err = generator
            .generate_trajectory("q", &ContextState::new())
            .await
            .unwrap_err();
        assert_eq!(err, InferenceError::Timeout("120s".into()));
    }
}
