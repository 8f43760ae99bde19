//! Prompt templates for generation and reflection.

use ace_core::{Bullet, DeltaUpdate, Trajectory};

const NO_CONTEXT: &str = "No previous context available.";

/// Steps quoted back to the model during reflection.
const REFLECTION_STEPS: usize = 3;

/// Render retrieved bullets one per line as
/// `[<short id>] <content> (helpful: h, harmful: x)`.
pub fn build_context_prompt(bullets: &[Bullet]) -> String {
    if bullets.is_empty() {
        return NO_CONTEXT.to_string();
    }

    bullets
        .iter()
        .map(|b| {
            format!(
                "[{}] {} (helpful: {}, harmful: {})",
                b.short_id(),
                b.content,
                b.helpful_count,
                b.harmful_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt asking the model to answer `query` in the trajectory format.
pub fn trajectory_prompt(query: &str, context: &str) -> String {
    format!(
        "Relevant lessons from previous tasks:\n\
         {context}\n\
         \n\
         Task: {query}\n\
         \n\
         Answer briefly in exactly this format:\n\
         STEPS: [first step; second step; third step]\n\
         OUTCOME: your answer on one line\n\
         SUCCESS: true or false\n\
         USED_BULLETS: [ids of the lessons you relied on, comma separated]"
    )
}

/// Prompt asking the model to distill insights from a trajectory.
pub fn reflection_prompt(trajectory: &Trajectory) -> String {
    let steps = trajectory
        .steps
        .iter()
        .take(REFLECTION_STEPS)
        .map(|s| s.description.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    let feedback = trajectory
        .feedback
        .as_deref()
        .map(|f| format!("User feedback: {f}\n"))
        .unwrap_or_default();

    format!(
        "Task: {query}\n\
         Steps: {steps}\n\
         Result: {outcome}\n\
         Succeeded: {success}\n\
         {feedback}\
         \n\
         State the key lessons from this task, one per line, in this format:\n\
         [Content: the lesson; Type: strategy, failure_mode or optimization; Confidence: 0.0 to 1.0]",
        query = trajectory.query,
        outcome = trajectory.outcome,
        success = trajectory.success,
    )
}

/// Prompt for a free-form answer with extended reasoning.
pub fn think_prompt(query: &str) -> String {
    format!("Think through this carefully, then give a concise final answer.\n\n{query}")
}

/// Human-readable result of one pipeline run.
pub fn summarize(trajectory: &Trajectory, delta: &DeltaUpdate) -> String {
    format!(
        "Trajectory: {}\n\nOutcome: {}\nSuccess: {}\nNew insights: {}",
        trajectory.steps_text(),
        trajectory.outcome,
        trajectory.success,
        delta.len()
    )
}
