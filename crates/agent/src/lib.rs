//! The ACE learning loop.
//!
//! Every query goes through **Generate → Reflect → Curate**:
//!
//! 1. **Generate**: retrieve relevant bullets and ask the model for a
//!    structured trajectory
//! 2. **Reflect**: ask the model what the trajectory teaches
//! 3. **Curate**: fold the lessons into the context, vote on the bullets the
//!    model relied on, and periodically prune
//!
//! The context only changes in step 3, so a failed or cancelled run leaves
//! it exactly as it was.

pub mod curator;
pub mod generator;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod reflector;
pub mod stream_event;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use curator::Curator;
pub use generator::Generator;
pub use parser::{parse_insights, parse_trajectory};
pub use pipeline::{
    AcePipeline, IterationReport, LearningReport, PipelineError, PipelineOutcome, PipelineState,
    QueryResult,
};
pub use prompt::build_context_prompt;
pub use reflector::Reflector;
pub use stream_event::{ANSWER_MARKER, PipelineEvent, ReasoningTracker, THINKING_MARKER};
