//! The generate → reflect → curate pipeline.
//!
//! # Flow
//!
//! 1. Snapshot the current context and retrieve relevant bullets
//! 2. Generate a trajectory for the query (whole or streamed)
//! 3. Reflect on the trajectory to obtain insights
//! 4. Curate: merge the insights, vote on the bullets the model used, and
//!    periodically grow-and-refine
//!
//! Runs may overlap. Generation and reflection proceed independently; the
//! curation step takes the curator's write lock and never yields while
//! holding it, so every run's update is applied whole and none is lost.

use std::fmt;
use std::sync::Arc;

use ace_config::CuratorConfig;
use ace_core::{ChunkKind, ContextState, DeltaUpdate, InferenceBackend, InferenceError, Trajectory};
use ace_memory::ContextStats;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

use crate::curator::Curator;
use crate::generator::Generator;
use crate::parser::parse_trajectory;
use crate::prompt::{summarize, think_prompt};
use crate::reflector::Reflector;
use crate::stream_event::{PipelineEvent, ReasoningTracker};

/// Where a single run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Generating,
    Reflecting,
    Curating,
    Failed(String),
}

impl PipelineState {
    pub fn can_transition_to(&self, next: &PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Generating)
                | (Generating, Reflecting)
                | (Reflecting, Curating)
                | (Curating, Idle)
                | (Generating, Failed(_))
                | (Reflecting, Failed(_))
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Generating => f.write_str("generating"),
            Self::Reflecting => f.write_str("reflecting"),
            Self::Curating => f.write_str("curating"),
            Self::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// Why a run did not reach curation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("Generation failed: {0}")]
    Generation(InferenceError),

    #[error("Reflection failed: {0}")]
    Reflection(InferenceError),

    /// The stream consumer went away before the answer was complete.
    #[error("Run cancelled by the consumer")]
    Cancelled,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Human-readable summary of the trajectory and the learning step
    pub summary: String,
    pub trajectory: Trajectory,
    pub delta: DeltaUpdate,
    /// The context right after this run's curation
    pub context: Arc<ContextState>,
}

/// Per-query entry of a [`LearningReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryResult {
    Completed {
        query: String,
        response: String,
        new_bullets: usize,
    },
    Failed {
        query: String,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationReport {
    /// 1-based
    pub iteration: usize,
    pub results: Vec<QueryResult>,
    /// Bullets left after this iteration's grow-and-refine
    pub total_bullets: usize,
    pub version: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningReport {
    pub iterations: Vec<IterationReport>,
}

/// State walk of one run, logged at debug level.
struct Run<'q> {
    query: &'q str,
    state: PipelineState,
}

impl<'q> Run<'q> {
    fn start(query: &'q str) -> Self {
        let mut run = Self {
            query,
            state: PipelineState::Idle,
        };
        run.advance(PipelineState::Generating);
        run
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "invalid pipeline transition {} -> {}",
            self.state,
            next
        );
        debug!(query = self.query, from = %self.state, to = %next, "Pipeline transition");
        self.state = next;
    }

    fn fail(&mut self, error: PipelineError) -> PipelineError {
        warn!(query = self.query, error = %error, "Pipeline run failed");
        self.advance(PipelineState::Failed(error.to_string()));
        error
    }
}

/// The ACE orchestrator. Share it in an `Arc` to run queries concurrently.
pub struct AcePipeline {
    backend: Arc<dyn InferenceBackend>,
    generator: Generator,
    reflector: Reflector,
    curator: RwLock<Curator>,
}

impl AcePipeline {
    pub fn new(backend: Arc<dyn InferenceBackend>, config: CuratorConfig) -> Self {
        Self::with_context(backend, config, ContextState::new())
    }

    /// Start from a previously saved context.
    pub fn with_context(
        backend: Arc<dyn InferenceBackend>,
        config: CuratorConfig,
        context: ContextState,
    ) -> Self {
        Self {
            generator: Generator::new(Arc::clone(&backend), config.max_relevant_bullets),
            reflector: Reflector::new(Arc::clone(&backend)),
            curator: RwLock::new(Curator::with_context(context, config)),
            backend,
        }
    }

    pub async fn initialize(&self) -> Result<(), InferenceError> {
        info!(backend = self.backend.name(), "Initializing inference backend");
        self.backend.initialize().await
    }

    pub async fn shutdown(&self) -> Result<(), InferenceError> {
        info!(backend = self.backend.name(), "Shutting down inference backend");
        self.backend.shutdown().await
    }

    /// The current context.
    pub async fn snapshot(&self) -> Arc<ContextState> {
        self.curator.read().await.snapshot()
    }

    pub async fn context_stats(&self) -> ContextStats {
        self.curator.read().await.stats()
    }

    /// Prune and size-limit the context now.
    pub async fn grow_and_refine(&self) -> Arc<ContextState> {
        self.curator.write().await.grow_and_refine()
    }

    /// Answer `query`, learn from the answer, and update the context.
    pub async fn process_query(
        &self,
        query: &str,
        feedback: Option<&str>,
    ) -> Result<PipelineOutcome, PipelineError> {
        let mut run = Run::start(query);
        let snapshot = self.snapshot().await;

        let trajectory = match self.generator.generate_trajectory(query, &snapshot).await {
            Ok(trajectory) => with_feedback(trajectory, feedback),
            Err(e) => return Err(run.fail(PipelineError::Generation(e))),
        };

        self.reflect_and_curate(run, trajectory, None).await
    }

    /// Like [`process_query`](Self::process_query), forwarding generation
    /// output to `events` as it arrives.
    ///
    /// Dropping the receiving half stops the run with
    /// [`PipelineError::Cancelled`] before anything is curated.
    pub async fn process_query_stream(
        &self,
        query: &str,
        feedback: Option<&str>,
        events: mpsc::Sender<PipelineEvent>,
    ) -> Result<PipelineOutcome, PipelineError> {
        let mut run = Run::start(query);
        let prompt = {
            let snapshot = self.snapshot().await;
            self.generator.prompt_for(query, &snapshot)
        };

        let answer = match self.stream_answer(&prompt, &events).await {
            Ok(answer) => answer,
            Err(error) => {
                if error != PipelineError::Cancelled {
                    let _ = events
                        .send(PipelineEvent::Error {
                            message: error.to_string(),
                        })
                        .await;
                }
                return Err(run.fail(error));
            }
        };

        let trajectory = with_feedback(parse_trajectory(query, &answer), feedback);
        let outcome = self.reflect_and_curate(run, trajectory, Some(&events)).await;

        let event = match &outcome {
            Ok(outcome) => PipelineEvent::Curated {
                version: outcome.context.version(),
                new_bullets: outcome.delta.len(),
            },
            Err(PipelineError::Cancelled) => return outcome,
            Err(error) => PipelineEvent::Error {
                message: error.to_string(),
            },
        };
        let _ = events.send(event).await;

        outcome
    }

    /// Run every query `iterations` times, refining the context after each
    /// pass. Individual failures are recorded in the report.
    pub async fn adaptive_learning(&self, queries: &[String], iterations: usize) -> LearningReport {
        let mut report = LearningReport::default();

        for iteration in 1..=iterations {
            info!(iteration, iterations, queries = queries.len(), "Learning iteration");
            let mut results = Vec::with_capacity(queries.len());

            for query in queries {
                let result = match self.process_query(query, None).await {
                    Ok(outcome) => QueryResult::Completed {
                        query: query.clone(),
                        new_bullets: outcome.delta.len(),
                        response: outcome.summary,
                    },
                    Err(e) => QueryResult::Failed {
                        query: query.clone(),
                        error: e.to_string(),
                    },
                };
                results.push(result);
            }

            let context = self.grow_and_refine().await;
            report.iterations.push(IterationReport {
                iteration,
                results,
                total_bullets: context.len(),
                version: context.version(),
            });
        }

        report
    }

    /// One extended-reasoning completion. The context is not consulted or
    /// changed.
    pub async fn think(&self, query: &str) -> Result<String, InferenceError> {
        debug!(query, "Extended reasoning request");
        self.backend.generate(&think_prompt(query), true).await
    }

    /// When `events` is given, a consumer that has gone away by the time
    /// reflection finishes cancels the run before curation.
    async fn reflect_and_curate(
        &self,
        mut run: Run<'_>,
        trajectory: Trajectory,
        events: Option<&mpsc::Sender<PipelineEvent>>,
    ) -> Result<PipelineOutcome, PipelineError> {
        run.advance(PipelineState::Reflecting);
        let insights = match self.reflector.reflect(&trajectory).await {
            Ok(insights) => insights,
            Err(e) => return Err(run.fail(PipelineError::Reflection(e))),
        };

        if events.is_some_and(mpsc::Sender::is_closed) {
            return Err(run.fail(PipelineError::Cancelled));
        }

        run.advance(PipelineState::Curating);
        let (delta, context) = {
            let mut curator = self.curator.write().await;
            curator.curate(&insights, &trajectory)
        };
        run.advance(PipelineState::Idle);

        info!(
            query = run.query,
            success = trajectory.success,
            new_bullets = delta.len(),
            version = context.version(),
            "Query processed"
        );

        Ok(PipelineOutcome {
            summary: summarize(&trajectory, &delta),
            trajectory,
            delta,
            context,
        })
    }

    /// Forward the generation stream to `events`, returning the answer text.
    async fn stream_answer(
        &self,
        prompt: &str,
        events: &mpsc::Sender<PipelineEvent>,
    ) -> Result<String, PipelineError> {
        let mut chunks = self
            .backend
            .generate_stream(prompt, false)
            .await
            .map_err(PipelineError::Generation)?;

        let mut tracker = ReasoningTracker::default();
        let mut answer = String::new();

        while let Some(item) = chunks.recv().await {
            let chunk = item.map_err(PipelineError::Generation)?;

            if !chunk.text.is_empty() {
                if let Some(label) = tracker.observe(chunk.kind) {
                    forward(
                        events,
                        PipelineEvent::Marker {
                            label: label.to_string(),
                        },
                    )
                    .await?;
                }

                let event = match chunk.kind {
                    ChunkKind::Reasoning => PipelineEvent::Reasoning {
                        content: chunk.text,
                    },
                    ChunkKind::Answer => {
                        answer.push_str(&chunk.text);
                        PipelineEvent::Chunk {
                            content: chunk.text,
                        }
                    }
                };
                forward(events, event).await?;
            }

            if chunk.done {
                break;
            }
        }

        // The closing chunk carries no text, so a consumer that left after
        // the last answer chunk has not been noticed yet.
        if events.is_closed() {
            return Err(PipelineError::Cancelled);
        }

        Ok(answer)
    }
}

fn with_feedback(trajectory: Trajectory, feedback: Option<&str>) -> Trajectory {
    match feedback {
        Some(feedback) => trajectory.with_feedback(feedback),
        None => trajectory,
    }
}

async fn forward(
    events: &mpsc::Sender<PipelineEvent>,
    event: PipelineEvent,
) -> Result<(), PipelineError> {
    events.send(event).await.map_err(|_| PipelineError::Cancelled)
}
