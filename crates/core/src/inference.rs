//! InferenceBackend trait — the abstraction over the language-model server.
//!
//! The pipeline only ever needs plain prompt-in / text-out completions, either
//! whole or streamed. Implementations: Ollama (`ace-providers`), scripted
//! mocks in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::InferenceError;

/// Which part of the model output a streamed chunk belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// Extended-reasoning ("thinking") text
    Reasoning,
    /// Final answer text
    Answer,
}

/// A single chunk in a streaming response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    pub kind: ChunkKind,

    /// Partial text; may be empty on the final chunk
    #[serde(default)]
    pub text: String,

    /// Whether the backend signalled completion with this chunk
    #[serde(default)]
    pub done: bool,
}

impl StreamChunk {
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            kind: ChunkKind::Answer,
            text: text.into(),
            done: false,
        }
    }

    pub fn reasoning(text: impl Into<String>) -> Self {
        Self {
            kind: ChunkKind::Reasoning,
            text: text.into(),
            done: false,
        }
    }

    pub fn finished() -> Self {
        Self {
            kind: ChunkKind::Answer,
            text: String::new(),
            done: true,
        }
    }
}

/// Receiving half of a streamed completion. Finite and not restartable.
pub type ChunkReceiver = mpsc::Receiver<Result<StreamChunk, InferenceError>>;

/// The inference collaborator the pipeline calls.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// A human-readable name for this backend (e.g., "ollama").
    fn name(&self) -> &str;

    /// Prepare a reusable connection. Fails if the backend is unreachable.
    async fn initialize(&self) -> Result<(), InferenceError>;

    /// Single-shot completion.
    async fn generate(
        &self,
        prompt: &str,
        extended_reasoning: bool,
    ) -> Result<String, InferenceError>;

    /// Chunked completion.
    ///
    /// Default implementation calls `generate()` and wraps the result as a
    /// single final chunk. Dropping the receiver stops the producer.
    async fn generate_stream(
        &self,
        prompt: &str,
        extended_reasoning: bool,
    ) -> Result<ChunkReceiver, InferenceError> {
        let text = self.generate(prompt, extended_reasoning).await?;
        let (tx, rx) = mpsc::channel(2);
        let _ = tx.send(Ok(StreamChunk::answer(text))).await;
        let _ = tx.send(Ok(StreamChunk::finished())).await;
        Ok(rx)
    }

    /// Release the connection.
    async fn shutdown(&self) -> Result<(), InferenceError>;
}
