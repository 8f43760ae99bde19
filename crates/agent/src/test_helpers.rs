//! Shared test helpers for pipeline tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use ace_core::{ChunkReceiver, InferenceBackend, InferenceError, StreamChunk};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// A mock backend that replays scripted responses.
///
/// Each call to `generate` returns the next response in the queue.
/// Panics if more calls are made than responses provided. A scripted
/// stream, when set, is served by the next `generate_stream` call.
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, InferenceError>>>,
    stream: Mutex<Option<Vec<Result<StreamChunk, InferenceError>>>>,
    live: Mutex<Option<ChunkReceiver>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<Result<String, InferenceError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            stream: Mutex::new(None),
            live: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Serve `chunks` for the generation stream, then `responses` for
    /// later `generate` calls.
    pub fn streaming(
        chunks: Vec<Result<StreamChunk, InferenceError>>,
        responses: Vec<Result<String, InferenceError>>,
    ) -> Self {
        let backend = Self::new(responses);
        *backend.stream.lock().unwrap() = Some(chunks);
        backend
    }

    /// Serve the generation stream from `chunks`, fed by the test as it
    /// goes, then `responses` for later `generate` calls.
    pub fn live(chunks: ChunkReceiver, responses: Vec<Result<String, InferenceError>>) -> Self {
        let backend = Self::new(responses);
        *backend.live.lock().unwrap() = Some(chunks);
        backend
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn initialize(&self) -> Result<(), InferenceError> {
        Ok(())
    }

    async fn generate(&self, prompt: &str, _extended: bool) -> Result<String, InferenceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut responses = self.responses.lock().unwrap();
        match responses.pop_front() {
            Some(response) => response,
            None => panic!("ScriptedBackend: no more responses"),
        }
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        extended: bool,
    ) -> Result<ChunkReceiver, InferenceError> {
        if let Some(live) = self.live.lock().unwrap().take() {
            self.prompts.lock().unwrap().push(prompt.to_string());
            return Ok(live);
        }

        let scripted = self.stream.lock().unwrap().take();
        let Some(chunks) = scripted else {
            let text = self.generate(prompt, extended).await?;
            let (tx, rx) = mpsc::channel(2);
            let _ = tx.send(Ok(StreamChunk::answer(text))).await;
            let _ = tx.send(Ok(StreamChunk::finished())).await;
            return Ok(rx);
        };

        self.prompts.lock().unwrap().push(prompt.to_string());
        let (tx, rx) = mpsc::channel(chunks.len().max(1));
        for chunk in chunks {
            let _ = tx.send(chunk).await;
        }
        Ok(rx)
    }

    async fn shutdown(&self) -> Result<(), InferenceError> {
        Ok(())
    }
}
