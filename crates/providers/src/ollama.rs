//! Ollama backend over the native `/api/generate` endpoint.
//!
//! Supports:
//! - Single-shot completions (`stream: false`)
//! - Streaming completions as newline-delimited JSON, including the
//!   `thinking` field emitted by reasoning models
//! - Reachability check via `/api/tags`

use std::time::Duration;

use ace_config::OllamaConfig;
use ace_core::error::InferenceError;
use ace_core::inference::{ChunkReceiver, InferenceBackend, StreamChunk};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, trace, warn};

/// An Ollama inference backend.
///
/// The HTTP client is created by [`InferenceBackend::initialize`] and
/// dropped by [`InferenceBackend::shutdown`]; requests in between reuse it.
pub struct OllamaBackend {
    config: OllamaConfig,
    base_url: String,
    client: RwLock<Option<reqwest::Client>>,
}

impl OllamaBackend {
    pub fn new(config: OllamaConfig) -> Self {
        let base_url = config.url.trim_end_matches('/').to_string();
        Self {
            config,
            base_url,
            client: RwLock::new(None),
        }
    }

    /// The model requests are sent to.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request_body(&self, prompt: &str, stream: bool, extended_reasoning: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": stream,
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens,
                "num_ctx": self.config.context_window,
            },
        });

        if extended_reasoning {
            body["think"] = serde_json::json!(true);
        }

        body
    }

    fn timeout(&self, extended_reasoning: bool) -> Duration {
        if extended_reasoning {
            Duration::from_secs(self.config.reasoning_timeout_secs)
        } else {
            Duration::from_secs(self.config.request_timeout_secs)
        }
    }

    async fn client(&self) -> Result<reqwest::Client, InferenceError> {
        self.client
            .read()
            .await
            .clone()
            .ok_or(InferenceError::NotInitialized)
    }

    async fn post_generate(
        &self,
        prompt: &str,
        stream: bool,
        extended_reasoning: bool,
    ) -> Result<reqwest::Response, InferenceError> {
        let client = self.client().await?;
        let url = format!("{}/api/generate", self.base_url);

        debug!(
            model = %self.config.model,
            stream,
            extended_reasoning,
            prompt_chars = prompt.len(),
            "Sending generate request"
        );

        let response = client
            .post(&url)
            .timeout(self.timeout(extended_reasoning))
            .json(&self.request_body(prompt, stream, extended_reasoning))
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Ollama returned error");
            return Err(InferenceError::Backend {
                status_code: status,
                message: format!("API error: {error_body}"),
            });
        }

        Ok(response)
    }
}

fn map_request_error(e: reqwest::Error) -> InferenceError {
    if e.is_timeout() {
        InferenceError::Timeout(e.to_string())
    } else {
        InferenceError::Transport(e.to_string())
    }
}

#[async_trait]
impl InferenceBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn initialize(&self) -> Result<(), InferenceError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| InferenceError::Transport(format!("Failed to create HTTP client: {e}")))?;

        let url = format!("{}/api/tags", self.base_url);
        let response = client
            .get(&url)
            .timeout(self.timeout(false))
            .send()
            .await
            .map_err(|e| InferenceError::Transport(format!("Connection failed: {e}")))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(InferenceError::Backend {
                status_code: status,
                message: "Ollama not available".into(),
            });
        }

        *self.client.write().await = Some(client);
        info!(url = %self.base_url, model = %self.config.model, "Ollama backend initialized");
        Ok(())
    }

    async fn generate(
        &self,
        prompt: &str,
        extended_reasoning: bool,
    ) -> Result<String, InferenceError> {
        let response = self.post_generate(prompt, false, extended_reasoning).await?;

        let body: GenerateResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout(e.to_string())
            } else {
                InferenceError::Backend {
                    status_code: 200,
                    message: format!("Failed to parse response: {e}"),
                }
            }
        })?;

        Ok(body.response.trim().to_string())
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        extended_reasoning: bool,
    ) -> Result<ChunkReceiver, InferenceError> {
        let response = self.post_generate(prompt, true, extended_reasoning).await?;

        let (tx, rx) = mpsc::channel(64);

        // Spawn task to read the NDJSON byte stream and forward chunks
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = LineBuffer::default();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let err = if e.is_timeout() {
                            InferenceError::Timeout(e.to_string())
                        } else {
                            InferenceError::StreamInterrupted(e.to_string())
                        };
                        let _ = tx.send(Err(err)).await;
                        return;
                    }
                };

                buffer.extend(&bytes);

                // Process complete lines
                while let Some(line) = buffer.next_line() {
                    match forward_line(&tx, &line).await {
                        LineOutcome::Continue => {}
                        LineOutcome::Done | LineOutcome::ReceiverGone => return,
                    }
                }
            }

            // Trailing line without a newline terminator
            let rest = buffer.remainder();
            if !rest.trim().is_empty() {
                if let LineOutcome::Done | LineOutcome::ReceiverGone = forward_line(&tx, &rest).await {
                    return;
                }
            }

            // Stream ended without a done marker
            let _ = tx.send(Ok(StreamChunk::finished())).await;
        });

        Ok(rx)
    }

    async fn shutdown(&self) -> Result<(), InferenceError> {
        if self.client.write().await.take().is_some() {
            info!("Ollama backend shut down");
        }
        Ok(())
    }
}

/// Accumulates raw response bytes and yields complete lines.
///
/// Lines are decoded only once complete; network chunks may end inside a
/// multi-byte character.
#[derive(Default)]
struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    fn extend(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    fn next_line(&mut self) -> Option<String> {
        let end = self.bytes.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.bytes.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    fn remainder(&mut self) -> String {
        let rest = std::mem::take(&mut self.bytes);
        String::from_utf8_lossy(&rest).into_owned()
    }
}

enum LineOutcome {
    Continue,
    Done,
    ReceiverGone,
}

async fn forward_line(
    tx: &mpsc::Sender<Result<StreamChunk, InferenceError>>,
    line: &str,
) -> LineOutcome {
    let line = line.trim();
    if line.is_empty() {
        return LineOutcome::Continue;
    }

    let parsed = match serde_json::from_str::<StreamLine>(line) {
        Ok(parsed) => parsed,
        Err(e) => {
            trace!(data = %line, error = %e, "Ignoring unparseable stream line");
            return LineOutcome::Continue;
        }
    };

    if let Some(message) = parsed.error {
        warn!(error = %message, "Ollama reported an error mid-stream");
        let _ = tx
            .send(Err(InferenceError::Backend {
                status_code: 200,
                message,
            }))
            .await;
        return LineOutcome::Done;
    }

    let done = parsed.done;
    for chunk in chunks_for(parsed) {
        if tx.send(Ok(chunk)).await.is_err() {
            return LineOutcome::ReceiverGone;
        }
    }

    if done {
        LineOutcome::Done
    } else {
        LineOutcome::Continue
    }
}

/// Translate one NDJSON line into the chunks it carries.
fn chunks_for(line: StreamLine) -> Vec<StreamChunk> {
    let mut chunks = Vec::new();

    if let Some(thinking) = line.thinking.filter(|t| !t.is_empty()) {
        chunks.push(StreamChunk::reasoning(thinking));
    }
    if let Some(response) = line.response.filter(|r| !r.is_empty()) {
        chunks.push(StreamChunk::answer(response));
    }
    if line.done {
        chunks.push(StreamChunk::finished());
    }

    chunks
}

// --- Ollama API types (internal) ---

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// One line of a streaming `/api/generate` response.
#[derive(Debug, Deserialize)]
struct StreamLine {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    thinking: Option<String>,
    #[serde(default)]
    done: bool,
    /// Set when the server fails after the response has started
    #[serde(default)]
    error: Option<String>,
}
