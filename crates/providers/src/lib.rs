//! Inference backend implementations for ACE.
//!
//! All backends implement the `ace_core::InferenceBackend` trait.

pub mod ollama;

use std::sync::Arc;

use ace_config::AppConfig;
use ace_core::InferenceBackend;

pub use ollama::OllamaBackend;

/// Build the configured inference backend.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn InferenceBackend> {
    Arc::new(OllamaBackend::new(config.ollama.clone()))
}
