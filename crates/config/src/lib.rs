//! Configuration loading, validation, and management for ACE.
//!
//! Loads configuration from `~/.ace/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.ace/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Inference backend settings
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Context curation settings
    #[serde(default)]
    pub curator: CuratorConfig,
}

/// Settings for the Ollama inference server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_url")]
    pub url: String,

    /// Model tag to generate with
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to predict per response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Context window passed as `num_ctx`
    #[serde(default = "default_context_window")]
    pub context_window: u32,

    /// Per-request timeout for plain completions
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Per-request timeout when extended reasoning is enabled
    #[serde(default = "default_reasoning_timeout")]
    pub reasoning_timeout_secs: u64,
}

fn default_url() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "qwen2.5-coder:1.5b".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    512
}
fn default_context_window() -> u32 {
    2048
}
fn default_request_timeout() -> u64 {
    120
}
fn default_reasoning_timeout() -> u64 {
    300
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            context_window: default_context_window(),
            request_timeout_secs: default_request_timeout(),
            reasoning_timeout_secs: default_reasoning_timeout(),
        }
    }
}

/// Tuning knobs for retrieval, merging, and grow-and-refine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratorConfig {
    /// Bullets retrieved into each generation prompt
    #[serde(default = "default_max_relevant_bullets")]
    pub max_relevant_bullets: usize,

    /// Insights below this confidence never become bullets
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Token containment at which a candidate counts as a duplicate
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f64,

    /// Neutral bullets older than this many days are pruned
    #[serde(default = "default_prune_min_days")]
    pub prune_min_days: i64,

    /// Hard cap on the number of bullets kept
    #[serde(default = "default_max_context_size")]
    pub max_context_size: usize,

    /// Run grow-and-refine after every N curations (0 = never automatically)
    #[serde(default = "default_refine_interval")]
    pub refine_interval: u32,
}

fn default_max_relevant_bullets() -> usize {
    10
}
fn default_min_confidence() -> f64 {
    0.5
}
fn default_duplicate_threshold() -> f64 {
    0.7
}
fn default_prune_min_days() -> i64 {
    30
}
fn default_max_context_size() -> usize {
    1000
}
fn default_refine_interval() -> u32 {
    10
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            max_relevant_bullets: default_max_relevant_bullets(),
            min_confidence: default_min_confidence(),
            duplicate_threshold: default_duplicate_threshold(),
            prune_min_days: default_prune_min_days(),
            max_context_size: default_max_context_size(),
            refine_interval: default_refine_interval(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.ace/config.toml).
    ///
    /// Environment variables take priority over the file:
    /// - `ACE_OLLAMA_URL`
    /// - `ACE_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("ACE_OLLAMA_URL") {
            self.ollama.url = url;
        }
        if let Some(model) = lookup("ACE_MODEL") {
            self.ollama.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ace")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ollama.url.starts_with("http://") || self.ollama.url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "ollama.url must be an http(s) URL, got '{}'",
                self.ollama.url
            )));
        }

        if self.ollama.temperature < 0.0 || self.ollama.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "ollama.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.ollama.request_timeout_secs == 0 || self.ollama.reasoning_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "ollama timeouts must be > 0".into(),
            ));
        }

        let curator = &self.curator;
        if !(0.0..=1.0).contains(&curator.min_confidence) {
            return Err(ConfigError::ValidationError(
                "curator.min_confidence must be between 0.0 and 1.0".into(),
            ));
        }

        if curator.duplicate_threshold <= 0.0 || curator.duplicate_threshold > 1.0 {
            return Err(ConfigError::ValidationError(
                "curator.duplicate_threshold must be in (0.0, 1.0]".into(),
            ));
        }

        if curator.max_context_size == 0 || curator.max_relevant_bullets == 0 {
            return Err(ConfigError::ValidationError(
                "curator.max_context_size and curator.max_relevant_bullets must be > 0".into(),
            ));
        }

        if curator.prune_min_days < 0 {
            return Err(ConfigError::ValidationError(
                "curator.prune_min_days must be >= 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for ace_core::Error {
    fn from(err: ConfigError) -> Self {
        ace_core::Error::Config {
            message: err.to_string(),
        }
    }
}
