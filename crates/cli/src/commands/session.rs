//! Shared setup for commands that run the pipeline: config, backend,
//! context snapshot loading and saving, and stream rendering.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ace_agent::{AcePipeline, PipelineError, PipelineEvent, PipelineOutcome};
use ace_config::AppConfig;
use ace_core::ContextState;
use tokio::sync::mpsc;
use tracing::info;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// A configured pipeline plus where its context lives on disk, if anywhere.
pub struct Session {
    pub config: AppConfig,
    pub pipeline: Arc<AcePipeline>,
    context_path: Option<PathBuf>,
}

impl Session {
    /// Load config and context, then connect to the inference backend.
    pub async fn connect(context_path: Option<PathBuf>) -> CliResult<Self> {
        let session = Self::offline(context_path)?;
        session.pipeline.initialize().await.map_err(|e| {
            format!(
                "Cannot reach Ollama at {} ({e}). Is `ollama serve` running?",
                session.config.ollama.url
            )
        })?;
        Ok(session)
    }

    /// Load config and context without touching the network.
    pub fn offline(context_path: Option<PathBuf>) -> ace_core::Result<Self> {
        let config = AppConfig::load()?;
        let context = match &context_path {
            Some(path) => load_context(path)?,
            None => ContextState::new(),
        };

        let backend = ace_providers::build_from_config(&config);
        let pipeline = AcePipeline::with_context(backend, config.curator.clone(), context);

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
            context_path,
        })
    }

    /// Save the context (when a path was given) and release the backend.
    pub async fn close(self) -> CliResult {
        if let Some(path) = &self.context_path {
            save_context(path, &*self.pipeline.snapshot().await)?;
        }
        self.pipeline.shutdown().await?;
        Ok(())
    }
}

/// Read a context snapshot. A missing file is an empty context; a file
/// whose keys and bullet ids disagree is rejected.
pub fn load_context(path: &Path) -> ace_core::Result<ContextState> {
    if !path.exists() {
        info!("No context file at {}, starting empty", path.display());
        return Ok(ContextState::new());
    }
    let content = std::fs::read_to_string(path)?;
    let context: ContextState = serde_json::from_str(&content)?;
    info!(
        bullets = context.len(),
        version = context.version(),
        "Loaded context from {}",
        path.display()
    );
    Ok(context)
}

pub fn save_context(path: &Path, context: &ContextState) -> ace_core::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(context)?)?;
    info!(
        bullets = context.len(),
        version = context.version(),
        "Saved context to {}",
        path.display()
    );
    Ok(())
}

/// Process `query` in streaming mode, printing events as they arrive.
pub async fn stream_query(
    pipeline: &AcePipeline,
    query: &str,
    feedback: Option<&str>,
) -> Result<PipelineOutcome, PipelineError> {
    let (tx, mut rx) = mpsc::channel(64);

    let printer = tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        while let Some(event) = rx.recv().await {
            match event {
                PipelineEvent::Chunk { content } | PipelineEvent::Reasoning { content } => {
                    print!("{content}");
                }
                PipelineEvent::Marker { label } => print!("\n{label}\n"),
                PipelineEvent::Curated {
                    version,
                    new_bullets,
                } => {
                    println!();
                    println!("  [context v{version}, {new_bullets} new insight(s)]");
                }
                PipelineEvent::Error { message } => {
                    println!();
                    eprintln!("  [Error] {message}");
                }
            }
            let _ = stdout.flush();
        }
    });

    let outcome = pipeline.process_query_stream(query, feedback, tx).await;
    let _ = printer.await;
    outcome
}
