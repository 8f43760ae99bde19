//! ACE CLI — the main entry point.
//!
//! Commands:
//! - `chat`   — Interactive streaming chat that learns as it goes
//! - `demo`   — Run a fixed set of queries and show the context growing
//! - `ask`    — Process a single query
//! - `learn`  — Adaptive learning over a list of queries
//! - `think`  — One extended-reasoning answer, no learning
//! - `stats`  — Show context statistics
//! - `config` — Inspect configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "ace",
    about = "ACE — Agentic Context Engineering on a local model",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Load the learned context from this JSON file and save it back on exit
    #[arg(short, long, global = true, env = "ACE_CONTEXT")]
    context: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat
    Chat,

    /// Run the built-in demo queries
    Demo,

    /// Process a single query
    Ask {
        query: String,

        /// Feedback on the answer, passed to reflection
        #[arg(short, long)]
        feedback: Option<String>,

        /// Wait for the full answer instead of streaming it
        #[arg(long)]
        no_stream: bool,
    },

    /// Run adaptive learning over a set of queries
    Learn {
        #[arg(required = true)]
        queries: Vec<String>,

        #[arg(short, long, default_value_t = 3)]
        iterations: usize,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Answer with extended reasoning, without touching the context
    Think { query: String },

    /// Show context statistics
    Stats,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate the configuration
    Validate,
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let context = cli.context;
    match cli.command {
        Commands::Chat => commands::chat::run(context).await?,
        Commands::Demo => commands::demo::run(context).await?,
        Commands::Ask {
            query,
            feedback,
            no_stream,
        } => commands::ask::run(context, query, feedback, !no_stream).await?,
        Commands::Learn {
            queries,
            iterations,
            json,
        } => commands::learn::run(context, queries, iterations, json).await?,
        Commands::Think { query } => commands::think::run(query).await?,
        Commands::Stats => commands::stats::run(context).await?,
        Commands::Config { action } => match action {
            ConfigAction::Validate => commands::config_cmd::validate().await?,
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
    }

    Ok(())
}
