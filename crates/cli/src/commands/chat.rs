//! `ace chat` — Interactive streaming chat.

use std::io::Write;
use std::path::PathBuf;

use tokio::io::{self, AsyncBufReadExt, BufReader};

use super::session::{CliResult, Session, stream_query};
use super::stats::print_stats;

pub async fn run(context: Option<PathBuf>) -> CliResult {
    let session = Session::connect(context).await?;

    println!();
    println!("  ACE Interactive Mode");
    println!();
    println!("  Model:     {}", session.config.ollama.model);
    println!("  Server:    {}", session.config.ollama.url);
    println!("  Context:   {} bullets", session.pipeline.snapshot().await.len());
    println!();
    println!("  Commands: 'stats', 'help', 'exit'");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let line = match lines.next_line().await {
            Ok(Some(line)) => line.trim().to_string(),
            Ok(None) => break, // EOF (Ctrl+D)
            Err(e) => {
                eprintln!("  [Input Error] {e}");
                break;
            }
        };

        match line.to_lowercase().as_str() {
            "" => continue,
            "exit" | "quit" | "/exit" | "/quit" | ":q" => break,
            "stats" => {
                print_stats(&session.pipeline.context_stats().await);
                continue;
            }
            "help" => {
                println!("  Ask anything; every answer is reflected on and curated.");
                println!("  'stats' shows context statistics, 'exit' quits.");
                continue;
            }
            _ => {}
        }

        println!();
        if let Err(e) = stream_query(&session.pipeline, &line, None).await {
            tracing::debug!(error = %e, "Query failed");
        }

        let learned = session.pipeline.snapshot().await.len();
        if learned > 0 {
            println!("  Context: {learned} bullets learned");
        }
        println!();
    }

    println!();
    println!("  Goodbye!");
    session.close().await
}
