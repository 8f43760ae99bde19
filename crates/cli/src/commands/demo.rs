//! `ace demo` — Run a fixed set of queries and watch the context grow.

use std::path::PathBuf;

use super::session::{CliResult, Session, stream_query};

const DEMO_QUERIES: [&str; 3] = [
    "What is agentic context engineering?",
    "Write a Python function that computes fibonacci numbers",
    "List the strengths and weaknesses of learning from your own answers",
];

pub async fn run(context: Option<PathBuf>) -> CliResult {
    let session = Session::connect(context).await?;

    for (i, query) in DEMO_QUERIES.iter().enumerate() {
        println!();
        println!("{}", "=".repeat(60));
        println!("Query {}: {query}", i + 1);
        println!("{}", "=".repeat(60));
        println!();

        // Failures are already reported on the stream.
        let _ = stream_query(&session.pipeline, query, None).await;

        let stats = session.pipeline.context_stats().await;
        println!(
            "\n  Context: {} bullets, version {}",
            stats.total_bullets, stats.version
        );
    }

    session.close().await
}
