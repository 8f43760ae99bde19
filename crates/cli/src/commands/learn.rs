//! `ace learn` — Adaptive learning over a set of queries.

use std::path::PathBuf;

use ace_agent::{LearningReport, QueryResult};

use super::session::{CliResult, Session};

pub async fn run(
    context: Option<PathBuf>,
    queries: Vec<String>,
    iterations: usize,
    json: bool,
) -> CliResult {
    let session = Session::connect(context).await?;
    let report = session.pipeline.adaptive_learning(&queries, iterations).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    session.close().await
}

fn print_report(report: &LearningReport) {
    for iteration in &report.iterations {
        println!();
        println!("  Iteration {}", iteration.iteration);
        for result in &iteration.results {
            match result {
                QueryResult::Completed {
                    query, new_bullets, ..
                } => println!("    ✅ {query} (+{new_bullets})"),
                QueryResult::Failed { query, error } => println!("    ❌ {query}: {error}"),
            }
        }
        println!(
            "    Context: {} bullets, version {}",
            iteration.total_bullets, iteration.version
        );
    }
}
