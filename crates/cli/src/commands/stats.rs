//! `ace stats` — Show context statistics.

use std::path::PathBuf;

use ace_memory::ContextStats;

use super::session::{CliResult, Session};

pub async fn run(context: Option<PathBuf>) -> CliResult {
    let session = Session::offline(context)?;
    print_stats(&session.pipeline.context_stats().await);
    Ok(())
}

pub fn print_stats(stats: &ContextStats) {
    println!("  Context Statistics");
    println!("  ==================");
    println!("  Total bullets:    {}", stats.total_bullets);
    println!("  Helpful bullets:  {}", stats.helpful_bullets);
    println!("  Version:          {}", stats.version);
    println!("  Avg helpfulness:  {:.2}", stats.avg_helpfulness);
}
