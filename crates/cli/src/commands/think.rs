//! `ace think` — One extended-reasoning answer.

use super::session::{CliResult, Session};

pub async fn run(query: String) -> CliResult {
    let session = Session::connect(None).await?;

    eprint!("  Thinking...");
    let answer = session.pipeline.think(&query).await;
    eprint!("\r              \r");

    session.close().await?;
    println!("{}", answer?);
    Ok(())
}
