//! `ace ask` — Process a single query.

use std::path::PathBuf;

use super::session::{CliResult, Session, stream_query};

pub async fn run(
    context: Option<PathBuf>,
    query: String,
    feedback: Option<String>,
    stream: bool,
) -> CliResult {
    let session = Session::connect(context).await?;

    let result = if stream {
        stream_query(&session.pipeline, &query, feedback.as_deref()).await
    } else {
        eprint!("  Thinking...");
        let result = session.pipeline.process_query(&query, feedback.as_deref()).await;
        eprint!("\r              \r");
        if let Ok(outcome) = &result {
            println!("{}", outcome.summary);
        }
        result
    };

    // Persist whatever was learned before surfacing a failure.
    session.close().await?;
    result?;
    Ok(())
}
