//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, k: Option<usize>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Query, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let k = k.unwrap_or(settings.retrieval.top_k);
    let orchestrator = Orchestrator::new(settings)?;
    let engine = orchestrator.query_engine(None)?;

    let spinner = Output::spinner("Indexing transcripts...");
    let results = match engine.open_session().await {
        Ok(session) => {
            spinner.set_message("Searching...");
            session
                .search(query, k)
                .await
                .map(|hits| (session.chunk_count(), hits))
        }
        Err(e) => Err(e),
    };
    spinner.finish_and_clear();

    let outcome = match results {
        Ok((0, _)) => {
            Output::warning("No results. Is anything indexed yet?");
            Ok(())
        }
        Ok((chunks, hits)) => {
            Output::success(&format!("Found {} results in {} chunks", hits.len(), chunks));
            for (rank, hit) in hits.iter().enumerate() {
                Output::search_result(rank + 1, hit.chunk.source_offset, hit.score, &hit.chunk.content);
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Err(e.into())
        }
    };

    orchestrator.close().await?;
    outcome
}
