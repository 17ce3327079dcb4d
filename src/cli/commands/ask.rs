//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::HarkError;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    k: Option<usize>,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Query, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let k = k.unwrap_or(settings.retrieval.top_k);
    let orchestrator = Orchestrator::new(settings)?;
    let engine = orchestrator.query_engine(model.as_deref())?;

    let spinner = Output::spinner("Searching transcripts...");
    let result = engine.ask(question, k).await;
    spinner.finish_and_clear();

    let outcome = match result {
        Ok(response) => {
            println!("\n{}\n", response.result.answer_text);

            let usage = &response.result.usage;
            Output::kv("Prompt tokens", &usage.prompt_tokens.to_string());
            Output::kv("Completion tokens", &usage.completion_tokens.to_string());
            Output::kv("Total cost", &format!("${:.6}", usage.total_cost));

            if !response.sources.is_empty() {
                Output::header("Sources");
                for (rank, source) in response.sources.iter().enumerate() {
                    Output::search_result(
                        rank + 1,
                        source.chunk.source_offset,
                        source.score,
                        &source.chunk.content,
                    );
                }
            }
            Ok(())
        }
        Err(HarkError::EmptyCorpus) => {
            Output::info("No documents indexed yet. Run 'hark ingest' or 'hark transcribe <FILES>' first.");
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            Err(e.into())
        }
    };

    orchestrator.close().await?;
    outcome
}
