//! List command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::List, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let outcome = match orchestrator.store().list().await {
        Ok(transcripts) if transcripts.is_empty() => {
            Output::info("No transcripts yet. Use 'hark ingest' or 'hark transcribe <FILES>' to add content.");
            Ok(())
        }
        Ok(transcripts) => {
            Output::header(&format!("Transcripts ({})", transcripts.len()));
            println!();

            for item in &transcripts {
                Output::transcript_info(
                    &item.name,
                    item.chars,
                    &item.created_at.format("%Y-%m-%d %H:%M").to_string(),
                );
            }

            let total_chars: usize = transcripts.iter().map(|t| t.chars).sum();
            println!();
            Output::kv("Total transcripts", &transcripts.len().to_string());
            Output::kv("Total characters", &total_chars.to_string());
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to list transcripts: {}", e));
            Err(e.into())
        }
    };

    orchestrator.close().await?;
    outcome
}
