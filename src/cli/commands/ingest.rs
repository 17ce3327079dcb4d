//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let pipeline = orchestrator.ingestion_pipeline()?;

    let spinner = Output::spinner("Ingesting media catalog...");
    let result = pipeline.ingest().await;
    spinner.finish_and_clear();

    let outcome = match result {
        Ok(report) => {
            Output::ingest_report(&report);
            if report.inserted > 0 {
                Output::success(&format!("Stored {} new transcripts", report.inserted));
            } else {
                Output::info("No new transcripts.");
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Ingestion failed: {}", e));
            Err(e.into())
        }
    };

    orchestrator.close().await?;
    outcome
}
