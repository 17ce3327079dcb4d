//! Transcribe command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use std::path::PathBuf;

/// Run the transcribe command on local files.
pub async fn run_transcribe(files: &[PathBuf], settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Transcribe, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let ingestor = orchestrator.upload_ingestor()?;

    let spinner = Output::spinner(&format!("Transcribing {} files...", files.len()));
    let result = ingestor.ingest_files(files).await;
    spinner.finish_and_clear();

    let outcome = match result {
        Ok(report) => {
            Output::ingest_report(&report);
            if report.failures.is_empty() {
                Output::success(&format!("Stored {} new transcripts", report.inserted));
                Ok(())
            } else {
                Err(anyhow::anyhow!(
                    "{} of {} files could not be transcribed",
                    report.failures.len(),
                    files.len()
                ))
            }
        }
        Err(e) => {
            Output::error(&format!("Transcription failed: {}", e));
            Err(e.into())
        }
    };

    orchestrator.close().await?;
    outcome
}
