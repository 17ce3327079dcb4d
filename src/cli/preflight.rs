//! Pre-flight checks before expensive operations.
//!
//! Validates that credentials are available before starting operations that
//! would otherwise fail midway.

use crate::config::Settings;
use crate::error::{HarkError, Result};
use crate::openai::is_api_key_configured;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Catalog ingestion needs catalog credentials and an API key.
    Ingest,
    /// Transcribing local files needs an API key.
    Transcribe,
    /// Asking and searching embed text, so they need an API key.
    Query,
    /// Listing only reads the store.
    List,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ingest => {
            check_catalog(settings)?;
            check_api_key()?;
        }
        Operation::Transcribe | Operation::Query => {
            check_api_key()?;
        }
        Operation::List => {}
    }
    Ok(())
}

fn check_api_key() -> Result<()> {
    if is_api_key_configured() {
        Ok(())
    } else {
        Err(HarkError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        ))
    }
}

fn check_catalog(settings: &Settings) -> Result<()> {
    let catalog = &settings.catalog;
    let missing: Vec<&str> = [
        ("CLOUDINARY_CLOUD_NAME", &catalog.cloud_name),
        ("CLOUDINARY_API_KEY", &catalog.api_key),
        ("CLOUDINARY_API_SECRET", &catalog.api_secret),
    ]
    .into_iter()
    .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
    .map(|(name, _)| name)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(HarkError::Config(format!(
            "Catalog credentials missing: set {} or the [catalog] section of the config file",
            missing.join(", ")
        )))
    }
}
