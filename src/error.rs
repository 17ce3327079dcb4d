//! Error types for Hark.

use thiserror::Error;

/// Library-level error type for Hark operations.
#[derive(Error, Debug)]
pub enum HarkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Download of {url} failed: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Transcript '{0}' already exists in the store")]
    DuplicateName(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("No documents indexed")]
    EmptyCorpus,

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Transcript store error: {0}")]
    Store(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl HarkError {
    /// Build a download failure for the given URL.
    pub fn download(url: &str, reason: impl Into<String>) -> Self {
        HarkError::DownloadFailed {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for Hark operations.
pub type Result<T> = std::result::Result<T, HarkError>;
