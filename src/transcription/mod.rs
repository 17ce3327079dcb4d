//! Speech-to-text for downloaded and uploaded media.
//!
//! Backends are interchangeable behind [`Transcriber`]; the pipeline only
//! ever sees a path in and text out.

mod whisper;

pub use whisper::WhisperTranscriber;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a local audio or video file to plain text.
    ///
    /// An empty or blank result is an error, never an empty transcript.
    async fn transcribe(&self, media_path: &Path) -> Result<String>;
}
