//! OpenAI Whisper transcription implementation.

use super::Transcriber;
use crate::config::TranscriptionSettings;
use crate::error::{HarkError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, instrument};

/// Largest file the transcription endpoint accepts.
pub const MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
    language: Option<String>,
    max_upload_bytes: u64,
}

impl WhisperTranscriber {
    /// Create a transcriber from settings and a configured client.
    pub fn with_config(settings: &TranscriptionSettings, client: Client<OpenAIConfig>) -> Self {
        Self {
            client,
            model: settings.model.clone(),
            language: settings.language.clone(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }

    /// Override the upload size limit.
    pub fn with_max_upload_bytes(mut self, limit: u64) -> Self {
        self.max_upload_bytes = limit;
        self
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self), fields(media_path = %media_path.display()))]
    async fn transcribe(&self, media_path: &Path) -> Result<String> {
        let file_name = media_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp4")
            .to_string();

        let size = tokio::fs::metadata(media_path).await?.len();
        if size > self.max_upload_bytes {
            return Err(HarkError::TranscriptionFailed(format!(
                "{} is {} bytes, over the {} byte upload limit",
                file_name, size, self.max_upload_bytes
            )));
        }

        let file_bytes = tokio::fs::read(media_path).await?;

        debug!("Sending {} bytes to {}", file_bytes.len(), self.model);

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(file_name, file_bytes))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder.build().map_err(|e| {
            HarkError::TranscriptionFailed(format!("Failed to build request: {}", e))
        })?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| HarkError::TranscriptionFailed(format!("Whisper API error: {}", e)))?;

        let text = response.text.trim().to_string();
        if text.is_empty() {
            return Err(HarkError::TranscriptionFailed(format!(
                "{} returned an empty transcript",
                self.model
            )));
        }

        debug!("Transcribed {} characters", text.chars().count());
        Ok(text)
    }
}
