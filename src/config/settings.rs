//! Configuration settings for Hark.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub catalog: CatalogSettings,
    pub ingest: IngestSettings,
    pub store: StoreSettings,
    pub transcription: TranscriptionSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub rag: RagSettings,
    pub network: NetworkSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.hark".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Remote media catalog (Cloudinary) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Admin API base URL.
    pub base_url: String,
    /// Cloudinary cloud name.
    pub cloud_name: Option<String>,
    /// Admin API key.
    pub api_key: Option<String>,
    /// Admin API secret.
    pub api_secret: Option<String>,
    /// Resources requested per page (the API caps this at 500).
    pub page_size: u32,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.cloudinary.com".to_string(),
            cloud_name: None,
            api_key: None,
            api_secret: None,
            page_size: 500,
        }
    }
}

/// Ingestion pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Directory downloaded media is kept in.
    pub download_dir: String,
    /// Replaces the media file extension to form the transcript name.
    pub transcript_suffix: String,
    /// Media items processed at the same time.
    pub max_concurrent: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            download_dir: "~/.hark/downloads".to_string(),
            transcript_suffix: ".txt".to_string(),
            max_concurrent: 2,
        }
    }
}

/// Transcript store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path to the SQLite database.
    pub sqlite_path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            sqlite_path: "~/.hark/transcripts.db".to_string(),
        }
    }
}

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model to use.
    pub model: String,
    /// Optional language hint (ISO-639-1).
    pub language: Option<String>,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            language: None,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Texts sent per embedding request.
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            batch_size: 100,
        }
    }
}

/// Text chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Characters shared by adjacent chunks.
    pub chunk_overlap: usize,
    /// Preferred boundary to cut on.
    pub separator: String,
    /// How far back from the size limit to look for a separator.
    pub lookback: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separator: "\n".to_string(),
            lookback: 200,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of chunks handed to the answerer.
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: crate::index::DEFAULT_TOP_K,
        }
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// LLM model for response generation.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
        }
    }
}

/// Network behaviour shared by every backend client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self { timeout_secs: 300 }
    }
}

impl NetworkSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Catalog credentials in the environment take precedence over the file.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Overlay catalog credentials from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = non_empty("CLOUDINARY_CLOUD_NAME") {
            self.catalog.cloud_name = Some(v);
        }
        if let Some(v) = non_empty("CLOUDINARY_API_KEY") {
            self.catalog.api_key = Some(v);
        }
        if let Some(v) = non_empty("CLOUDINARY_API_SECRET") {
            self.catalog.api_secret = Some(v);
        }
    }

    /// Check invariants the components rely on.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::HarkError;

        if self.chunking.chunk_size == 0 {
            return Err(HarkError::Config("chunking.chunk_size must be positive".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(HarkError::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.ingest.max_concurrent == 0 {
            return Err(HarkError::Config("ingest.max_concurrent must be at least 1".into()));
        }
        if self.catalog.page_size == 0 || self.catalog.page_size > 500 {
            return Err(HarkError::Config("catalog.page_size must be between 1 and 500".into()));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::HarkError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hark")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded download directory path.
    pub fn download_dir(&self) -> PathBuf {
        Self::expand_path(&self.ingest.download_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.store.sqlite_path)
    }
}
