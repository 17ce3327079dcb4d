//! Configuration module for Hark.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    CatalogSettings, ChunkingSettings, EmbeddingSettings, GeneralSettings, IngestSettings,
    NetworkSettings, PromptSettings, RagSettings, RetrievalSettings, Settings, StoreSettings,
    TranscriptionSettings,
};
