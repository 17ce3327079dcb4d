//! Wiring of concrete backends from settings.
//!
//! Every command builds its pipeline through here, so the HTTP timeout,
//! prompt overrides and storage paths are applied in one place.

use crate::catalog::CloudinaryCatalog;
use crate::chunking::TextSplitter;
use crate::config::{Prompts, Settings};
use crate::download::Downloader;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::ingest::{IngestionPipeline, UploadIngestor};
use crate::openai::{create_client_with_timeout, http_client};
use crate::rag::{Answerer, OpenAIGenerator, QueryEngine};
use crate::store::{SqliteTranscriptStore, TranscriptStore};
use crate::transcription::{Transcriber, WhisperTranscriber};
use std::sync::Arc;
use tracing::debug;

/// Builds the ingestion and query pipelines.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    store: Arc<dyn TranscriptStore>,
}

impl Orchestrator {
    /// Open the transcript store and load prompts.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let sqlite_path = settings.sqlite_path();
        if let Some(parent) = sqlite_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!("Opening transcript store at {:?}", sqlite_path);
        let store: Arc<dyn TranscriptStore> = Arc::new(SqliteTranscriptStore::new(&sqlite_path)?);

        Ok(Self::with_store(settings, prompts, store))
    }

    /// Use an already open store.
    pub fn with_store(settings: Settings, prompts: Prompts, store: Arc<dyn TranscriptStore>) -> Self {
        Self {
            settings,
            prompts,
            store,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> Arc<dyn TranscriptStore> {
        self.store.clone()
    }

    fn transcriber(&self) -> Result<Arc<dyn Transcriber>> {
        let client = create_client_with_timeout(self.settings.network.timeout())?;
        Ok(Arc::new(WhisperTranscriber::with_config(
            &self.settings.transcription,
            client,
        )))
    }

    fn embedder(&self) -> Result<Arc<dyn Embedder>> {
        let client = create_client_with_timeout(self.settings.network.timeout())?;
        Ok(Arc::new(OpenAIEmbedder::with_config(
            &self.settings.embedding,
            client,
        )))
    }

    /// Catalog ingestion over Cloudinary.
    pub fn ingestion_pipeline(&self) -> Result<IngestionPipeline> {
        let client = http_client(self.settings.network.timeout())?;
        let catalog = CloudinaryCatalog::new(&self.settings.catalog, client.clone())?;
        let downloader = Downloader::new(client, self.settings.download_dir())?;

        Ok(IngestionPipeline::new(
            Arc::new(catalog),
            downloader,
            self.transcriber()?,
            self.store.clone(),
        )
        .with_settings(&self.settings.ingest))
    }

    /// Ingestion of local files.
    pub fn upload_ingestor(&self) -> Result<UploadIngestor> {
        Ok(UploadIngestor::new(
            self.transcriber()?,
            self.store.clone(),
            self.settings.ingest.transcript_suffix.clone(),
        ))
    }

    /// Query engine, optionally answering with a different model.
    pub fn query_engine(&self, model: Option<&str>) -> Result<QueryEngine> {
        let client = create_client_with_timeout(self.settings.network.timeout())?;
        let mut generator = OpenAIGenerator::with_config(&self.settings.rag, client);
        if let Some(model) = model {
            generator = generator.with_model(model);
        }

        let answerer = Answerer::new(Arc::new(generator)).with_prompts(self.prompts.clone());

        Ok(QueryEngine::new(
            self.store.clone(),
            self.embedder()?,
            TextSplitter::from_settings(&self.settings.chunking)?,
            answerer,
        ))
    }

    /// Release the store.
    pub async fn close(&self) -> Result<()> {
        self.store.close().await
    }
}
