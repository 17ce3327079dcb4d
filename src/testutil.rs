//! In-process backends shared by the test modules.

use crate::catalog::{CatalogPage, MediaCatalog, MediaResource};
use crate::embedding::Embedder;
use crate::error::{HarkError, Result};
use crate::rag::{Generation, Generator};
use crate::store::{MemoryTranscriptStore, Transcript, TranscriptStore, TranscriptSummary};
use crate::transcription::Transcriber;
use async_openai::config::OpenAIConfig;
use async_openai::Client;
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// OpenAI client pointed at a local mock server.
pub fn mock_openai_client(base_url: &str) -> Client<OpenAIConfig> {
    Client::with_config(
        OpenAIConfig::new()
            .with_api_base(base_url)
            .with_api_key("sk-test"),
    )
}

/// Catalog serving fixed pages, linked by `page-N` cursors.
pub struct FakeCatalog {
    pages: Vec<Vec<MediaResource>>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new(pages: Vec<Vec<MediaResource>>) -> Self {
        Self {
            pages,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// A catalog whose every listing fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaCatalog for FakeCatalog {
    async fn list(&self, cursor: Option<&str>) -> Result<CatalogPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(HarkError::CatalogUnavailable("catalog offline".to_string()));
        }

        let page = match cursor {
            None => 0,
            Some(c) => c
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| HarkError::CatalogUnavailable(format!("bad cursor {}", c)))?,
        };

        let resources = self.pages.get(page).cloned().unwrap_or_default();
        let next_cursor = (page + 1 < self.pages.len()).then(|| format!("page-{}", page + 1));
        Ok(CatalogPage {
            resources,
            next_cursor,
        })
    }
}

/// Bag-of-words embedder: each lowercase word hashes into one dimension.
///
/// Texts sharing words get similar vectors, which is enough to exercise
/// ranking without a real model.
pub struct KeywordEmbedder {
    dimensions: usize,
    calls: AtomicUsize,
}

impl Default for KeywordEmbedder {
    fn default() -> Self {
        Self {
            dimensions: 1024,
            calls: AtomicUsize::new(0),
        }
    }
}

impl KeywordEmbedder {
    /// Number of `embed_batch` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % self.dimensions as u64) as usize] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Transcriber returning `transcript of <file name>`.
#[derive(Default)]
pub struct FakeTranscriber {
    failing: HashSet<String>,
    delay: Option<Duration>,
    seen: Mutex<Vec<String>>,
}

impl FakeTranscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail whenever a file with this name is transcribed.
    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }

    /// Take this long over every file.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// File names transcribed so far, in call order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, media_path: &Path) -> Result<String> {
        let name = media_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.seen.lock().unwrap().push(name.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&name) {
            return Err(HarkError::TranscriptionFailed(format!("cannot decode {}", name)));
        }
        Ok(format!("transcript of {}", name))
    }
}

/// Store whose `names()` is always empty, as if another process inserted
/// its transcripts after the listing was taken.
pub struct StaleNamesStore {
    inner: MemoryTranscriptStore,
}

impl StaleNamesStore {
    pub fn with_transcripts(transcripts: impl IntoIterator<Item = Transcript>) -> Self {
        Self {
            inner: MemoryTranscriptStore::with_transcripts(transcripts),
        }
    }
}

#[async_trait]
impl TranscriptStore for StaleNamesStore {
    async fn insert(&self, transcript: &Transcript) -> Result<()> {
        self.inner.insert(transcript).await
    }

    async fn names(&self) -> Result<HashSet<String>> {
        Ok(HashSet::new())
    }

    async fn find_all_texts(&self) -> Result<Vec<String>> {
        self.inner.find_all_texts().await
    }

    async fn list(&self) -> Result<Vec<TranscriptSummary>> {
        self.inner.list().await
    }

    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }

    async fn close(&self) -> Result<()> {
        self.inner.close().await
    }
}

/// Generator with a canned reply that records its prompts.
pub struct FakeGenerator {
    reply: Option<String>,
    model: String,
    prompt_tokens: u32,
    completion_tokens: u32,
    prompts: Mutex<Vec<(String, String)>>,
}

impl FakeGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            model: "gpt-4o-mini".to_string(),
            prompt_tokens: 0,
            completion_tokens: 0,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose backend is down.
    pub fn unavailable() -> Self {
        Self {
            reply: None,
            ..Self::replying("")
        }
    }

    pub fn with_usage(mut self, model: &str, prompt_tokens: u32, completion_tokens: u32) -> Self {
        self.model = model.to_string();
        self.prompt_tokens = prompt_tokens;
        self.completion_tokens = completion_tokens;
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// The `(system, user)` prompts of the latest call.
    pub fn last_prompt(&self) -> Option<(String, String)> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    async fn generate(&self, system: &str, user: &str) -> Result<Generation> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));

        let text = self
            .reply
            .clone()
            .ok_or_else(|| HarkError::BackendUnavailable("Generation API error: 503".to_string()))?;

        Ok(Generation {
            text,
            model: self.model.clone(),
            prompt_tokens: self.prompt_tokens,
            completion_tokens: self.completion_tokens,
        })
    }
}
