//! Query engine: corpus → chunks → index → retrieval → answer.

use super::answer::{Answerer, QueryResult};
use crate::chunking::TextSplitter;
use crate::embedding::Embedder;
use crate::error::{HarkError, Result};
use crate::index::{ScoredChunk, SemanticIndex};
use crate::store::TranscriptStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// An answer together with the chunks it was grounded on.
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    #[serde(flatten)]
    pub result: QueryResult,
    #[serde(skip)]
    pub sources: Vec<ScoredChunk>,
}

/// Answers questions over the whole transcript store.
pub struct QueryEngine {
    store: Arc<dyn TranscriptStore>,
    embedder: Arc<dyn Embedder>,
    splitter: TextSplitter,
    answerer: Answerer,
}

impl QueryEngine {
    pub fn new(
        store: Arc<dyn TranscriptStore>,
        embedder: Arc<dyn Embedder>,
        splitter: TextSplitter,
        answerer: Answerer,
    ) -> Self {
        Self {
            store,
            embedder,
            splitter,
            answerer,
        }
    }

    /// Load the current corpus and build a fresh index over it.
    ///
    /// All transcripts are joined with a newline in store order before
    /// splitting, so a chunk may span two transcripts.
    #[instrument(skip(self))]
    pub async fn open_session(&self) -> Result<QuerySession<'_>> {
        let texts = self.store.find_all_texts().await?;
        let corpus = texts.join("\n");
        let chunks = self.splitter.split(&corpus);

        info!(
            "Indexing {} transcripts as {} chunks",
            texts.len(),
            chunks.len()
        );

        let index = SemanticIndex::build(self.embedder.as_ref(), chunks).await?;
        Ok(QuerySession {
            engine: self,
            index,
        })
    }

    /// Answer a single question with a one-off session.
    pub async fn ask(&self, question: &str, k: usize) -> Result<AskResponse> {
        check_top_k(k)?;
        self.open_session().await?.ask(question, k).await
    }

    /// Retrieve the chunks most relevant to a question without generating.
    pub async fn search(&self, question: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        check_top_k(k)?;
        self.open_session().await?.search(question, k).await
    }
}

/// An index built for one session; reused across questions in that session.
pub struct QuerySession<'a> {
    engine: &'a QueryEngine,
    index: SemanticIndex,
}

impl QuerySession<'_> {
    /// Number of indexed chunks.
    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    pub async fn search(&self, question: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        check_top_k(k)?;
        self.index
            .query(self.engine.embedder.as_ref(), question, k)
            .await
    }

    /// Retrieve up to `k` chunks and answer from them.
    ///
    /// Fails with `EmptyCorpus` before touching any backend when nothing has
    /// been indexed.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, question: &str, k: usize) -> Result<AskResponse> {
        check_top_k(k)?;
        if self.index.is_empty() {
            return Err(HarkError::EmptyCorpus);
        }

        let sources = self.search(question, k).await?;
        let context: Vec<_> = sources.iter().map(|s| s.chunk.clone()).collect();
        let result = self.engine.answerer.answer(question, &context).await?;

        info!(
            "Answered with {} chunks, {} prompt / {} completion tokens",
            sources.len(),
            result.usage.prompt_tokens,
            result.usage.completion_tokens
        );

        Ok(AskResponse { result, sources })
    }
}

fn check_top_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(HarkError::InvalidInput("top-k must be at least 1".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkingSettings;
    use crate::store::{MemoryTranscriptStore, Transcript};
    use crate::testutil::{FakeGenerator, KeywordEmbedder};

    fn engine(
        store: MemoryTranscriptStore,
        embedder: Arc<KeywordEmbedder>,
        generator: Arc<FakeGenerator>,
    ) -> QueryEngine {
        QueryEngine::new(
            Arc::new(store),
            embedder,
            TextSplitter::from_settings(&ChunkingSettings::default()).unwrap(),
            Answerer::new(generator),
        )
    }

    #[tokio::test]
    async fn test_empty_corpus_calls_no_backend() {
        let embedder = Arc::new(KeywordEmbedder::default());
        let generator = Arc::new(FakeGenerator::replying("unused"));
        let engine = engine(MemoryTranscriptStore::new(), embedder.clone(), generator.clone());

        let err = engine.ask("what happened?", 4).await.unwrap_err();

        assert!(matches!(err, HarkError::EmptyCorpus));
        assert_eq!(embedder.calls(), 0);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_ask_answers_from_relevant_transcript() {
        let store = MemoryTranscriptStore::with_transcripts(vec![
            Transcript::new("cooking.txt", "the recipe needs flour butter and sugar"),
            Transcript::new("sales.txt", "quarterly revenue grew in the northern region"),
        ]);
        let embedder = Arc::new(KeywordEmbedder::default());
        let generator = Arc::new(
            FakeGenerator::replying("Revenue grew in the north.").with_usage("gpt-4o-mini", 300, 20),
        );
        let engine = engine(store, embedder, generator.clone());

        let response = engine
            .ask("how did revenue grow in the northern region", 4)
            .await
            .unwrap();

        assert_eq!(response.result.answer_text, "Revenue grew in the north.");
        assert_eq!(response.result.usage.prompt_tokens, 300);
        assert_eq!(response.result.usage.completion_tokens, 20);
        assert!(!response.sources.is_empty());
        assert!(response.sources[0].chunk.content.contains("revenue"));

        let (_, user) = generator.last_prompt().unwrap();
        assert!(user.contains("quarterly revenue grew"));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_corpus_joined_in_store_order() {
        let store = MemoryTranscriptStore::with_transcripts(vec![
            Transcript::new("a.txt", "first transcript"),
            Transcript::new("b.txt", "second transcript"),
        ]);
        let engine = engine(
            store,
            Arc::new(KeywordEmbedder::default()),
            Arc::new(FakeGenerator::replying("ok")),
        );

        let session = engine.open_session().await.unwrap();
        assert_eq!(session.chunk_count(), 1);

        let hits = session.search("second", 1).await.unwrap();
        assert_eq!(hits[0].chunk.content, "first transcript\nsecond transcript");
    }

    #[tokio::test]
    async fn test_search_on_empty_corpus_is_empty() {
        let engine = engine(
            MemoryTranscriptStore::new(),
            Arc::new(KeywordEmbedder::default()),
            Arc::new(FakeGenerator::replying("ok")),
        );
        assert!(engine.search("anything", 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_session_reused_across_questions() {
        let store = MemoryTranscriptStore::with_transcripts(vec![Transcript::new(
            "a.txt",
            "alpha beta gamma",
        )]);
        let embedder = Arc::new(KeywordEmbedder::default());
        let engine = engine(store, embedder.clone(), Arc::new(FakeGenerator::replying("ok")));

        let session = engine.open_session().await.unwrap();
        session.ask("alpha", 4).await.unwrap();
        session.ask("beta", 4).await.unwrap();

        // One batch for the corpus, one embedding per question
        assert_eq!(embedder.calls(), 3);
    }

    #[tokio::test]
    async fn test_zero_top_k_is_invalid_input() {
        let store = MemoryTranscriptStore::with_transcripts(vec![Transcript::new(
            "a.txt",
            "alpha beta gamma",
        )]);
        let embedder = Arc::new(KeywordEmbedder::default());
        let generator = Arc::new(FakeGenerator::replying("unused"));
        let engine = engine(store, embedder.clone(), generator.clone());

        let err = engine.ask("alpha", 0).await.unwrap_err();
        assert!(matches!(err, HarkError::InvalidInput(_)));
        assert_eq!(embedder.calls(), 0);

        let session = engine.open_session().await.unwrap();
        assert!(matches!(
            session.search("alpha", 0).await.unwrap_err(),
            HarkError::InvalidInput(_)
        ));
        assert_eq!(generator.calls(), 0);
    }
}
