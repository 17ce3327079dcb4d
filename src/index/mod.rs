//! In-memory semantic index over transcript chunks.
//!
//! The index lives for one query session. It is built from the full corpus
//! and dropped afterwards; there is no incremental update and nothing is
//! written to disk.

use crate::chunking::TextChunk;
use crate::embedding::Embedder;
use crate::error::{HarkError, Result};
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// Default number of chunks returned by a query.
pub const DEFAULT_TOP_K: usize = 4;

/// A chunk together with its embedding.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: TextChunk,
    pub vector: Vec<f32>,
}

/// A retrieved chunk with its similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: TextChunk,
    /// Cosine similarity (higher is better).
    pub score: f32,
}

/// Embedded chunks searchable by cosine similarity.
#[derive(Debug, Clone, Default)]
pub struct SemanticIndex {
    entries: Vec<EmbeddedChunk>,
}

impl SemanticIndex {
    /// Embed every chunk and build an index over them.
    #[instrument(skip_all, fields(chunks = chunks.len()))]
    pub async fn build(embedder: &dyn Embedder, chunks: Vec<TextChunk>) -> Result<Self> {
        if chunks.is_empty() {
            return Ok(Self::default());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(HarkError::Embedding(format!(
                "Expected {} embeddings, received {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let dimensions = embedder.dimensions();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
            return Err(HarkError::Embedding(format!(
                "Expected {}-dimensional embeddings, received {}",
                dimensions,
                bad.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddedChunk { chunk, vector })
            .collect::<Vec<_>>();

        debug!("Built index with {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Retrieve up to `k` chunks most similar to `question`.
    ///
    /// An empty index returns no results without calling the embedder.
    #[instrument(skip(self, embedder))]
    pub async fn query(
        &self,
        embedder: &dyn Embedder,
        question: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = embedder.embed(question).await?;
        Ok(self.nearest(&query_vector, k))
    }

    /// Rank entries against a query vector; ties keep chunk order.
    pub fn nearest(&self, query_vector: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query_vector, &entry.vector),
            })
            .collect();

        // sort_by is stable, so equal scores stay in insertion order
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k.min(self.entries.len()));
        scored
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::KeywordEmbedder;
    use async_trait::async_trait;

    /// Returns the same fixed vectors for any batch.
    struct CannedEmbedder {
        vectors: Vec<Vec<f32>>,
        dimensions: usize,
    }

    #[async_trait]
    impl Embedder for CannedEmbedder {
        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(self.vectors.clone())
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }
    }

    fn chunk(offset: usize, content: &str) -> TextChunk {
        TextChunk {
            source_offset: offset,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_paraphrase_ranks_first() {
        let embedder = KeywordEmbedder::default();
        let chunks = vec![
            chunk(0, "the recipe needs flour butter and sugar"),
            chunk(10, "quarterly revenue grew in the northern region"),
            chunk(20, "the telescope observed a distant galaxy cluster"),
            chunk(30, "our hiking trail crosses the river twice"),
            chunk(40, "the goalkeeper saved a penalty in extra time"),
        ];

        let index = SemanticIndex::build(&embedder, chunks).await.unwrap();
        let results = index
            .query(&embedder, "how did revenue grow in the northern region this quarter", 4)
            .await
            .unwrap();

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].chunk.source_offset, 10);
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_k_is_clamped() {
        let embedder = KeywordEmbedder::default();
        let index = SemanticIndex::build(&embedder, vec![chunk(0, "alpha"), chunk(5, "beta")])
            .await
            .unwrap();

        let results = index.query(&embedder, "alpha", DEFAULT_TOP_K).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_index_skips_embedder() {
        let embedder = KeywordEmbedder::default();
        let index = SemanticIndex::build(&embedder, Vec::new()).await.unwrap();

        let results = index.query(&embedder, "anything", 4).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(embedder.calls(), 0);
    }

    #[test]
    fn test_ties_keep_chunk_order() {
        let index = SemanticIndex {
            entries: vec![
                EmbeddedChunk { chunk: chunk(0, "first"), vector: vec![1.0, 0.0] },
                EmbeddedChunk { chunk: chunk(1, "second"), vector: vec![0.0, 1.0] },
                EmbeddedChunk { chunk: chunk(2, "third"), vector: vec![1.0, 0.0] },
                EmbeddedChunk { chunk: chunk(3, "fourth"), vector: vec![2.0, 0.0] },
            ],
        };

        let results = index.nearest(&[1.0, 0.0], 3);
        let offsets: Vec<_> = results.iter().map(|r| r.chunk.source_offset).collect();
        assert_eq!(offsets, vec![0, 2, 3]);
    }

    #[tokio::test]
    async fn test_missing_embeddings_fail_the_build() {
        let embedder = CannedEmbedder {
            vectors: vec![vec![1.0, 0.0]],
            dimensions: 2,
        };
        let err = SemanticIndex::build(&embedder, vec![chunk(0, "alpha"), chunk(5, "beta")])
            .await
            .unwrap_err();

        match err {
            HarkError::Embedding(msg) => assert!(msg.contains("Expected 2 embeddings, received 1")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_dimensions_fail_the_build() {
        let embedder = CannedEmbedder {
            vectors: vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]],
            dimensions: 2,
        };
        let err = SemanticIndex::build(&embedder, vec![chunk(0, "alpha"), chunk(5, "beta")])
            .await
            .unwrap_err();

        match err {
            HarkError::Embedding(msg) => assert!(msg.contains("2-dimensional")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
