//! Transcript persistence.
//!
//! The store is the system of record for transcripts. Records are keyed by
//! transcript name, inserted once and never mutated.

mod memory;
mod sqlite;

pub use memory::MemoryTranscriptStore;
pub use sqlite::SqliteTranscriptStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A transcribed media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Unique key, derived from the source filename.
    pub name: String,
    /// Transcribed text.
    pub text: String,
}

impl Transcript {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Summary row for listing stored transcripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSummary {
    pub name: String,
    /// Length of the text in characters.
    pub chars: usize,
    pub created_at: DateTime<Utc>,
}

/// Trait for transcript store implementations.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Insert a new transcript.
    ///
    /// Fails with `DuplicateName` if a transcript with the same name exists.
    async fn insert(&self, transcript: &Transcript) -> Result<()>;

    /// All transcript names (projection on `name`).
    async fn names(&self) -> Result<HashSet<String>>;

    /// All transcript texts in insertion order (projection on `text`).
    async fn find_all_texts(&self) -> Result<Vec<String>>;

    /// Summaries of all transcripts in insertion order.
    async fn list(&self) -> Result<Vec<TranscriptSummary>>;

    /// Number of stored transcripts.
    async fn count(&self) -> Result<usize>;

    /// Release the underlying connection. Later calls fail.
    async fn close(&self) -> Result<()>;
}
