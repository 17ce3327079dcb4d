//! In-memory transcript store.
//!
//! Useful for testing and throwaway sessions.

use super::{Transcript, TranscriptStore, TranscriptSummary};
use crate::error::{HarkError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::RwLock;

/// In-memory transcript store.
pub struct MemoryTranscriptStore {
    records: RwLock<Vec<(Transcript, DateTime<Utc>)>>,
}

impl MemoryTranscriptStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Create a store pre-populated with transcripts.
    pub fn with_transcripts(transcripts: impl IntoIterator<Item = Transcript>) -> Self {
        let now = Utc::now();
        Self {
            records: RwLock::new(transcripts.into_iter().map(|t| (t, now)).collect()),
        }
    }

    fn lock_err<E: std::fmt::Display>(e: E) -> HarkError {
        HarkError::Store(format!("Failed to acquire lock: {}", e))
    }
}

impl Default for MemoryTranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptStore for MemoryTranscriptStore {
    async fn insert(&self, transcript: &Transcript) -> Result<()> {
        let mut records = self.records.write().map_err(Self::lock_err)?;
        if records.iter().any(|(t, _)| t.name == transcript.name) {
            return Err(HarkError::DuplicateName(transcript.name.clone()));
        }
        records.push((transcript.clone(), Utc::now()));
        Ok(())
    }

    async fn names(&self) -> Result<HashSet<String>> {
        let records = self.records.read().map_err(Self::lock_err)?;
        Ok(records.iter().map(|(t, _)| t.name.clone()).collect())
    }

    async fn find_all_texts(&self) -> Result<Vec<String>> {
        let records = self.records.read().map_err(Self::lock_err)?;
        Ok(records.iter().map(|(t, _)| t.text.clone()).collect())
    }

    async fn list(&self) -> Result<Vec<TranscriptSummary>> {
        let records = self.records.read().map_err(Self::lock_err)?;
        Ok(records
            .iter()
            .map(|(t, created_at)| TranscriptSummary {
                name: t.name.clone(),
                chars: t.text.chars().count(),
                created_at: *created_at,
            })
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        let records = self.records.read().map_err(Self::lock_err)?;
        Ok(records.len())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
