//! Splitting the transcript corpus into overlapping retrieval chunks.
//!
//! Windows are measured in characters, not bytes. A window is cut just after
//! the last separator close to its size limit when there is one, otherwise at
//! the limit itself. The next window starts `overlap` characters before the
//! previous cut, so adjacent chunks share text.

use crate::config::ChunkingSettings;
use crate::error::{HarkError, Result};
use serde::{Deserialize, Serialize};
use std::iter;

/// A chunk of the concatenated transcript corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Character offset of the chunk's first character in the source text.
    pub source_offset: usize,
    /// Exact text of the chunk.
    pub content: String,
}

impl TextChunk {
    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Character offset one past the chunk's last character.
    pub fn end_offset(&self) -> usize {
        self.source_offset + self.char_len()
    }
}

/// Fixed-window splitter preferring separator boundaries.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    overlap: usize,
    separator: Vec<char>,
    lookback: usize,
}

impl TextSplitter {
    /// Create a splitter; `overlap` must be smaller than `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize, separator: &str, lookback: usize) -> Result<Self> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(HarkError::Config(format!(
                "chunk overlap ({}) must be smaller than a positive chunk size ({})",
                overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            overlap,
            separator: separator.chars().collect(),
            lookback,
        })
    }

    /// Create a splitter from settings.
    pub fn from_settings(settings: &ChunkingSettings) -> Result<Self> {
        Self::new(
            settings.chunk_size,
            settings.chunk_overlap,
            &settings.separator,
            settings.lookback,
        )
    }

    /// Split text into chunks. Empty input yields no chunks.
    pub fn split(&self, text: &str) -> Vec<TextChunk> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every character, plus the end of the text
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(iter::once(text.len()))
            .collect();
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();

        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let limit = (start + self.chunk_size).min(total);
            let end = if limit == total {
                total
            } else {
                self.find_cut(&chars, start, limit)
            };

            chunks.push(TextChunk {
                source_offset: start,
                content: text[bounds[start]..bounds[end]].to_string(),
            });

            if end == total {
                break;
            }
            start = end - self.overlap;
        }

        chunks
    }

    /// Pick the cut for a window `[start, limit)`.
    ///
    /// The cut always lands more than `overlap` characters after `start`.
    fn find_cut(&self, chars: &[char], start: usize, limit: usize) -> usize {
        let sep_len = self.separator.len();
        if sep_len == 0 {
            return limit;
        }

        let floor = limit
            .saturating_sub(self.lookback)
            .max(start + self.overlap + 1)
            .max(start + sep_len);

        (floor..=limit)
            .rev()
            .find(|&cut| chars[cut - sep_len..cut] == self.separator[..])
            .unwrap_or(limit)
    }
}
