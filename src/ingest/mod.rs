//! Ingestion: catalog media and uploaded files into the transcript store.

mod pipeline;
mod upload;

pub use pipeline::IngestionPipeline;
pub use upload::UploadIngestor;

use crate::error::HarkError;
use serde::Serialize;
use std::path::Path;

/// An item that could not be ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    /// Source URL, or the local path for uploaded files.
    pub url: String,
    pub error: String,
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Resources returned by the catalog (or files given for upload).
    pub listed: usize,
    /// Items left after duplicate suppression.
    pub unique: usize,
    pub downloaded: usize,
    /// Items whose media file was already on disk.
    pub skipped_downloads: usize,
    pub transcribed: usize,
    /// Transcripts newly persisted by this run.
    pub inserted: usize,
    /// Items whose transcript already existed.
    pub skipped_existing: usize,
    pub failures: Vec<ItemFailure>,
}

impl IngestReport {
    fn record(&mut self, tally: ItemTally) {
        self.downloaded += usize::from(tally.downloaded);
        self.skipped_downloads += usize::from(tally.skipped_download);
        self.transcribed += usize::from(tally.transcribed);
        self.inserted += usize::from(tally.inserted);
        self.skipped_existing += usize::from(tally.skipped_existing);
    }
}

/// What happened to one item.
#[derive(Debug, Default)]
struct ItemTally {
    downloaded: bool,
    skipped_download: bool,
    transcribed: bool,
    inserted: bool,
    skipped_existing: bool,
}

/// Transcript name for a media file: its stem plus `suffix`.
///
/// `talk.mp4` with suffix `.txt` becomes `talk.txt`.
pub fn transcript_name(file_name: &str, suffix: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    format!("{}{}", stem, suffix)
}

/// Whether an insert error means the transcript already exists.
fn is_duplicate(err: &HarkError) -> bool {
    matches!(err, HarkError::DuplicateName(_))
}
