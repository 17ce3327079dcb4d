//! Ingestion of local media files.

use super::{is_duplicate, transcript_name, IngestReport, ItemFailure, ItemTally};
use crate::error::{HarkError, Result};
use crate::store::{Transcript, TranscriptStore};
use crate::transcription::Transcriber;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Transcribes local files into the store under the catalog naming rules.
pub struct UploadIngestor {
    transcriber: Arc<dyn Transcriber>,
    store: Arc<dyn TranscriptStore>,
    transcript_suffix: String,
}

impl UploadIngestor {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        store: Arc<dyn TranscriptStore>,
        transcript_suffix: impl Into<String>,
    ) -> Self {
        Self {
            transcriber,
            store,
            transcript_suffix: transcript_suffix.into(),
        }
    }

    /// Transcribe and store each file whose transcript does not exist yet.
    ///
    /// Files are handled one after another, so two files sharing a stem
    /// produce one transcript.
    #[instrument(skip(self, paths), fields(files = paths.len()))]
    pub async fn ingest_files(&self, paths: &[PathBuf]) -> Result<IngestReport> {
        let mut known = self.store.names().await?;
        let mut report = IngestReport {
            listed: paths.len(),
            unique: paths.len(),
            ..Default::default()
        };

        for path in paths {
            let mut tally = ItemTally::default();
            if let Err(e) = self.ingest_file(path, &mut known, &mut tally).await {
                warn!(filename = %path.display(), error = %e, "Skipping file");
                report.failures.push(ItemFailure {
                    url: path.display().to_string(),
                    error: e.to_string(),
                });
            }
            report.record(tally);
        }

        Ok(report)
    }

    async fn ingest_file(
        &self,
        path: &Path,
        known: &mut HashSet<String>,
        tally: &mut ItemTally,
    ) -> Result<()> {
        if !path.is_file() {
            return Err(HarkError::InvalidInput(format!(
                "{} is not a readable file",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| HarkError::InvalidInput(format!("{} has no file name", path.display())))?;

        let name = transcript_name(&file_name, &self.transcript_suffix);
        if known.contains(&name) {
            info!(transcript = %name, "Transcript exists, skipping {}", file_name);
            tally.skipped_existing = true;
            return Ok(());
        }

        let text = self.transcriber.transcribe(path).await?;
        tally.transcribed = true;

        match self.store.insert(&Transcript::new(name.clone(), text)).await {
            Ok(()) => {
                info!(transcript = %name, "Stored transcript for {}", file_name);
                tally.inserted = true;
            }
            Err(e) if is_duplicate(&e) => {
                warn!(transcript = %name, "Transcript inserted concurrently");
                tally.skipped_existing = true;
            }
            Err(e) => return Err(e),
        }
        known.insert(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTranscriptStore;
    use crate::testutil::{FakeTranscriber, StaleNamesStore};
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"media").unwrap();
        path
    }

    #[tokio::test]
    async fn test_uploads_are_transcribed_once() {
        let dir = TempDir::new().unwrap();
        let files = vec![write_file(&dir, "talk.mp4"), write_file(&dir, "demo.mov")];
        let transcriber = Arc::new(FakeTranscriber::new());
        let store = Arc::new(MemoryTranscriptStore::new());
        let ingestor = UploadIngestor::new(transcriber.clone(), store.clone(), ".txt");

        let first = ingestor.ingest_files(&files).await.unwrap();
        assert_eq!(first.inserted, 2);
        assert_eq!(first.downloaded, 0);

        let second = ingestor.ingest_files(&files).await.unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped_existing, 2);
        assert_eq!(transcriber.seen(), vec!["talk.mp4", "demo.mov"]);

        let names = store.names().await.unwrap();
        assert!(names.contains("talk.txt"));
        assert!(names.contains("demo.txt"));
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let files = vec![dir.path().join("absent.mp4"), write_file(&dir, "here.mp4")];
        let store = Arc::new(MemoryTranscriptStore::new());
        let ingestor = UploadIngestor::new(Arc::new(FakeTranscriber::new()), store.clone(), ".txt");

        let report = ingestor.ingest_files(&files).await.unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].url.ends_with("absent.mp4"));
    }

    #[tokio::test]
    async fn test_shared_stem_retries_after_failure() {
        let dir = TempDir::new().unwrap();
        let files = vec![write_file(&dir, "clip.mp4"), write_file(&dir, "clip.mov")];
        let transcriber = Arc::new(FakeTranscriber::new().failing_on("clip.mp4"));
        let store = Arc::new(MemoryTranscriptStore::new());
        let ingestor = UploadIngestor::new(transcriber.clone(), store.clone(), ".txt");

        let report = ingestor.ingest_files(&files).await.unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped_existing, 0);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(transcriber.seen(), vec!["clip.mp4", "clip.mov"]);
        assert_eq!(
            store.find_all_texts().await.unwrap(),
            vec!["transcript of clip.mov"]
        );
    }

    #[tokio::test]
    async fn test_duplicate_insert_counts_as_existing() {
        let dir = TempDir::new().unwrap();
        let files = vec![write_file(&dir, "talk.mp4")];
        let store = Arc::new(StaleNamesStore::with_transcripts(vec![Transcript::new(
            "talk.txt",
            "stored by another process",
        )]));
        let ingestor = UploadIngestor::new(Arc::new(FakeTranscriber::new()), store.clone(), ".txt");

        let report = ingestor.ingest_files(&files).await.unwrap();

        assert_eq!(report.transcribed, 1);
        assert_eq!(report.inserted, 0);
        assert_eq!(report.skipped_existing, 1);
        assert!(report.failures.is_empty());
        assert_eq!(
            store.find_all_texts().await.unwrap(),
            vec!["stored by another process"]
        );
    }
}
