//! Catalog ingestion: list → dedupe → download → transcribe → persist.

use super::{is_duplicate, transcript_name, IngestReport, ItemFailure, ItemTally};
use crate::catalog::{list_all, MediaCatalog};
use crate::config::IngestSettings;
use crate::download::{dedupe, local_file_name, Downloader, Fetched};
use crate::error::Result;
use crate::store::{Transcript, TranscriptStore};
use crate::transcription::Transcriber;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Brings every catalog item into the transcript store exactly once.
pub struct IngestionPipeline {
    catalog: Arc<dyn MediaCatalog>,
    downloader: Downloader,
    transcriber: Arc<dyn Transcriber>,
    store: Arc<dyn TranscriptStore>,
    transcript_suffix: String,
    max_concurrent: usize,
}

impl IngestionPipeline {
    pub fn new(
        catalog: Arc<dyn MediaCatalog>,
        downloader: Downloader,
        transcriber: Arc<dyn Transcriber>,
        store: Arc<dyn TranscriptStore>,
    ) -> Self {
        let defaults = IngestSettings::default();
        Self {
            catalog,
            downloader,
            transcriber,
            store,
            transcript_suffix: defaults.transcript_suffix,
            max_concurrent: defaults.max_concurrent,
        }
    }

    /// Apply suffix and worker count from settings.
    pub fn with_settings(mut self, settings: &IngestSettings) -> Self {
        self.transcript_suffix = settings.transcript_suffix.clone();
        self.max_concurrent = settings.max_concurrent.max(1);
        self
    }

    /// Run one ingestion pass over the whole catalog.
    ///
    /// A failing catalog aborts the run. Failures of individual items are
    /// logged, collected in the report, and do not stop the other items.
    ///
    /// Items mapping to the same transcript name form one group and are
    /// handled in catalog order by a single worker, so a later item still
    /// gets transcribed when an earlier one of its group fails.
    #[instrument(skip(self))]
    pub async fn ingest(&self) -> Result<IngestReport> {
        let resources = list_all(self.catalog.as_ref()).await?;
        let urls: Vec<&str> = resources.iter().map(|r| r.secure_url.as_str()).collect();
        let unique = dedupe(&urls);

        info!(
            "Catalog lists {} resources, {} after removing duplicates",
            resources.len(),
            unique.len()
        );

        let local_files = self.downloader.existing_files()?;
        let existing = self.store.names().await?;
        let groups = group_by_transcript_name(&unique, &self.transcript_suffix);

        let local_files = &local_files;
        let existing = &existing;
        let mut outcomes: Vec<ItemOutcome> = stream::iter(groups)
            .map(move |group| self.ingest_group(group, local_files, existing))
            .buffer_unordered(self.max_concurrent.max(1))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        // Report failures in catalog order
        outcomes.sort_by_key(|(idx, _, _)| *idx);

        let mut report = IngestReport {
            listed: resources.len(),
            unique: unique.len(),
            ..Default::default()
        };
        for (_, tally, failure) in outcomes {
            report.record(tally);
            report.failures.extend(failure);
        }

        info!(
            "Ingestion finished: {} downloaded, {} transcribed, {} inserted, {} failed",
            report.downloaded,
            report.transcribed,
            report.inserted,
            report.failures.len()
        );

        Ok(report)
    }

    /// Process the items of one transcript name in order.
    ///
    /// Once an item has a stored transcript the remaining items are only
    /// downloaded and counted as existing.
    async fn ingest_group(
        &self,
        group: Vec<(usize, &str)>,
        local_files: &HashSet<String>,
        existing: &HashSet<String>,
    ) -> Vec<ItemOutcome> {
        let mut stored = false;
        let mut outcomes = Vec::with_capacity(group.len());

        for (idx, url) in group {
            let mut tally = ItemTally::default();
            let failure = self
                .ingest_item(url, local_files, existing, stored, &mut tally)
                .await
                .err()
                .map(|e| {
                    warn!(url = %url, error = %e, "Skipping item");
                    ItemFailure {
                        url: url.to_string(),
                        error: e.to_string(),
                    }
                });
            stored = stored || tally.inserted || tally.skipped_existing;
            outcomes.push((idx, tally, failure));
        }

        outcomes
    }

    async fn ingest_item(
        &self,
        url: &str,
        local_files: &HashSet<String>,
        existing: &HashSet<String>,
        stored: bool,
        tally: &mut ItemTally,
    ) -> Result<()> {
        let file_name = local_file_name(url)?;

        let media_path = if local_files.contains(file_name) {
            debug!(filename = %file_name, "Already downloaded");
            tally.skipped_download = true;
            self.downloader.target_path(file_name)
        } else {
            match self.downloader.fetch(url).await? {
                Fetched::Downloaded { path, .. } => {
                    tally.downloaded = true;
                    path
                }
                Fetched::Cached(path) => {
                    tally.skipped_download = true;
                    path
                }
            }
        };

        let name = transcript_name(file_name, &self.transcript_suffix);
        if stored || existing.contains(&name) {
            debug!(filename = %file_name, transcript = %name, "Transcript exists");
            tally.skipped_existing = true;
            return Ok(());
        }

        let text = self.transcriber.transcribe(&media_path).await?;
        tally.transcribed = true;

        match self.store.insert(&Transcript::new(name.clone(), text)).await {
            Ok(()) => {
                info!(filename = %file_name, transcript = %name, "Stored transcript");
                tally.inserted = true;
                Ok(())
            }
            Err(e) if is_duplicate(&e) => {
                warn!(filename = %file_name, transcript = %name, "Transcript inserted concurrently");
                tally.skipped_existing = true;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Catalog position, what happened, and the failure if any.
type ItemOutcome = (usize, ItemTally, Option<ItemFailure>);

/// Group URLs by the transcript name they produce, keeping catalog order
/// inside each group and ordering groups by their first item.
///
/// A URL without a usable filename gets a group of its own so its failure
/// is reported by the worker.
fn group_by_transcript_name<'a>(urls: &'a [String], suffix: &str) -> Vec<Vec<(usize, &'a str)>> {
    let mut groups: Vec<Vec<(usize, &str)>> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for (idx, url) in urls.iter().enumerate() {
        let item = (idx, url.as_str());
        match local_file_name(url) {
            Ok(file_name) => {
                let name = transcript_name(file_name, suffix);
                match by_name.get(&name) {
                    Some(&group) => groups[group].push(item),
                    None => {
                        by_name.insert(name, groups.len());
                        groups.push(vec![item]);
                    }
                }
            }
            Err(_) => groups.push(vec![item]),
        }
    }

    groups
}
