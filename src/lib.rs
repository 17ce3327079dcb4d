//! Hark - searchable transcripts of a media library
//!
//! Hark mirrors the videos of a Cloudinary account into a local transcript
//! store and answers natural-language questions over everything transcribed
//! so far.
//!
//! # Overview
//!
//! Two paths share the transcript store:
//! - Ingestion lists the catalog, drops duplicate filenames, downloads what
//!   is missing, transcribes what has no transcript yet and persists it.
//!   Re-running it over an unchanged catalog does nothing.
//! - Querying splits the whole corpus into overlapping chunks, embeds them
//!   into an in-memory index, retrieves the closest chunks to a question and
//!   has a language model answer from those chunks alone.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `catalog` - Media catalog listing (Cloudinary)
//! - `download` - Duplicate suppression and media downloads
//! - `transcription` - Speech-to-text backends
//! - `store` - Transcript persistence
//! - `ingest` - Ingestion pipeline and local uploads
//! - `chunking` - Corpus splitting
//! - `embedding` - Embedding backends
//! - `index` - In-memory semantic index
//! - `rag` - Answer generation, usage and cost
//! - `orchestrator` - Wiring of backends from settings
//!
//! # Example
//!
//! ```rust,no_run
//! use hark::config::Settings;
//! use hark::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let report = orchestrator.ingestion_pipeline()?.ingest().await?;
//!     println!("Stored {} new transcripts", report.inserted);
//!
//!     let answer = orchestrator.query_engine(None)?.ask("What was announced?", 4).await?;
//!     println!("{}", answer.result.answer_text);
//!
//!     orchestrator.close().await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod download;
pub mod embedding;
pub mod error;
pub mod index;
pub mod ingest;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod store;
pub mod transcription;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{HarkError, Result};
