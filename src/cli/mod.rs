//! CLI module for Hark.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hark - searchable transcripts of a media library
///
/// Pulls video from a Cloudinary account, transcribes it once, and answers
/// questions over the collected transcripts.
#[derive(Parser, Debug)]
#[command(name = "hark")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "HARK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and transcribe every new item in the media catalog
    Ingest,

    /// Transcribe local audio/video files into the store
    Transcribe {
        /// Files to transcribe
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Ask a question and get an answer from your transcripts
    Ask {
        /// The question to ask
        question: String,

        /// Number of transcript chunks used as context
        #[arg(short = 'k', long = "top-k", value_parser = top_k_parser())]
        k: Option<usize>,

        /// LLM model to use for response generation
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Search for relevant transcript passages
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short = 'k', long = "top-k", value_parser = top_k_parser())]
        k: Option<usize>,
    },

    /// List stored transcripts
    List,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn top_k_parser() -> clap::builder::RangedU64ValueParser<usize> {
    clap::builder::RangedU64ValueParser::new().range(1..)
}
