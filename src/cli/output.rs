//! CLI output formatting utilities.

use crate::ingest::IngestReport;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a stored transcript line.
    pub fn transcript_info(name: &str, chars: usize, created: &str) {
        println!(
            "  {} {} ({} chars, {})",
            style("*").cyan(),
            style(name).bold(),
            chars,
            style(created).dim()
        );
    }

    /// Print search result.
    pub fn search_result(rank: usize, offset: usize, score: f32, content: &str) {
        println!(
            "\n{} #{} @ char {} (score: {:.2})",
            style(">>").green(),
            rank,
            style(offset).cyan(),
            score
        );
        println!("   {}", content_preview(content, 200));
    }

    /// Print the counters and failures of an ingestion run.
    pub fn ingest_report(report: &IngestReport) {
        Output::header("Ingestion summary");
        Output::kv("Listed", &report.listed.to_string());
        Output::kv("Unique", &report.unique.to_string());
        Output::kv("Downloaded", &report.downloaded.to_string());
        Output::kv("Already downloaded", &report.skipped_downloads.to_string());
        Output::kv("Transcribed", &report.transcribed.to_string());
        Output::kv("Stored", &report.inserted.to_string());
        Output::kv("Already transcribed", &report.skipped_existing.to_string());

        if !report.failures.is_empty() {
            Output::header(&format!("Failures ({})", report.failures.len()));
            for failure in &report.failures {
                Output::list_item(&format!("{}: {}", failure.url, failure.error));
            }
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Collapse newlines and truncate on a character boundary.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
