//! Hark CLI entry point.

use anyhow::Result;
use clap::Parser;
use hark::cli::{commands, Cli, Commands};
use hark::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::load_from(cli.config.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("hark={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    // Ensure data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Ingest => {
            commands::run_ingest(settings).await?;
        }

        Commands::Transcribe { files } => {
            commands::run_transcribe(files, settings).await?;
        }

        Commands::Ask { question, k, model } => {
            commands::run_ask(question, *k, model.clone(), settings).await?;
        }

        Commands::Search { query, k } => {
            commands::run_search(query, *k, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, cli.config.as_ref())?;
        }
    }

    Ok(())
}
