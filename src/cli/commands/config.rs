//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: Option<&PathBuf>) -> Result<()> {
    let config_path = config_path
        .cloned()
        .unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&redacted(settings))
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }

        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                Output::warning(&format!(
                    "Config already exists at {}. Use --force to overwrite.",
                    config_path.display()
                ));
                return Ok(());
            }
            Settings::default().save_to(&config_path)?;
            Output::success(&format!("Wrote default config to {}", config_path.display()));
        }
    }

    Ok(())
}

/// Hide the catalog secret before printing.
fn redacted(mut settings: Settings) -> Settings {
    if settings.catalog.api_secret.is_some() {
        settings.catalog.api_secret = Some("********".to_string());
    }
    settings
}
