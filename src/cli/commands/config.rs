//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::{mask_key, Settings};
use anyhow::Result;
use std::path::Path;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&masked(settings))
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Edit => {
            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save_to(&config_path.to_path_buf())?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Copy of the settings with API keys masked for display.
fn masked(mut settings: Settings) -> Settings {
    let creds = &mut settings.credentials;
    creds.openai_api_key = creds.openai_api_key.as_deref().map(mask_key);
    creds.composio_api_key = creds.composio_api_key.as_deref().map(mask_key);
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_masks_keys() {
        let mut settings = Settings::default();
        settings.credentials.openai_api_key = Some("sk-proj-1234567890abcd".to_string());

        let shown = toml::to_string_pretty(&masked(settings)).unwrap();
        assert!(shown.contains("sk-proj...abcd"));
        assert!(!shown.contains("1234567890"));
    }
}
