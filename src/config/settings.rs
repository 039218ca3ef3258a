//! Configuration settings for Taalcoach.

use crate::error::{Result, TaalcoachError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub credentials: CredentialSettings,
    pub model: ModelSettings,
    pub documents: DocumentSettings,
    pub instructions: InstructionSettings,
    pub server: ServerSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level used when no `-v` flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// API keys stored in the config file. Environment and CLI flags take precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct CredentialSettings {
    pub openai_api_key: Option<String>,
    pub composio_api_key: Option<String>,
}

/// Model provider settings shared by all agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Chat model every agent runs on.
    pub name: String,
    /// HTTP timeout for a single model request, in seconds.
    pub timeout_secs: u64,
    /// Upper bound on model round-trips within one agent run.
    pub max_iterations: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: "gpt-4o-mini".to_string(),
            timeout_secs: crate::openai::DEFAULT_TIMEOUT_SECS,
            max_iterations: 10,
        }
    }
}

/// Document service (Composio) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Base URL of the Composio API.
    pub base_url: String,
    /// Composio entity whose connected Google account owns the documents.
    pub entity_id: String,
    /// Action used to create a new document.
    pub create_action: String,
    /// Action used to update an existing document.
    pub update_action: String,
    /// HTTP timeout for document service calls, in seconds.
    pub timeout_secs: u64,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            base_url: "https://backend.composio.dev".to_string(),
            entity_id: "default".to_string(),
            create_action: "GOOGLEDOCS_CREATE_DOCUMENT".to_string(),
            update_action: "GOOGLEDOCS_UPDATE_EXISTING_DOCUMENT".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Instruction customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstructionSettings {
    /// Directory containing a `roles.toml` that overrides default instructions.
    pub custom_dir: Option<String>,
    /// Variables available in all instructions as {{variable_name}}.
    pub variables: HashMap<String, String>,
}

impl Default for InstructionSettings {
    fn default() -> Self {
        let mut variables = HashMap::new();
        variables.insert("goal".to_string(), "Dutch-speaking job interviews".to_string());
        variables.insert("level".to_string(), "B1".to_string());
        Self {
            custom_dir: None,
            variables,
        }
    }
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Resolved API keys. Both are required before any agent can be built.
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub composio_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &mask_key(&self.openai_api_key))
            .field("composio_api_key", &mask_key(&self.composio_api_key))
            .finish()
    }
}

impl Credentials {
    /// Resolve credentials from explicit overrides (CLI flags / env) falling back to the config file.
    ///
    /// Keys are trimmed; a key that is missing or blank is a configuration error.
    pub fn resolve(
        openai_override: Option<&str>,
        composio_override: Option<&str>,
        settings: &Settings,
    ) -> Result<Self> {
        let openai_api_key = pick_key(
            openai_override,
            settings.credentials.openai_api_key.as_deref(),
        )
        .ok_or_else(|| {
            TaalcoachError::Config(
                "OpenAI API key not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
            )
        })?;

        let composio_api_key = pick_key(
            composio_override,
            settings.credentials.composio_api_key.as_deref(),
        )
        .ok_or_else(|| {
            TaalcoachError::Config(
                "Composio API key not set. Set it with: export COMPOSIO_API_KEY='...'".to_string(),
            )
        })?;

        Ok(Self {
            openai_api_key,
            composio_api_key,
        })
    }
}

fn pick_key(primary: Option<&str>, fallback: Option<&str>) -> Option<String> {
    [primary, fallback]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|k| !k.is_empty())
        .map(str::to_string)
}

/// Mask an API key for display, keeping only its ends.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 11 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| TaalcoachError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taalcoach")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model.name, "gpt-4o-mini");
        assert_eq!(settings.documents.create_action, "GOOGLEDOCS_CREATE_DOCUMENT");
        assert_eq!(settings.instructions.variables.get("level").map(String::as_str), Some("B1"));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[model]\nname = \"gpt-4.1\"\n\n[credentials]\ncomposio_api_key = \"cmp-key\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.model.name, "gpt-4.1");
        assert_eq!(settings.model.max_iterations, 10);
        assert_eq!(settings.credentials.composio_api_key.as_deref(), Some("cmp-key"));
        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.server.port = 8080;
        settings.save_to(&path).unwrap();

        let reloaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(reloaded.server.port, 8080);
    }

    #[test]
    fn test_credentials_prefer_override_and_trim() {
        let mut settings = Settings::default();
        settings.credentials.openai_api_key = Some("sk-from-file".into());
        settings.credentials.composio_api_key = Some("  cmp-from-file  ".into());

        let creds = Credentials::resolve(Some(" sk-from-env "), None, &settings).unwrap();
        assert_eq!(creds.openai_api_key, "sk-from-env");
        assert_eq!(creds.composio_api_key, "cmp-from-file");
    }

    #[test]
    fn test_blank_credentials_are_missing() {
        let mut settings = Settings::default();
        settings.credentials.openai_api_key = Some("sk-abc".into());

        let err = Credentials::resolve(None, Some("   "), &settings).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("Composio"));

        let err = Credentials::resolve(None, None, &Settings::default()).unwrap_err();
        assert!(err.to_string().contains("OpenAI"));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-proj-abcdefghijkl"), "sk-proj...ijkl");
        assert_eq!(mask_key("short"), "*****");
    }
}
