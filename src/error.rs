//! Error types for Taalcoach.

use thiserror::Error;

/// Library-level error type for Taalcoach operations.
#[derive(Error, Debug)]
pub enum TaalcoachError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document tool unavailable: {0}")]
    ToolUnavailable(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Unknown agent role: {0}")]
    UnknownRole(String),

    #[error("Agent call failed: {0}")]
    ExternalCall(String),

    #[error("Document service error: {0}")]
    Documents(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Agent error: {0}")]
    Agent(String),
}

impl TaalcoachError {
    /// Whether this error means the process is misconfigured and no agent can run.
    pub fn is_configuration(&self) -> bool {
        matches!(self, TaalcoachError::Config(_) | TaalcoachError::ToolUnavailable(_))
    }

    /// Fold any failure raised while an agent was running into `ExternalCall`.
    pub fn into_external_call(self, agent: &str) -> Self {
        match self {
            TaalcoachError::ExternalCall(_) => self,
            other => TaalcoachError::ExternalCall(format!("{}: {}", agent, other)),
        }
    }
}

/// Result type alias for Taalcoach operations.
pub type Result<T> = std::result::Result<T, TaalcoachError>;
