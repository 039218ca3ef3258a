//! Pre-flight checks before any agent is built.
//!
//! Both API keys must be present before the document tools are resolved or
//! a model is called; a missing key stops the command immediately.

use crate::cli::{ApiKeys, Output};
use crate::config::{Credentials, Settings};
use crate::error::Result;

/// Resolve credentials from flags/environment and the config file.
pub fn credentials(keys: &ApiKeys, settings: &Settings) -> Result<Credentials> {
    Credentials::resolve(
        keys.openai_api_key.as_deref(),
        keys.composio_api_key.as_deref(),
        settings,
    )
}

/// Resolve credentials, printing a hint on failure.
pub fn check(keys: &ApiKeys, settings: &Settings) -> Result<Credentials> {
    credentials(keys, settings).inspect_err(|e| {
        Output::error(&e.to_string());
        Output::info("Run 'taalcoach doctor' for detailed diagnostics.");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_fail() {
        let err = credentials(&ApiKeys::default(), &Settings::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_keys_from_flags() {
        let keys = ApiKeys {
            openai_api_key: Some("sk-abc".to_string()),
            composio_api_key: Some("cmp-abc".to_string()),
        };
        let creds = credentials(&keys, &Settings::default()).unwrap();
        assert_eq!(creds.composio_api_key, "cmp-abc");
    }
}
