//! Doctor command - verify credentials, configuration and document tools.

use crate::cli::{preflight, ApiKeys, Output};
use crate::config::{mask_key, Instructions, Settings};
use crate::documents::{ComposioDocuments, DocumentAction, DocumentService};
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(keys: &ApiKeys, settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Taalcoach Doctor");
    println!();
    println!("Checking credentials, configuration and document tools...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Configuration").bold());
    let key_checks = vec![
        check_openai_key(keys.openai_api_key.as_deref().or(settings.credentials.openai_api_key.as_deref())),
        check_composio_key(keys.composio_api_key.as_deref().or(settings.credentials.composio_api_key.as_deref())),
    ];
    for check in &key_checks {
        check.print();
    }
    checks.extend(key_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![check_config_file(config_path), check_instructions(settings)];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    println!("{}", style("Document Tools").bold());
    let tool_checks = check_document_tools(keys, settings).await;
    for check in &tool_checks {
        check.print();
    }
    checks.extend(tool_checks);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Taalcoach.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Taalcoach is ready to use.");
    }

    Ok(())
}

/// Check the OpenAI API key.
fn check_openai_key(key: Option<&str>) -> CheckResult {
    match key.map(str::trim) {
        Some(key) if key.starts_with("sk-") && key.len() > 20 => {
            CheckResult::ok("OpenAI API key", &format!("configured ({})", mask_key(key)))
        }
        Some("") | None => CheckResult::error(
            "OpenAI API key",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Some(_) => CheckResult::warning(
            "OpenAI API key",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
    }
}

/// Check the Composio API key.
fn check_composio_key(key: Option<&str>) -> CheckResult {
    match key.map(str::trim) {
        Some("") | None => CheckResult::error(
            "Composio API key",
            "not set",
            "Set with: export COMPOSIO_API_KEY='...'",
        ),
        Some(key) => CheckResult::ok("Composio API key", &format!("configured ({})", mask_key(key))),
    }
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: taalcoach config edit",
        )
    }
}

/// Check that custom instructions (if any) load.
fn check_instructions(settings: &Settings) -> CheckResult {
    let custom_dir = settings.instructions.custom_dir.as_deref();
    match Instructions::load(custom_dir, Some(&settings.instructions.variables)) {
        Ok(_) => match custom_dir {
            Some(dir) => CheckResult::ok("Instructions", &format!("custom ({})", dir)),
            None => CheckResult::ok("Instructions", "built-in"),
        },
        Err(e) => CheckResult::error(
            "Instructions",
            &e.to_string(),
            "Fix or remove roles.toml in the custom instructions directory",
        ),
    }
}

/// Resolve both document tools against the live service.
async fn check_document_tools(keys: &ApiKeys, settings: &Settings) -> Vec<CheckResult> {
    let credentials = match preflight::credentials(keys, settings) {
        Ok(c) => c,
        Err(_) => {
            return vec![CheckResult::warning(
                "Google Docs tools",
                "skipped",
                "Configure both API keys to check the document tools",
            )]
        }
    };

    let documents = match ComposioDocuments::new(&settings.documents, &credentials.composio_api_key) {
        Ok(d) => d,
        Err(e) => return vec![CheckResult::error("Google Docs tools", &e.to_string(), "Check [documents] settings")],
    };

    let mut results = Vec::new();
    for action in [DocumentAction::Create, DocumentAction::Update] {
        let name = format!("Google Docs {}", action);
        let result = match documents.resolve_tool(action).await {
            Ok(Some(handle)) => CheckResult::ok(&name, &handle.action),
            Ok(None) => CheckResult::error(
                &name,
                "not found",
                "Check if Google Docs is connected in Composio",
            ),
            Err(e) => CheckResult::error(&name, &e.to_string(), "Check the Composio API key and base URL"),
        };
        results.push(result);
    }
    results
}
