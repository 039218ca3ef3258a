//! Coaching command implementations (daily, grammar, converse, weekly).

use crate::cli::preflight;
use crate::cli::{ApiKeys, Output, TextInput};
use crate::config::Settings;
use crate::dispatcher::{CoachingAction, CoachingResult, Dispatcher};
use crate::error::TaalcoachError;
use anyhow::{Context, Result};
use std::io::Read;

/// Which coaching command was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoachCommand {
    Daily,
    Grammar,
    Converse,
    Weekly,
}

impl CoachCommand {
    fn action(self, text: String) -> CoachingAction {
        match self {
            CoachCommand::Daily => CoachingAction::DailyVocabulary(text),
            CoachCommand::Grammar => CoachingAction::GrammarAssessment(text),
            CoachCommand::Converse => CoachingAction::ConversationPractice,
            CoachCommand::Weekly => CoachingAction::WeeklyPlan(text),
        }
    }

    fn working_message(self) -> &'static str {
        match self {
            CoachCommand::Daily => "Coaching you...",
            CoachCommand::Grammar => "Testing your Dutch skills...",
            CoachCommand::Converse => "Starting conversation...",
            CoachCommand::Weekly => "Building your weekly plan...",
        }
    }

    fn done_message(self) -> &'static str {
        match self {
            CoachCommand::Daily => "Feedback generated!",
            CoachCommand::Grammar => "Assessment complete!",
            CoachCommand::Converse => "Conversation complete!",
            CoachCommand::Weekly => "Weekly plan created!",
        }
    }
}

/// Run one coaching command end to end.
pub async fn run_coach(
    command: CoachCommand,
    input: Option<&TextInput>,
    keys: &ApiKeys,
    verbose: bool,
    settings: Settings,
) -> Result<()> {
    let text = match input {
        Some(input) => read_input(input)?,
        None => String::new(),
    };
    let action = command.action(text);

    let credentials = preflight::check(keys, &settings)?;

    if let Err(e) = action.validate() {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let dispatcher = match Dispatcher::connect(&credentials, &settings).await {
        Ok(d) => d,
        Err(e) => {
            Output::error(&e.to_string());
            return Err(e.into());
        }
    };

    let spinner = Output::spinner(command.working_message());
    let outcome = dispatcher.dispatch(action).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(result) => {
            print_result(command, &result, verbose);
            Ok(())
        }
        Err(e) => {
            let message = match &e {
                TaalcoachError::ExternalCall(_) => format!("Coaching failed: {}", e),
                _ => e.to_string(),
            };
            Output::error(&message);
            Err(e.into())
        }
    }
}

fn print_result(command: CoachCommand, result: &CoachingResult, verbose: bool) {
    Output::success(command.done_message());
    Output::header("Google Doc Link:");
    println!("\n{}\n", result.content);

    let links = result.document_links();
    if links.is_empty() {
        Output::warning("The response did not include a document link.");
    } else {
        for link in &links {
            Output::link(link);
        }
    }

    if verbose && !result.raw_response.tool_calls.is_empty() {
        Output::tool_calls(&result.raw_response.tool_calls);
    }

    if verbose {
        println!();
        Output::kv("Model", &result.raw_response.model);
        Output::kv("Iterations", &result.raw_response.iterations.to_string());
        Output::kv("Request", &result.request_id.to_string());
    }
}

/// Read the command text from the argument, a file, or stdin.
fn read_input(input: &TextInput) -> Result<String> {
    if let Some(path) = &input.file {
        let path = Settings::expand_path(path);
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    match input.text.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
        Some(text) => Ok(text.to_string()),
        None => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentRole;

    #[test]
    fn test_command_routing() {
        assert_eq!(
            CoachCommand::Weekly.action("x".into()).role(),
            AgentRole::WeeklyPlanner
        );
        assert_eq!(
            CoachCommand::Converse.action("ignored".into()),
            CoachingAction::ConversationPractice
        );
    }

    #[test]
    fn test_read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oefening.txt");
        std::fs::write(&path, "Gisteren ben ik naar de markt gegaan.").unwrap();

        let input = TextInput {
            text: None,
            file: Some(path.to_string_lossy().to_string()),
        };
        assert_eq!(read_input(&input).unwrap(), "Gisteren ben ik naar de markt gegaan.");

        let missing = TextInput {
            text: None,
            file: Some(dir.path().join("nope.txt").to_string_lossy().to_string()),
        };
        assert!(read_input(&missing).is_err());
    }

    #[test]
    fn test_read_input_without_text_is_empty() {
        let input = TextInput { text: None, file: None };
        assert_eq!(read_input(&input).unwrap(), "");
    }
}
