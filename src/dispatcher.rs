//! Coaching dispatcher.
//!
//! Turns one user action into exactly one agent run. Required input is
//! checked here, before anything leaves the process; everything after that
//! is a single call into the [`AgentExecutor`] with no retry or caching.

use crate::agent::{AgentExecutor, AgentRegistry, AgentResponse, AgentRole, OpenAIAgentRunner};
use crate::config::{Credentials, Instructions, Settings, DEFAULT_CONVERSATION_PROMPT};
use crate::documents::{ComposioDocuments, DocumentService};
use crate::error::{Result, TaalcoachError};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Which input surface a request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoachingMode {
    Daily,
    Weekly,
    Conversation,
}

/// A user action with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoachingAction {
    DailyVocabulary(String),
    GrammarAssessment(String),
    ConversationPractice,
    WeeklyPlan(String),
}

impl CoachingAction {
    /// Agent that handles this action.
    pub fn role(&self) -> AgentRole {
        match self {
            CoachingAction::DailyVocabulary(_) => AgentRole::VocabularyTeacher,
            CoachingAction::GrammarAssessment(_) => AgentRole::GrammarCoach,
            CoachingAction::ConversationPractice => AgentRole::ConversationPartner,
            CoachingAction::WeeklyPlan(_) => AgentRole::WeeklyPlanner,
        }
    }

    pub fn mode(&self) -> CoachingMode {
        match self {
            CoachingAction::DailyVocabulary(_) | CoachingAction::GrammarAssessment(_) => {
                CoachingMode::Daily
            }
            CoachingAction::ConversationPractice => CoachingMode::Conversation,
            CoachingAction::WeeklyPlan(_) => CoachingMode::Weekly,
        }
    }

    /// Check that the required input is present.
    pub fn validate(&self) -> Result<()> {
        let (text, input_name) = match self {
            CoachingAction::ConversationPractice => return Ok(()),
            CoachingAction::WeeklyPlan(text) => (text, "weekly summary"),
            CoachingAction::DailyVocabulary(text) | CoachingAction::GrammarAssessment(text) => {
                (text, "daily input")
            }
        };

        if text.is_empty() {
            return Err(TaalcoachError::Validation(format!(
                "Please enter your {} first.",
                input_name
            )));
        }
        Ok(())
    }
}

/// A validated request, ready to send to an agent.
#[derive(Debug, Clone, Serialize)]
pub struct CoachingRequest {
    pub id: Uuid,
    pub role: AgentRole,
    pub input_text: String,
    pub mode: CoachingMode,
    pub created_at: DateTime<Utc>,
}

/// The outcome of one coaching action.
#[derive(Debug, Clone)]
pub struct CoachingResult {
    pub request_id: Uuid,
    pub role: AgentRole,
    /// The agent's text, exactly as returned.
    pub content: String,
    pub raw_response: AgentResponse,
}

impl CoachingResult {
    /// Links found in the response, in order of appearance.
    ///
    /// The agent is only instructed to include a document link; an empty
    /// list is a normal outcome.
    pub fn document_links(&self) -> Vec<String> {
        extract_links(&self.content)
    }
}

/// Routes coaching actions to agents.
pub struct Dispatcher {
    registry: AgentRegistry,
    executor: Arc<dyn AgentExecutor>,
    conversation_prompt: String,
}

impl Dispatcher {
    /// Create a dispatcher with the default conversation prompt.
    pub fn new(registry: AgentRegistry, executor: Arc<dyn AgentExecutor>) -> Self {
        Self {
            registry,
            executor,
            conversation_prompt: DEFAULT_CONVERSATION_PROMPT.to_string(),
        }
    }

    /// Build the production dispatcher: Composio documents, OpenAI agents.
    ///
    /// Fails before any agent exists if the document tools cannot be resolved.
    pub async fn connect(credentials: &Credentials, settings: &Settings) -> Result<Self> {
        let instructions = Instructions::load(
            settings.instructions.custom_dir.as_deref(),
            Some(&settings.instructions.variables),
        )?;

        let documents: Arc<dyn DocumentService> = Arc::new(ComposioDocuments::new(
            &settings.documents,
            &credentials.composio_api_key,
        )?);

        let registry = AgentRegistry::connect(settings, &instructions, documents.as_ref()).await?;
        let executor = OpenAIAgentRunner::from_settings(credentials, &settings.model, documents)?;

        Ok(Self::new(registry, Arc::new(executor))
            .with_conversation_prompt(&instructions.conversation_prompt()))
    }

    /// Set the prompt sent for conversation practice.
    pub fn with_conversation_prompt(mut self, prompt: &str) -> Self {
        self.conversation_prompt = prompt.to_string();
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Vocabulary lesson based on today's exercises.
    pub async fn run_daily_vocabulary(&self, input_text: &str) -> Result<CoachingResult> {
        self.dispatch(CoachingAction::DailyVocabulary(input_text.to_string()))
            .await
    }

    /// Grammar lesson based on today's exercises.
    pub async fn run_grammar_assessment(&self, input_text: &str) -> Result<CoachingResult> {
        self.dispatch(CoachingAction::GrammarAssessment(input_text.to_string()))
            .await
    }

    /// Simulated conversation; takes no input.
    pub async fn run_conversation_practice(&self) -> Result<CoachingResult> {
        self.dispatch(CoachingAction::ConversationPractice).await
    }

    /// Weekly study plan from a summary of the week.
    pub async fn run_weekly_plan(&self, weekly_summary: &str) -> Result<CoachingResult> {
        self.dispatch(CoachingAction::WeeklyPlan(weekly_summary.to_string()))
            .await
    }

    /// Validate an action and turn it into a request.
    pub fn prepare(&self, action: CoachingAction) -> Result<CoachingRequest> {
        action.validate()?;

        let role = action.role();
        let mode = action.mode();
        let input_text = match action {
            CoachingAction::ConversationPractice => self.conversation_prompt.clone(),
            CoachingAction::DailyVocabulary(text)
            | CoachingAction::GrammarAssessment(text)
            | CoachingAction::WeeklyPlan(text) => text,
        };

        Ok(CoachingRequest {
            id: Uuid::new_v4(),
            role,
            input_text,
            mode,
            created_at: Utc::now(),
        })
    }

    /// Run one action: validate, then make exactly one agent call.
    #[instrument(skip(self), fields(role = %action.role()))]
    pub async fn dispatch(&self, action: CoachingAction) -> Result<CoachingResult> {
        let request = self.prepare(action)?;
        let agent = self.registry.role(request.role);

        info!("Running {} (request {})", agent.name(), request.id);

        let response = self
            .executor
            .run(agent, &request.input_text)
            .await
            .map_err(|e| e.into_external_call(agent.name()))?;

        let result = CoachingResult {
            request_id: request.id,
            role: request.role,
            content: response.content.clone(),
            raw_response: response,
        };

        if result.document_links().is_empty() {
            warn!("{} response contains no document link", agent.name());
        }

        Ok(result)
    }
}

fn link_regex() -> &'static Regex {
    static LINK: OnceLock<Regex> = OnceLock::new();
    LINK.get_or_init(|| Regex::new(r#"https?://[^\s<>()\[\]"'`]+"#).expect("Invalid regex"))
}

/// Find http(s) URLs in free text, dropping trailing punctuation and duplicates.
pub fn extract_links(text: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for m in link_regex().find_iter(text) {
        let candidate = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?', '*']);
        if url::Url::parse(candidate).is_ok() && !links.iter().any(|l| l == candidate) {
            links.push(candidate.to_string());
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentDefinition, ModelConfig};
    use crate::config::Instructions;
    use crate::documents::{DocumentAction, ToolHandle};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};

    /// Executor stub that records every call and returns a fixed reply.
    struct CountingExecutor {
        reply: std::result::Result<String, String>,
        calls: Mutex<Vec<(AgentRole, String)>>,
    }

    impl CountingExecutor {
        fn replying(content: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(content.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(AgentRole, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AgentExecutor for CountingExecutor {
        async fn run(&self, agent: &AgentDefinition, message: &str) -> Result<AgentResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((agent.kind(), message.to_string()));
            match &self.reply {
                Ok(content) => Ok(AgentResponse {
                    content: content.clone(),
                    iterations: 1,
                    model: agent.model().id.clone(),
                    ..Default::default()
                }),
                Err(message) => Err(TaalcoachError::OpenAI(message.clone())),
            }
        }
    }

    fn dispatcher(executor: Arc<CountingExecutor>) -> Dispatcher {
        let registry = AgentRegistry::new(
            ModelConfig::new("gpt-4o-mini"),
            ToolHandle::new("CREATE", DocumentAction::Create, None),
            ToolHandle::new("UPDATE", DocumentAction::Update, None),
            &Instructions::default(),
        )
        .unwrap();
        Dispatcher::new(registry, executor)
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected_without_calls() {
        let executor = CountingExecutor::replying("unused");
        let dispatcher = dispatcher(executor.clone());

        for action in [
            CoachingAction::DailyVocabulary(String::new()),
            CoachingAction::GrammarAssessment(String::new()),
            CoachingAction::WeeklyPlan(String::new()),
        ] {
            let err = assert_err!(dispatcher.dispatch(action).await);
            assert!(matches!(err, TaalcoachError::Validation(_)));
        }
        let err = assert_err!(dispatcher.run_daily_vocabulary("").await);
        assert_eq!(err.to_string(), "Invalid input: Please enter your daily input first.");
        let err = assert_err!(dispatcher.run_weekly_plan("").await);
        assert_eq!(err.to_string(), "Invalid input: Please enter your weekly summary first.");

        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_input_is_dispatched_as_is() {
        let executor = CountingExecutor::replying("Nog een keer?");
        let dispatcher = dispatcher(executor.clone());

        let result = assert_ok!(dispatcher.run_daily_vocabulary("   ").await);

        assert_eq!(result.content, "Nog een keer?");
        assert_eq!(executor.calls().len(), 1);
        assert_eq!(executor.calls()[0].1, "   ");
    }

    #[tokio::test]
    async fn test_daily_vocabulary_returns_content_verbatim() {
        let executor = CountingExecutor::replying("Doc: https://docs.example/abc");
        let dispatcher = dispatcher(executor.clone());

        let input = "Ik heb vandaag vijf nieuwe woorden geleerd.";
        let result = assert_ok!(dispatcher.run_daily_vocabulary(input).await);

        assert_eq!(result.content, "Doc: https://docs.example/abc");
        assert_eq!(result.role, AgentRole::VocabularyTeacher);
        assert_eq!(result.document_links(), vec!["https://docs.example/abc".to_string()]);
        assert_eq!(
            executor.calls(),
            vec![(AgentRole::VocabularyTeacher, input.to_string())]
        );
    }

    #[tokio::test]
    async fn test_each_operation_routes_to_its_agent() {
        let executor = CountingExecutor::replying("**Klaar**");
        let dispatcher = dispatcher(executor.clone());

        let results = vec![
            dispatcher.run_daily_vocabulary("woorden").await.unwrap(),
            dispatcher.run_grammar_assessment("de/het").await.unwrap(),
            dispatcher.run_conversation_practice().await.unwrap(),
            dispatcher.run_weekly_plan("Deze week: werkwoorden").await.unwrap(),
        ];
        for result in &results {
            assert_eq!(result.content, "**Klaar**");
            assert!(result.document_links().is_empty());
        }

        let roles: Vec<AgentRole> = executor.calls().into_iter().map(|(r, _)| r).collect();
        assert_eq!(
            roles,
            vec![
                AgentRole::VocabularyTeacher,
                AgentRole::GrammarCoach,
                AgentRole::ConversationPartner,
                AgentRole::WeeklyPlanner,
            ]
        );
    }

    #[tokio::test]
    async fn test_conversation_practice_is_independent_per_call() {
        let executor = CountingExecutor::replying("Gesprek: https://docs.example/conv");
        let dispatcher = dispatcher(executor.clone());

        let first = dispatcher.run_conversation_practice().await.unwrap();
        let second = dispatcher.run_conversation_practice().await.unwrap();

        assert_ne!(first.request_id, second.request_id);
        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, DEFAULT_CONVERSATION_PROMPT);
        assert_eq!(calls[1].1, DEFAULT_CONVERSATION_PROMPT);
    }

    #[tokio::test]
    async fn test_custom_conversation_prompt() {
        let executor = CountingExecutor::replying("ok");
        let dispatcher = dispatcher(executor.clone()).with_conversation_prompt("Oefen een sollicitatie.");
        dispatcher.run_conversation_practice().await.unwrap();
        assert_eq!(executor.calls()[0].1, "Oefen een sollicitatie.");
    }

    #[tokio::test]
    async fn test_executor_failure_is_external_call_error() {
        let executor = CountingExecutor::failing("connection reset");
        let dispatcher = dispatcher(executor.clone());

        let err = dispatcher.run_weekly_plan("samenvatting").await.unwrap_err();
        match err {
            TaalcoachError::ExternalCall(msg) => {
                assert!(msg.contains("Weekly Language Planner"));
                assert!(msg.contains("connection reset"));
            }
            other => panic!("Expected ExternalCall, got {:?}", other),
        }
        // Not retried
        assert_eq!(executor.calls().len(), 1);
    }

    #[test]
    fn test_prepare_keeps_input_untouched() {
        let dispatcher = dispatcher(CountingExecutor::replying(""));
        let request = dispatcher
            .prepare(CoachingAction::WeeklyPlan("  Week 3  ".to_string()))
            .unwrap();
        assert_eq!(request.input_text, "  Week 3  ");
        assert_eq!(request.mode, CoachingMode::Weekly);
        assert_eq!(request.role, AgentRole::WeeklyPlanner);
    }

    #[test]
    fn test_extract_links() {
        let text = "Here is your doc: https://docs.google.com/document/d/1x/edit. \
                    [Open](https://docs.google.com/document/d/1x/edit) or http://example.com/a?b=c!";
        assert_eq!(
            extract_links(text),
            vec![
                "https://docs.google.com/document/d/1x/edit".to_string(),
                "http://example.com/a?b=c".to_string(),
            ]
        );
        assert!(extract_links("Geen link vandaag.").is_empty());
    }
}
