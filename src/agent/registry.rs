//! Static agent definitions and the registry that holds them.

use crate::config::{Instructions, Settings};
use crate::documents::{DocumentAction, DocumentService, ToolHandle};
use crate::error::{Result, TaalcoachError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info};

/// The four coaching roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentRole {
    VocabularyTeacher,
    GrammarCoach,
    WeeklyPlanner,
    ConversationPartner,
}

impl AgentRole {
    pub const ALL: [AgentRole; 4] = [
        AgentRole::VocabularyTeacher,
        AgentRole::GrammarCoach,
        AgentRole::WeeklyPlanner,
        AgentRole::ConversationPartner,
    ];

    /// Stable machine-readable key.
    pub fn key(&self) -> &'static str {
        match self {
            AgentRole::VocabularyTeacher => "vocabulary-teacher",
            AgentRole::GrammarCoach => "grammar-coach",
            AgentRole::WeeklyPlanner => "weekly-planner",
            AgentRole::ConversationPartner => "conversation-partner",
        }
    }

    /// Display name of the agent.
    pub fn name(&self) -> &'static str {
        match self {
            AgentRole::VocabularyTeacher => "Dutch Vocabulary Teacher",
            AgentRole::GrammarCoach => "Dutch Grammar Coach",
            AgentRole::WeeklyPlanner => "Weekly Language Planner",
            AgentRole::ConversationPartner => "Virtual Dutch Partner",
        }
    }

    /// Role description given to the model.
    pub fn description(&self) -> &'static str {
        match self {
            AgentRole::VocabularyTeacher => "Dutch Vocabulary Teacher",
            AgentRole::GrammarCoach => "Dutch Grammar Coach",
            AgentRole::WeeklyPlanner => "Dutch Learning Tracker and Planner",
            AgentRole::ConversationPartner => "Dutch Conversation Practice Simulator",
        }
    }
}

impl std::str::FromStr for AgentRole {
    type Err = TaalcoachError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        AgentRole::ALL
            .into_iter()
            .find(|role| {
                role.key().eq_ignore_ascii_case(wanted) || role.name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| TaalcoachError::UnknownRole(s.to_string()))
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Model an agent runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: String,
}

impl ModelConfig {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

/// Presentation options for an agent's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOptions {
    /// Prefix the response with the tool calls the agent made.
    pub show_tool_calls: bool,
    /// Ask the model to format its answer as markdown.
    pub markdown: bool,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            show_tool_calls: true,
            markdown: true,
        }
    }
}

/// An immutable agent configuration: model, one document tool and instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentDefinition {
    kind: AgentRole,
    name: String,
    role: String,
    model: ModelConfig,
    tools: Vec<ToolHandle>,
    instructions: Vec<String>,
    options: AgentOptions,
}

impl AgentDefinition {
    /// Build a definition. Fails if the instruction list is empty.
    pub fn new(
        kind: AgentRole,
        model: ModelConfig,
        tool: ToolHandle,
        instructions: Vec<String>,
        options: AgentOptions,
    ) -> Result<Self> {
        if instructions.iter().all(|line| line.trim().is_empty()) {
            return Err(TaalcoachError::Config(format!(
                "{} has no instructions",
                kind.name()
            )));
        }

        Ok(Self {
            kind,
            name: kind.name().to_string(),
            role: kind.description().to_string(),
            model,
            tools: vec![tool],
            instructions,
            options,
        })
    }

    pub fn kind(&self) -> AgentRole {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    pub fn tools(&self) -> &[ToolHandle] {
        &self.tools
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    pub fn options(&self) -> AgentOptions {
        self.options
    }

    /// System message sent to the model for this agent.
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!("You are {}.\nYour role is: {}\n\n## Instructions\n", self.name, self.role);
        for line in &self.instructions {
            if line.starts_with('-') {
                prompt.push_str(&format!("  {}\n", line));
            } else {
                prompt.push_str(&format!("- {}\n", line));
            }
        }
        if self.options.markdown {
            prompt.push_str("- Use markdown to format your answers.\n");
        }
        prompt
    }
}

/// The fixed set of coaching agents, built once at startup.
#[derive(Debug)]
pub struct AgentRegistry {
    agents: HashMap<AgentRole, AgentDefinition>,
    create_tool: ToolHandle,
    update_tool: ToolHandle,
}

impl AgentRegistry {
    /// Build all four agents. Every agent is bound to the create-document tool.
    pub fn new(
        model: ModelConfig,
        create_tool: ToolHandle,
        update_tool: ToolHandle,
        instructions: &Instructions,
    ) -> Result<Self> {
        if create_tool.kind != DocumentAction::Create || update_tool.kind != DocumentAction::Update {
            return Err(TaalcoachError::Config(
                "Document tool handles are swapped".to_string(),
            ));
        }

        let agents = AgentRole::ALL
            .into_iter()
            .map(|role| {
                AgentDefinition::new(
                    role,
                    model.clone(),
                    create_tool.clone(),
                    instructions.for_role(role),
                    AgentOptions::default(),
                )
                .map(|def| (role, def))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self {
            agents,
            create_tool,
            update_tool,
        })
    }

    /// Resolve both document tools from the service, then build the registry.
    ///
    /// A missing tool, or any failure while resolving one, aborts construction.
    pub async fn connect(
        settings: &Settings,
        instructions: &Instructions,
        documents: &dyn DocumentService,
    ) -> Result<Self> {
        let create_tool = resolve_tool(documents, DocumentAction::Create).await?;
        let update_tool = resolve_tool(documents, DocumentAction::Update).await?;

        let registry = Self::new(
            ModelConfig::new(&settings.model.name),
            create_tool,
            update_tool,
            instructions,
        )?;
        info!("Agent registry ready ({} agents on {})", registry.agents.len(), settings.model.name);
        Ok(registry)
    }

    /// Look up an agent by role key or display name.
    pub fn get(&self, role_name: &str) -> Result<&AgentDefinition> {
        match role_name.parse::<AgentRole>() {
            Ok(role) => Ok(self.role(role)),
            Err(e) => {
                error!("Lookup of unregistered agent role '{}'", role_name);
                Err(e)
            }
        }
    }

    /// Look up an agent by role.
    pub fn role(&self, role: AgentRole) -> &AgentDefinition {
        // `new` builds an entry for every role
        &self.agents[&role]
    }

    /// All agents in role order.
    pub fn agents(&self) -> impl Iterator<Item = &AgentDefinition> {
        AgentRole::ALL.into_iter().map(move |role| self.role(role))
    }

    pub fn create_tool(&self) -> &ToolHandle {
        &self.create_tool
    }

    pub fn update_tool(&self) -> &ToolHandle {
        &self.update_tool
    }
}

async fn resolve_tool(documents: &dyn DocumentService, action: DocumentAction) -> Result<ToolHandle> {
    match documents.resolve_tool(action).await {
        Ok(Some(handle)) => Ok(handle),
        Ok(None) => Err(TaalcoachError::ToolUnavailable(format!(
            "Could not find the Google Docs {} tool. Check if Google Docs is connected in Composio.",
            action
        ))),
        Err(e) => Err(TaalcoachError::ToolUnavailable(format!(
            "Error initializing document tools: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::MemoryDocuments;
    use std::collections::HashSet;

    fn registry() -> AgentRegistry {
        AgentRegistry::new(
            ModelConfig::new("gpt-4o-mini"),
            ToolHandle::new("CREATE", DocumentAction::Create, None),
            ToolHandle::new("UPDATE", DocumentAction::Update, None),
            &Instructions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_known_roles_are_distinct() {
        let registry = registry();
        let names: HashSet<&str> = [
            "vocabulary-teacher",
            "grammar-coach",
            "weekly-planner",
            "conversation-partner",
        ]
        .iter()
        .map(|key| registry.get(key).unwrap().name())
        .collect();
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_lookup_by_display_name() {
        let registry = registry();
        let agent = registry.get("virtual dutch partner").unwrap();
        assert_eq!(agent.kind(), AgentRole::ConversationPartner);
        assert_eq!(agent.role(), "Dutch Conversation Practice Simulator");
    }

    #[test]
    fn test_unknown_role() {
        let registry = registry();
        for name in ["", "translator", "grammar"] {
            match registry.get(name) {
                Err(TaalcoachError::UnknownRole(n)) => assert_eq!(n, name),
                other => panic!("Expected UnknownRole, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_every_agent_has_one_tool_and_instructions() {
        let registry = registry();
        for agent in registry.agents() {
            assert_eq!(agent.tools().len(), 1);
            assert_eq!(agent.tools()[0].kind, DocumentAction::Create);
            assert!(!agent.instructions().is_empty());
            assert_eq!(agent.model().id, "gpt-4o-mini");
        }
        assert_eq!(registry.update_tool().action, "UPDATE");
    }

    #[test]
    fn test_empty_instructions_rejected() {
        let err = AgentDefinition::new(
            AgentRole::GrammarCoach,
            ModelConfig::new("gpt-4o-mini"),
            ToolHandle::new("CREATE", DocumentAction::Create, None),
            vec![],
            AgentOptions::default(),
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_system_prompt() {
        let registry = registry();
        let prompt = registry.role(AgentRole::VocabularyTeacher).system_prompt();
        assert!(prompt.starts_with("You are Dutch Vocabulary Teacher.\n"));
        assert!(prompt.contains("\n  - English translation\n"));
        assert!(prompt.ends_with("- Use markdown to format your answers.\n"));
    }

    #[tokio::test]
    async fn test_connect_fails_fast_without_update_tool() {
        let docs = MemoryDocuments::new().without(DocumentAction::Update);
        let err = AgentRegistry::connect(&Settings::default(), &Instructions::default(), &docs)
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("update_document"));
    }

    #[tokio::test]
    async fn test_connect_fails_fast_without_create_tool() {
        let docs = MemoryDocuments::new().without(DocumentAction::Create);
        let err = AgentRegistry::connect(&Settings::default(), &Instructions::default(), &docs)
            .await
            .unwrap_err();
        assert!(matches!(err, TaalcoachError::ToolUnavailable(_)));
    }

    #[tokio::test]
    async fn test_connect() {
        let docs = MemoryDocuments::new();
        let registry = AgentRegistry::connect(&Settings::default(), &Instructions::default(), &docs)
            .await
            .unwrap();
        assert_eq!(registry.create_tool().action, "MEMORY_CREATE_DOCUMENT");
        assert_eq!(registry.agents().count(), 4);
    }
}
