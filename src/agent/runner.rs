//! OpenAI agent runner with a tool calling loop.

use super::registry::AgentDefinition;
use super::tools::{parse_tool_call, tool_definitions, ToolContext};
use super::AgentExecutor;
use crate::config::{Credentials, ModelSettings};
use crate::documents::DocumentService;
use crate::error::{Result, TaalcoachError};
use crate::openai::create_client_with_timeout;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Runs agent definitions against the OpenAI chat completions API.
pub struct OpenAIAgentRunner {
    client: async_openai::Client<OpenAIConfig>,
    tools: ToolContext,
    max_iterations: usize,
}

impl OpenAIAgentRunner {
    /// Create a runner from an existing client and tool context.
    pub fn new(client: async_openai::Client<OpenAIConfig>, tools: ToolContext) -> Self {
        Self {
            client,
            tools,
            max_iterations: 10,
        }
    }

    /// Create a runner from settings and resolved credentials.
    pub fn from_settings(
        credentials: &Credentials,
        settings: &ModelSettings,
        documents: Arc<dyn DocumentService>,
    ) -> Result<Self> {
        let client = create_client_with_timeout(
            OpenAIConfig::new().with_api_key(&credentials.openai_api_key),
            Duration::from_secs(settings.timeout_secs),
        )?;
        Ok(Self::new(client, ToolContext::new(documents)).with_max_iterations(settings.max_iterations))
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Execute a single tool call and return a record of it.
    ///
    /// Only tools bound to the agent are run; anything else is reported back
    /// to the model.
    async fn execute_tool_call(
        &self,
        agent: &AgentDefinition,
        tool_call: &ChatCompletionMessageToolCall,
    ) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("{} calling tool: {}", agent.name(), name);
        debug!("Tool arguments: {}", arguments);

        let bound = agent.tools().iter().any(|t| t.function_name() == name.as_str());
        let result = if !bound {
            warn!("{} requested unbound tool: {}", agent.name(), name);
            format!("Tool not available: {}", name)
        } else {
            match parse_tool_call(name, arguments) {
                Ok(tool) => match self.tools.execute(&tool).await {
                    Ok(output) => output,
                    Err(e) => format!("Tool error: {}", e),
                },
                Err(e) => format!("Failed to parse tool call: {}", e),
            }
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }

    /// Build the final agent response.
    fn build_response(
        &self,
        agent: &AgentDefinition,
        content: &Option<String>,
        tool_calls: Vec<ToolCallRecord>,
        iterations: usize,
    ) -> AgentResponse {
        let mut content = content.clone().unwrap_or_default();

        if agent.options().show_tool_calls && !tool_calls.is_empty() {
            let running = tool_calls
                .iter()
                .map(|call| format!(" - {}", call.summary()))
                .collect::<Vec<_>>()
                .join("\n");
            content = format!("Running:\n{}\n\n{}", running, content);
        }

        AgentResponse {
            content,
            tool_calls,
            iterations,
            model: agent.model().id.clone(),
        }
    }
}

#[async_trait]
impl AgentExecutor for OpenAIAgentRunner {
    async fn run(&self, agent: &AgentDefinition, message: &str) -> Result<AgentResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(agent.system_prompt())
                .build()
                .map_err(|e| TaalcoachError::Agent(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(message.to_string())
                .build()
                .map_err(|e| TaalcoachError::Agent(e.to_string()))?
                .into(),
        ];

        let tools = tool_definitions(agent.tools());
        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(TaalcoachError::Agent(format!(
                    "{} exceeded maximum iterations ({})",
                    agent.name(),
                    self.max_iterations
                )));
            }

            debug!("{} iteration {}", agent.name(), iterations);

            let mut request = CreateChatCompletionRequestArgs::default();
            request.model(&agent.model().id).messages(messages.clone());
            if !tools.is_empty() {
                request.tools(tools.clone());
            }
            let request = request
                .build()
                .map_err(|e| TaalcoachError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| TaalcoachError::OpenAI(e.to_string()))?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| TaalcoachError::Agent("No response from model".to_string()))?;

            match choice.message.tool_calls {
                Some(ref tool_calls) if !tool_calls.is_empty() => {
                    let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                        .tool_calls(tool_calls.clone())
                        .build()
                        .map_err(|e| TaalcoachError::Agent(e.to_string()))?;
                    messages.push(assistant_msg.into());

                    for tool_call in tool_calls {
                        let record = self.execute_tool_call(agent, tool_call).await;

                        let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                            .tool_call_id(&tool_call.id)
                            .content(record.result.clone())
                            .build()
                            .map_err(|e| TaalcoachError::Agent(e.to_string()))?;
                        messages.push(tool_msg.into());

                        tool_calls_made.push(record);
                    }
                }
                _ => {
                    return Ok(self.build_response(
                        agent,
                        &choice.message.content,
                        tool_calls_made,
                        iterations,
                    ));
                }
            }
        }
    }
}

/// Response from an agent run.
#[derive(Debug, Clone, Default)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
    /// Model that produced the response.
    pub model: String,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl ToolCallRecord {
    /// One-line form with long arguments cut short.
    pub fn summary(&self) -> String {
        const MAX_ARGS: usize = 60;
        if self.arguments.chars().count() <= MAX_ARGS {
            return self.to_string();
        }
        let args: String = self.arguments.chars().take(MAX_ARGS).collect();
        format!("{}({}...)", self.name, args)
    }
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
