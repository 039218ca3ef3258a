//! Coaching agents and the collaborator that runs them.
//!
//! An agent is pure data: a model, one document tool and an instruction
//! list. Running it is the job of an [`AgentExecutor`]; the production
//! executor drives an OpenAI tool-calling loop that writes the lesson to a
//! document and returns the model's final text.

mod registry;
mod runner;
mod tools;

pub use registry::{AgentDefinition, AgentOptions, AgentRegistry, AgentRole, ModelConfig};
pub use runner::{AgentResponse, OpenAIAgentRunner, ToolCallRecord};
pub use tools::{parse_tool_call, tool_definitions, ToolCall, ToolContext};

use crate::error::Result;
use async_trait::async_trait;

/// Runs an agent on one user message.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    /// Send `message` to `agent` and wait for its final response.
    async fn run(&self, agent: &AgentDefinition, message: &str) -> Result<AgentResponse>;
}
