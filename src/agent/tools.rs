//! Document tool definitions and execution for the agent system.

use crate::documents::{DocumentAction, DocumentService, ToolHandle};
use crate::error::{Result, TaalcoachError};
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A parsed tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Create a new document.
    CreateDocument { title: String, content: String },

    /// Replace the content of an existing document.
    UpdateDocument { document_id: String, content: String },
}

/// Tool execution context with access to the document service.
#[derive(Clone)]
pub struct ToolContext {
    pub documents: Arc<dyn DocumentService>,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(documents: Arc<dyn DocumentService>) -> Self {
        Self { documents }
    }

    /// Execute a tool call and return the result as a string for the model.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::CreateDocument { title, content } => {
                let doc = self.documents.create_document(title, content).await?;
                Ok(format!(
                    "Document created.\nTitle: {}\nDocument ID: {}\nLink: {}",
                    title, doc.id, doc.url
                ))
            }
            ToolCall::UpdateDocument {
                document_id,
                content,
            } => {
                let doc = self.documents.update_document(document_id, content).await?;
                Ok(format!(
                    "Document updated.\nDocument ID: {}\nLink: {}",
                    doc.id, doc.url
                ))
            }
        }
    }
}

/// OpenAI function definitions for the given tool handles.
pub fn tool_definitions(handles: &[ToolHandle]) -> Vec<ChatCompletionTool> {
    handles
        .iter()
        .map(|handle| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: handle.function_name().to_string(),
                description: Some(handle.description.clone()),
                parameters: Some(parameters(handle.kind)),
                strict: None,
            },
        })
        .collect()
}

fn parameters(kind: DocumentAction) -> serde_json::Value {
    match kind {
        DocumentAction::Create => serde_json::json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Document title"
                },
                "content": {
                    "type": "string",
                    "description": "Full document text"
                }
            },
            "required": ["title", "content"]
        }),
        DocumentAction::Update => serde_json::json!({
            "type": "object",
            "properties": {
                "document_id": {
                    "type": "string",
                    "description": "ID of the document to update"
                },
                "content": {
                    "type": "string",
                    "description": "New document text"
                }
            },
            "required": ["document_id", "content"]
        }),
    }
}

/// Parse a tool call from the OpenAI response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| TaalcoachError::Agent(format!("Invalid tool arguments: {}", e)))?;

    let content = || {
        args["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| TaalcoachError::Agent("Missing 'content' argument".to_string()))
    };

    match name {
        "create_document" => {
            let title = args["title"]
                .as_str()
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(default_title);
            Ok(ToolCall::CreateDocument {
                title,
                content: content()?,
            })
        }
        "update_document" => {
            let document_id = args["document_id"]
                .as_str()
                .ok_or_else(|| TaalcoachError::Agent("Missing 'document_id' argument".to_string()))?
                .to_string();
            Ok(ToolCall::UpdateDocument {
                document_id,
                content: content()?,
            })
        }
        _ => Err(TaalcoachError::Agent(format!("Unknown tool: {}", name))),
    }
}

/// Title used when the model leaves it out.
fn default_title() -> String {
    format!("Dutch practice {}", chrono::Local::now().format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::MemoryDocuments;

    #[test]
    fn test_parse_create_document() {
        let tool = parse_tool_call(
            "create_document",
            r#"{"title": "Woorden van de dag", "content": "de sollicitatie"}"#,
        )
        .unwrap();
        assert_eq!(
            tool,
            ToolCall::CreateDocument {
                title: "Woorden van de dag".to_string(),
                content: "de sollicitatie".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_create_document_default_title() {
        match parse_tool_call("create_document", r#"{"content": "x"}"#).unwrap() {
            ToolCall::CreateDocument { title, .. } => assert!(title.starts_with("Dutch practice ")),
            other => panic!("Expected CreateDocument, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_tool_call("update_document", r#"{"content": "x"}"#).is_err());
        assert!(parse_tool_call("create_document", r#"{"title": "t"}"#).is_err());
        assert!(parse_tool_call("send_email", "{}").is_err());
        assert!(parse_tool_call("create_document", "not json").is_err());
    }

    #[test]
    fn test_tool_definitions() {
        let handles = vec![ToolHandle::new("CREATE", DocumentAction::Create, None)];
        let tools = tool_definitions(&handles);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].function.name, "create_document");
        let params = tools[0].function.parameters.as_ref().unwrap();
        assert_eq!(params["required"][1], "content");
    }

    #[tokio::test]
    async fn test_execute_against_memory_documents() {
        let docs = Arc::new(MemoryDocuments::new());
        let ctx = ToolContext::new(docs.clone());

        let created = ctx
            .execute(&ToolCall::CreateDocument {
                title: "Les".to_string(),
                content: "de-het".to_string(),
            })
            .await
            .unwrap();
        assert!(created.contains("Link: memory://documents/doc-1"));

        ctx.execute(&ToolCall::UpdateDocument {
            document_id: "doc-1".to_string(),
            content: "het huis".to_string(),
        })
        .await
        .unwrap();
        assert_eq!(docs.get("doc-1").unwrap().content, "het huis");
    }
}
