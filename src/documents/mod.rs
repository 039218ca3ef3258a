//! Document service abstraction.
//!
//! Agents write their lessons, plans and conversation summaries to an
//! external document service. The service is reached only through the
//! [`DocumentService`] trait: it hands out tool handles at startup and
//! creates or updates documents when an agent calls one of its tools.

mod composio;
mod memory;

pub use composio::ComposioDocuments;
pub use memory::{MemoryDocuments, StoredDocument};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The two document operations an agent can be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentAction {
    Create,
    Update,
}

impl DocumentAction {
    /// Function name the model sees for this action.
    pub fn function_name(&self) -> &'static str {
        match self {
            DocumentAction::Create => "create_document",
            DocumentAction::Update => "update_document",
        }
    }

    fn default_description(&self) -> &'static str {
        match self {
            DocumentAction::Create => {
                "Create a new Google Doc with the given title and content. Returns the document link."
            }
            DocumentAction::Update => {
                "Replace the content of an existing Google Doc. Returns the document link."
            }
        }
    }
}

impl std::fmt::Display for DocumentAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.function_name())
    }
}

/// A resolved handle to one document tool on the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolHandle {
    /// Action identifier on the document service.
    pub action: String,
    /// Which operation this handle performs.
    pub kind: DocumentAction,
    /// Description shown to the model.
    pub description: String,
}

impl ToolHandle {
    /// Create a handle, falling back to the built-in description.
    pub fn new(action: &str, kind: DocumentAction, description: Option<String>) -> Self {
        Self {
            action: action.to_string(),
            kind,
            description: description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| kind.default_description().to_string()),
        }
    }

    /// Function name the model calls to use this tool.
    pub fn function_name(&self) -> &'static str {
        self.kind.function_name()
    }
}

/// A document created or updated by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    pub url: String,
}

/// External document create/update capability.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Look up the tool for an action. `None` means the service does not offer it.
    async fn resolve_tool(&self, action: DocumentAction) -> Result<Option<ToolHandle>>;

    /// Create a new document and return its reference.
    async fn create_document(&self, title: &str, content: &str) -> Result<DocumentRef>;

    /// Replace the content of an existing document.
    async fn update_document(&self, document_id: &str, content: &str) -> Result<DocumentRef>;
}

/// Edit link for a Google Doc id.
pub fn google_doc_url(document_id: &str) -> String {
    format!("https://docs.google.com/document/d/{}/edit", document_id)
}
