//! In-memory document service for tests and offline runs.

use super::{DocumentAction, DocumentRef, DocumentService, ToolHandle};
use crate::error::{Result, TaalcoachError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// A document held by [`MemoryDocuments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub title: String,
    pub content: String,
    pub revisions: u32,
}

/// Document service that keeps documents in a map.
pub struct MemoryDocuments {
    documents: RwLock<HashMap<String, StoredDocument>>,
    available: HashSet<DocumentAction>,
    next_id: AtomicU64,
}

impl MemoryDocuments {
    /// Create a service offering both create and update.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            available: [DocumentAction::Create, DocumentAction::Update].into_iter().collect(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Stop offering an action, as if it were not connected.
    pub fn without(mut self, action: DocumentAction) -> Self {
        self.available.remove(&action);
        self
    }

    /// Get a stored document by id.
    pub fn get(&self, id: &str) -> Option<StoredDocument> {
        self.documents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn url(id: &str) -> String {
        format!("memory://documents/{}", id)
    }
}

impl Default for MemoryDocuments {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentService for MemoryDocuments {
    async fn resolve_tool(&self, action: DocumentAction) -> Result<Option<ToolHandle>> {
        if !self.available.contains(&action) {
            return Ok(None);
        }
        let action_id = match action {
            DocumentAction::Create => "MEMORY_CREATE_DOCUMENT",
            DocumentAction::Update => "MEMORY_UPDATE_DOCUMENT",
        };
        Ok(Some(ToolHandle::new(action_id, action, None)))
    }

    async fn create_document(&self, title: &str, content: &str) -> Result<DocumentRef> {
        if !self.available.contains(&DocumentAction::Create) {
            return Err(TaalcoachError::ToolUnavailable("create_document".to_string()));
        }
        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.documents.write().unwrap_or_else(|e| e.into_inner()).insert(
            id.clone(),
            StoredDocument {
                title: title.to_string(),
                content: content.to_string(),
                revisions: 1,
            },
        );
        Ok(DocumentRef {
            url: Self::url(&id),
            id,
        })
    }

    async fn update_document(&self, document_id: &str, content: &str) -> Result<DocumentRef> {
        if !self.available.contains(&DocumentAction::Update) {
            return Err(TaalcoachError::ToolUnavailable("update_document".to_string()));
        }
        let mut docs = self.documents.write().unwrap_or_else(|e| e.into_inner());
        let doc = docs.get_mut(document_id).ok_or_else(|| {
            TaalcoachError::Documents(format!("Document not found: {}", document_id))
        })?;
        doc.content = content.to_string();
        doc.revisions += 1;
        Ok(DocumentRef {
            id: document_id.to_string(),
            url: Self::url(document_id),
        })
    }
}
