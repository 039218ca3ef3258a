//! Composio-backed Google Docs integration.

use super::{google_doc_url, DocumentAction, DocumentRef, DocumentService, ToolHandle};
use crate::config::DocumentSettings;
use crate::error::{Result, TaalcoachError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Document service that executes Google Docs actions through Composio.
pub struct ComposioDocuments {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    entity_id: String,
    create_action: String,
    update_action: String,
}

/// Action metadata returned by the actions endpoint.
#[derive(Debug, Deserialize)]
struct ActionInfo {
    #[serde(default)]
    description: Option<String>,
}

/// Envelope returned by the execute endpoint.
#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, alias = "successfull")]
    successful: Option<bool>,
}

impl ComposioDocuments {
    /// Create a client from settings and the Composio API key.
    pub fn new(settings: &DocumentSettings, api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            entity_id: settings.entity_id.clone(),
            create_action: settings.create_action.clone(),
            update_action: settings.update_action.clone(),
        })
    }

    fn action_id(&self, action: DocumentAction) -> &str {
        match action {
            DocumentAction::Create => &self.create_action,
            DocumentAction::Update => &self.update_action,
        }
    }

    async fn execute(&self, action: &str, input: Value) -> Result<Value> {
        let url = format!("{}/api/v2/actions/{}/execute", self.base_url, action);
        debug!("Executing Composio action {}", action);

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&json!({
                "entityId": self.entity_id,
                "input": input,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TaalcoachError::Documents(format!(
                "{} returned {}: {}",
                action, status, body
            )));
        }

        let envelope: ExecuteResponse = response.json().await?;
        if envelope.successful == Some(false) || envelope.error.is_some() {
            return Err(TaalcoachError::Documents(format!(
                "{} failed: {}",
                action,
                envelope.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        Ok(envelope.data)
    }
}

#[async_trait]
impl DocumentService for ComposioDocuments {
    #[instrument(skip(self))]
    async fn resolve_tool(&self, action: DocumentAction) -> Result<Option<ToolHandle>> {
        let action_id = self.action_id(action);
        let url = format!("{}/api/v2/actions/{}", self.base_url, action_id);

        let response = self
            .http
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let info: ActionInfo = response.json().await?;
                info!("Resolved document tool {} ({})", action, action_id);
                Ok(Some(ToolHandle::new(action_id, action, info.description)))
            }
            status => Err(TaalcoachError::Documents(format!(
                "Looking up {} returned {}",
                action_id, status
            ))),
        }
    }

    #[instrument(skip(self, content), fields(len = content.len()))]
    async fn create_document(&self, title: &str, content: &str) -> Result<DocumentRef> {
        let data = self
            .execute(
                &self.create_action,
                json!({ "title": title, "text": content }),
            )
            .await?;
        document_ref(&data)
    }

    #[instrument(skip(self, content), fields(len = content.len()))]
    async fn update_document(&self, document_id: &str, content: &str) -> Result<DocumentRef> {
        let data = self
            .execute(
                &self.update_action,
                json!({ "document_id": document_id, "text": content }),
            )
            .await?;

        // Update responses do not always echo the id back
        match document_ref(&data) {
            Ok(doc) => Ok(doc),
            Err(_) => Ok(DocumentRef {
                id: document_id.to_string(),
                url: google_doc_url(document_id),
            }),
        }
    }
}

/// Pull the document id (and url, if present) out of an action result.
fn document_ref(data: &Value) -> Result<DocumentRef> {
    let id = ["documentId", "document_id", "id"]
        .iter()
        .find_map(|key| find_string(data, key))
        .ok_or_else(|| {
            TaalcoachError::Documents(format!("No document id in response: {}", data))
        })?;

    let url = ["url", "documentUrl", "document_url"]
        .iter()
        .find_map(|key| find_string(data, key))
        .filter(|u| u.starts_with("http"))
        .unwrap_or_else(|| google_doc_url(&id));

    Ok(DocumentRef { id, url })
}

/// Depth-first search for a string field with the given key.
fn find_string(value: &Value, key: &str) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(s)) = map.get(key) {
                return Some(s.clone());
            }
            map.values().find_map(|v| find_string(v, key))
        }
        Value::Array(items) => items.iter().find_map(|v| find_string(v, key)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post},
        Json, Router,
    };

    async fn action_info(headers: HeaderMap, Path(action): Path<String>) -> impl IntoResponse {
        if headers.get("x-api-key").map(|v| v.as_bytes()) != Some(b"cmp-test".as_slice()) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        match action.as_str() {
            "GOOGLEDOCS_CREATE_DOCUMENT" => Json(json!({
                "name": action,
                "description": "Creates a Google Doc"
            }))
            .into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn execute(Path(action): Path<String>, Json(body): Json<Value>) -> impl IntoResponse {
        assert_eq!(body["entityId"], "default");
        match action.as_str() {
            "GOOGLEDOCS_CREATE_DOCUMENT" => Json(json!({
                "successfull": true,
                "error": null,
                "data": { "response_data": { "documentId": "doc-42", "title": body["input"]["title"] } }
            })),
            _ => Json(json!({
                "successfull": false,
                "error": "Google Docs not connected",
                "data": {}
            })),
        }
    }

    async fn spawn_composio() -> String {
        let app = Router::new()
            .route("/api/v2/actions/{action}", get(action_info))
            .route("/api/v2/actions/{action}/execute", post(execute));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: String) -> ComposioDocuments {
        let settings = DocumentSettings {
            base_url,
            ..DocumentSettings::default()
        };
        ComposioDocuments::new(&settings, "cmp-test").unwrap()
    }

    #[tokio::test]
    async fn test_resolve_tools() {
        let docs = client(spawn_composio().await);

        let create = docs.resolve_tool(DocumentAction::Create).await.unwrap().unwrap();
        assert_eq!(create.action, "GOOGLEDOCS_CREATE_DOCUMENT");
        assert_eq!(create.description, "Creates a Google Doc");

        // The mock server does not know the update action
        assert!(docs.resolve_tool(DocumentAction::Update).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_document_builds_url() {
        let docs = client(spawn_composio().await);
        let doc = docs.create_document("Woorden", "hallo").await.unwrap();
        assert_eq!(doc.id, "doc-42");
        assert_eq!(doc.url, "https://docs.google.com/document/d/doc-42/edit");
    }

    #[tokio::test]
    async fn test_failed_action_is_error() {
        let docs = client(spawn_composio().await);
        let err = docs.update_document("doc-42", "nieuw").await.unwrap_err();
        assert!(err.to_string().contains("Google Docs not connected"));
    }

    #[test]
    fn test_document_ref_prefers_returned_url() {
        let data = json!({ "document_id": "x1", "url": "https://docs.example/x1" });
        let doc = document_ref(&data).unwrap();
        assert_eq!(doc.url, "https://docs.example/x1");

        assert!(document_ref(&json!({ "ok": true })).is_err());
    }
}
