//! HTTP API server exposing the coaching actions.
//!
//! One endpoint per action. Errors are turned into JSON messages here, at
//! the presentation boundary.

use crate::cli::{preflight, ApiKeys, Output};
use crate::config::Settings;
use crate::dispatcher::{CoachingAction, CoachingResult, Dispatcher};
use crate::error::TaalcoachError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
struct AppState {
    dispatcher: Dispatcher,
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    keys: &ApiKeys,
    settings: Settings,
) -> anyhow::Result<()> {
    let credentials = preflight::check(keys, &settings)?;
    let dispatcher = Dispatcher::connect(&credentials, &settings).await?;

    let app = router(Arc::new(AppState { dispatcher }));

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Taalcoach API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Agents", "GET  /agents");
    Output::kv("Daily vocabulary", "POST /daily");
    Output::kv("Grammar lesson", "POST /grammar");
    Output::kv("Conversation", "POST /conversation");
    Output::kv("Weekly plan", "POST /weekly");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/agents", get(list_agents))
        .route("/daily", post(daily))
        .route("/grammar", post(grammar))
        .route("/conversation", post(conversation))
        .route("/weekly", post(weekly))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct DailyRequest {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct WeeklyRequest {
    #[serde(default)]
    summary: String,
}

#[derive(Serialize)]
struct CoachResponse {
    request_id: String,
    agent: String,
    content: String,
    document_links: Vec<String>,
    tool_calls: Vec<String>,
    iterations: usize,
}

impl From<CoachingResult> for CoachResponse {
    fn from(result: CoachingResult) -> Self {
        Self {
            request_id: result.request_id.to_string(),
            agent: result.role.key().to_string(),
            document_links: result.document_links(),
            tool_calls: result
                .raw_response
                .tool_calls
                .iter()
                .map(|c| c.name.clone())
                .collect(),
            iterations: result.raw_response.iterations,
            content: result.content,
        }
    }
}

#[derive(Serialize)]
struct AgentInfo {
    key: String,
    name: String,
    role: String,
    model: String,
    tools: Vec<String>,
    instructions: Vec<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_agents(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let agents: Vec<AgentInfo> = state
        .dispatcher
        .registry()
        .agents()
        .map(|agent| AgentInfo {
            key: agent.kind().key().to_string(),
            name: agent.name().to_string(),
            role: agent.role().to_string(),
            model: agent.model().id.clone(),
            tools: agent.tools().iter().map(|t| t.action.clone()).collect(),
            instructions: agent.instructions().to_vec(),
        })
        .collect();
    Json(agents)
}

async fn daily(State(state): State<Arc<AppState>>, Json(req): Json<DailyRequest>) -> Response {
    run(&state, CoachingAction::DailyVocabulary(req.text)).await
}

async fn grammar(State(state): State<Arc<AppState>>, Json(req): Json<DailyRequest>) -> Response {
    run(&state, CoachingAction::GrammarAssessment(req.text)).await
}

async fn conversation(State(state): State<Arc<AppState>>) -> Response {
    run(&state, CoachingAction::ConversationPractice).await
}

async fn weekly(State(state): State<Arc<AppState>>, Json(req): Json<WeeklyRequest>) -> Response {
    run(&state, CoachingAction::WeeklyPlan(req.summary)).await
}

async fn run(state: &AppState, action: CoachingAction) -> Response {
    match state.dispatcher.dispatch(action).await {
        Ok(result) => Json(CoachResponse::from(result)).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(e: TaalcoachError) -> Response {
    let status = match &e {
        TaalcoachError::Validation(_) => StatusCode::BAD_REQUEST,
        TaalcoachError::UnknownRole(_) => StatusCode::NOT_FOUND,
        e if e.is_configuration() => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    };
    if status != StatusCode::BAD_REQUEST {
        error!("Request failed: {}", e);
    }
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}
