//! HTTP surface.
//!
//! - `POST /api/chat`                       — one conversational turn
//! - `GET  /api/session/{session_id}`       — session transcript
//! - `GET  /api/household/{household_id}`   — household record
//! - `GET  /health`                         — liveness and counters

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

use navigator_agent::{AgentError, ConversationLoop, ToolCallRecord};
use navigator_core::HouseholdDirectory;

#[derive(Clone)]
pub struct AppState {
    conversation: Arc<ConversationLoop>,
    households: Arc<HouseholdDirectory>,
}

impl AppState {
    pub fn new(conversation: Arc<ConversationLoop>, households: Arc<HouseholdDirectory>) -> Self {
        Self { conversation, households }
    }

    pub fn conversation(&self) -> &ConversationLoop {
        &self.conversation
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/session/{session_id}", get(session))
        .route("/api/household/{household_id}", get(household))
        .route("/health", get(health))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: Option<String>,
    pub session_id: Option<String>,
    #[serde(default = "default_household_id")]
    pub household_id: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_household_id() -> String {
    "PARENT_001".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub session_id: String,
    pub household_id: String,
    pub message: String,
    pub tool_calls: Vec<ToolCallRecord>,
}

fn error_response(status: StatusCode, error: &str, details: Option<String>) -> Response {
    let mut body = json!({ "error": error });
    if let Some(details) = details {
        body["details"] = json!(details);
    }
    (status, Json(body)).into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    let (Some(message), Some(session_id)) = (request.message, request.session_id) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing required fields: message and sessionId",
            None,
        );
    };

    let turn = state
        .conversation
        .handle_message(&session_id, &request.household_id, &request.language, &message)
        .await;

    match turn {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ChatResponse {
                session_id,
                household_id: request.household_id,
                message: outcome.message,
                tool_calls: outcome.tool_calls,
            }),
        )
            .into_response(),
        Err(AgentError::HouseholdNotFound(household_id)) => error_response(
            StatusCode::NOT_FOUND,
            &format!("unknown household `{household_id}`"),
            None,
        ),
        Err(failure) => {
            error!(%session_id, error = %failure, "chat turn failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "I apologize, but I encountered an error. Please try again.",
                Some(failure.to_string()),
            )
        }
    }
}

pub async fn session(State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    match state.conversation.store().get(&session_id) {
        Some(session) => {
            let session = session.lock().await;
            (StatusCode::OK, Json(session.clone())).into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, "Session not found", None),
    }
}

pub async fn household(
    State(state): State<AppState>,
    Path(household_id): Path<String>,
) -> Response {
    match state.households.get(&household_id) {
        Some(household) => (StatusCode::OK, Json(household.clone())).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Household not found", None),
    }
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "benefits-navigator",
        "version": env!("CARGO_PKG_VERSION"),
        "activeSessions": state.conversation.store().active_count(),
        "tools": state.conversation.dispatcher().tool_count(),
    }))
}
