//! HTTP endpoints for the chat widget.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::warn;

use super::dispatcher::SessionDispatcher;
use super::model::{ReplyMode, Turn};
use crate::onboarding::OnboardingStage;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<SessionDispatcher>,
}

/// Build the Axum router with the chat, health, and session routes.
pub fn chat_routes(dispatcher: Arc<SessionDispatcher>) -> Router {
    let state = AppState { dispatcher };

    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .route("/api/sessions/{id}", get(session_status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "onboard-assist",
        "chunks": state.dispatcher.content().len(),
    }))
}

// ── Chat ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    session_id: String,
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
    mode: ReplyMode,
    stage: OnboardingStage,
}

async fn chat(State(state): State<AppState>, Json(body): Json<ChatRequest>) -> impl IntoResponse {
    match state
        .dispatcher
        .respond(Turn::new(body.session_id, body.message))
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!(ChatResponse {
                response: outcome.reply.text,
                mode: outcome.reply.mode,
                stage: outcome.stage,
            })),
        ),
        Err(e) => {
            warn!(error = %e, "Rejected chat turn");
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": e.to_string()})),
            )
        }
    }
}

// ── Sessions ────────────────────────────────────────────────────────────

async fn session_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.dispatcher.session_status(&id).await {
        Some(status) => (StatusCode::OK, Json(serde_json::json!(status))),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Session not found"})),
        ),
    }
}
