use super::page;
use super::state::AppState;
use crate::session::StatusSnapshot;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json},
};

// ============================================================================
// Handlers
// ============================================================================

/// GET / and GET /status
/// Human-readable status page
pub async fn status_page(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry.read().await;
    Html(page::render(&state.service_name, registry.list()))
}

/// GET /api/status
/// Machine-readable snapshot of every session
pub async fn api_status(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry.read().await;
    Json(StatusSnapshot::capture(&state.service_name, registry.list()))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Fallback for unknown paths
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
