use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Liveness probe
pub async fn health_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "vibecheck-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": state.uptime_seconds(),
    }))
}

/// Readiness probe. Models and the index are loaded before the listener
/// binds, so a running server is always ready; this reports what it serves.
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let index = state.searcher.index();
    let encoder = state.searcher.encoder();
    Json(json!({
        "status": "ready",
        "service": "vibecheck-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": state.uptime_seconds(),
        "index": {
            "entries": index.len(),
            "dimension": index.dimension(),
            "backend": index.backend_name(),
        },
        "encoder": {
            "text_dim": encoder.text_dim(),
            "image_dim": encoder.image_dim(),
            "image_search": encoder.image_enabled(),
        },
    }))
}
