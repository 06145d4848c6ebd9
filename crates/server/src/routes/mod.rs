//! API route handlers
//!
//! - `health`: liveness and readiness
//! - `search`: multi-modal restaurant search
//! - `restaurants`: restaurant detail and vibe statistics

pub mod health;
pub mod restaurants;
pub mod search;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "VibeCheck Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/search",
            "/api/restaurant/{id}",
            "/api/vibe-stats",
            "/api/top-vibes",
            "/health",
            "/ready"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound("Not found".into())
}
