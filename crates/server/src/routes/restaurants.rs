use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

const TOP_VIBES: usize = 20;
const RESTAURANTS_PER_VIBE: usize = 5;

/// `GET /api/restaurant/{id}`
pub async fn get_restaurant(
    State(state): State<Arc<ServerState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ServerResult<impl IntoResponse> {
    let Path(id) = id.map_err(|e| ServerError::BadRequest(format!("invalid restaurant id: {e}")))?;
    let store = state.searcher.store().clone();

    let restaurant = tokio::task::spawn_blocking(move || store.get(id)).await??;
    match restaurant {
        Some(restaurant) => Ok(Json(restaurant)),
        None => Err(ServerError::NotFound("Restaurant not found".into())),
    }
}

/// `GET /api/vibe-stats` and `GET /api/top-vibes`
pub async fn vibe_stats(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    let store = state.searcher.store().clone();
    let vibes =
        tokio::task::spawn_blocking(move || store.top_vibes(TOP_VIBES, RESTAURANTS_PER_VIBE))
            .await??;
    Ok(Json(json!({ "vibes": vibes })))
}
