use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Form, FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use matcher::{PriceFilter, SearchRequest};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// JSON search body
#[derive(Debug, Deserialize)]
pub struct SearchBody {
    /// Free-text query
    #[serde(default, alias = "text")]
    pub query: Option<String>,

    /// Maximum results; the configured JSON default when absent
    #[serde(default)]
    pub k: Option<usize>,

    /// `2`, `[1, 2]` or `null`
    #[serde(default)]
    pub price_level: PriceFilter,
}

/// `POST /api/search`
///
/// Accepts a JSON body (`query`, `k`, `price_level`), a multipart form
/// (`text`, `image`, `top_k`, `price_level`) or an urlencoded form with the
/// same text fields. Responds with `{"results": [...]}`.
pub async fn search(
    State(state): State<Arc<ServerState>>,
    request: Request,
) -> ServerResult<impl IntoResponse> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let search_request = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ServerError::BadRequest(e.body_text()))?;
        from_multipart(multipart, state.searcher.config().default_k_form).await?
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(fields) = Form::<HashMap<String, String>>::from_request(request, &state)
            .await
            .map_err(|e| ServerError::BadRequest(e.body_text()))?;
        from_form_fields(fields, None, state.searcher.config().default_k_form)?
    } else {
        let Json(body) = Json::<SearchBody>::from_request(request, &state)
            .await
            .map_err(|e| ServerError::BadRequest(e.body_text()))?;
        SearchRequest {
            text: body.query,
            image: None,
            k: body.k.unwrap_or(state.searcher.config().default_k_json),
            price: body.price_level,
        }
    };

    run_search(&state, search_request).await
}

async fn from_multipart(mut multipart: Multipart, default_k: usize) -> ServerResult<SearchRequest> {
    let mut fields = HashMap::new();
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(e.body_text()))?;
            image = Some(bytes.to_vec());
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ServerError::BadRequest(e.body_text()))?;
            fields.insert(name, value);
        }
    }
    from_form_fields(fields, image, default_k)
}

fn from_form_fields(
    mut fields: HashMap<String, String>,
    image: Option<Vec<u8>>,
    default_k: usize,
) -> ServerResult<SearchRequest> {
    let k = match fields.get("top_k").map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| ServerError::BadRequest(format!("invalid top_k {raw:?}")))?,
        None => default_k,
    };
    let price = match fields.get("price_level") {
        Some(raw) => PriceFilter::parse(raw)?,
        None => PriceFilter::Any,
    };
    Ok(SearchRequest {
        text: fields.remove("text"),
        image,
        k,
        price,
    })
}

/// Validates on the async side, then runs the blocking pipeline on the
/// blocking pool behind an inference permit.
async fn run_search(state: &ServerState, request: SearchRequest) -> ServerResult<impl IntoResponse> {
    request.validate()?;

    let permit = state
        .inference
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| ServerError::Internal(format!("inference queue closed: {e}")))?;
    let searcher = state.searcher.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        searcher.search(&request)
    })
    .await??;

    tracing::info!(
        results = outcome.hits.len(),
        neighborhood = ?outcome.neighborhood,
        candidates = outcome.candidates_requested,
        "search served"
    );
    Ok(Json(json!({ "results": outcome.hits })))
}
