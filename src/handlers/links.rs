use crate::{
    error::AppError,
    models::{ShortenRequest, ShortenResponse},
    validation::validate_target_url,
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// POST /api/shorten
///
/// 1. Reject bodies that are not `{"url": "<absolute http(s) URL>"}` with a
///    422 before anything is allocated.
/// 2. Reserve a fresh code for the URL.
/// 3. Return 201 with the code and the URL exactly as stored.
pub async fn shorten(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let Json(payload) = payload?;
    let url = validate_target_url(&payload.url)?;

    let short_code = state.allocator.allocate(state.store.as_ref(), &url).await?;
    tracing::info!("Created short link '{}' -> {}", short_code, url);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            short_code,
            original_url: url,
        }),
    ))
}
