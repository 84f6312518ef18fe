use crate::{error::AppError, models::StatusResponse, AppState};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

/// GET /
/// Service banner with the number of live links.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, AppError> {
    let links_count = state.store.count().await?;

    Ok(Json(StatusResponse {
        status: "ok".into(),
        message: "MicroLink API is running!".into(),
        links_count,
    }))
}

/// GET /health
/// Liveness probe; never touches the store.
pub async fn health() -> StatusCode {
    StatusCode::OK
}
