use crate::{allocator::AllocateError, store::StoreError, validation::ValidationError};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Every failure a request can end in. Each variant maps to exactly one
/// status code; internal causes are logged, never sent to the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Rejected at the boundary; nothing was allocated or stored.
    #[error("validation failed at {}: {msg}", .loc.join("."))]
    Validation {
        loc: Vec<&'static str>,
        msg: String,
        kind: &'static str,
    },

    #[error("short link not found")]
    NotFound,

    #[error("short code space exhausted after {attempts} attempt(s)")]
    AllocationExhausted { attempts: u32 },

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] sqlx::Error),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation {
            loc: vec!["body", "url"],
            msg: err.to_string(),
            kind: err.kind(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let (loc, kind) = match &rejection {
            JsonRejection::JsonDataError(_) => (vec!["body", "url"], "value_error"),
            JsonRejection::JsonSyntaxError(_) => (vec!["body"], "json_invalid"),
            JsonRejection::MissingJsonContentType(_) => (vec!["body"], "content_type"),
            _ => (vec!["body"], "body_error"),
        };
        Self::Validation {
            loc,
            msg: rejection.body_text(),
            kind,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            StoreError::Unavailable(e) => Self::StoreUnavailable(e),
        }
    }
}

impl From<AllocateError> for AppError {
    fn from(err: AllocateError) -> Self {
        match err {
            AllocateError::Exhausted { attempts } => Self::AllocationExhausted { attempts },
            AllocateError::Store(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Validation { loc, msg, kind } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "detail": [{ "loc": loc, "msg": msg, "type": kind }] }),
            ),
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "detail": "Short link not found" }),
            ),
            Self::AllocationExhausted { attempts } => {
                tracing::error!("Short code allocation exhausted after {} attempt(s)", attempts);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "detail": "Short code space exhausted, try again later" }),
                )
            }
            Self::StoreUnavailable(e) => {
                tracing::error!("Store unavailable: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": "Storage unavailable" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
