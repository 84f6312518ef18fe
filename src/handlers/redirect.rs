use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use url::Url;

/// GET /api/:code
///
/// 307 to the stored target, or 404 if the code has no live record.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    resolve(&state, &code).await
}

/// GET /api/shorten
///
/// The static POST route shadows `/api/:code` for this one path, but with
/// `CODE_LENGTH=7` the allocator can hand out `shorten` as a code.
pub async fn redirect_shorten(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    resolve(&state, "shorten").await
}

async fn resolve(state: &AppState, code: &str) -> Result<Response, AppError> {
    let record = state.store.get(code).await?;

    let Some(location) = location_header(&record.target_url) else {
        tracing::error!(
            "Stored target for '{}' cannot be sent as a Location header: {}",
            code,
            record.target_url
        );
        return Err(AppError::NotFound);
    };

    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}

/// The target as submitted when it is header-safe, otherwise its
/// percent-encoded / punycode serialization.
fn location_header(target: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(target).ok().or_else(|| {
        let url = Url::parse(target).ok()?;
        HeaderValue::from_str(url.as_str()).ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_targets_are_sent_verbatim() {
        let value = location_header("https://example.com/a?b=c#d").unwrap();
        assert_eq!(value, "https://example.com/a?b=c#d");
    }

    #[test]
    fn non_ascii_targets_are_encoded() {
        let value = location_header("https://bücher.example/ü").unwrap();
        assert_eq!(value, "https://xn--bcher-kva.example/%C3%BC");
    }
}
