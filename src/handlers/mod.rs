pub mod index;
pub mod links;
pub mod redirect;

use crate::{config::CorsOrigins, AppState};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Assemble the public router.
pub fn router(state: Arc<AppState>, cors_origins: &CorsOrigins) -> Router {
    Router::new()
        .route("/", get(index::index))
        .route("/health", get(index::health))
        .route(
            "/api/shorten",
            post(links::shorten).get(redirect::redirect_shorten),
        )
        .route("/api/:code", get(redirect::redirect))
        .with_state(state)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::any(),
        CorsOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
