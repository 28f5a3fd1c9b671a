use crate::query_handler::{handle_query, health};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use file_insights::MAX_UPLOAD_BYTES;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Room for multipart boundaries, part headers and the question field.
const MULTIPART_ENVELOPE_BYTES: usize = 64 * 1024;

pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/query",
            post(handle_query)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_ENVELOPE_BYTES)),
        )
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return cors.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
