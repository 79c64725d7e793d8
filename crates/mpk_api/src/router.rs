//! API router configuration.

use crate::handlers;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use log::warn;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Creates the API router, mounted under `/api`.
///
/// `cors_origins` empty means any origin is allowed.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/members", get(handlers::list_members))
        .route("/members/bulk", post(handlers::bulk_upsert_members))
        .route(
            "/proposals/:id/members",
            get(handlers::get_proposal_members).put(handlers::set_proposal_members),
        );

    Router::new()
        .nest("/api", api_routes)
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("event=cors_config module=api status=skipped reason=invalid_origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}
