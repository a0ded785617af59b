pub mod sightings;

use axum::{
    http::{header, Method, StatusCode},
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::metrics;
use crate::state::AppState;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics_endpoint() -> (StatusCode, String) {
    metrics::encode_metrics()
}

/// Any origin may call the API; preflight requests are answered by the layer.
pub fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    let items = Router::new()
        .route(
            "/items",
            get(sightings::list_sightings).post(sightings::create_sighting),
        )
        .route("/items/", axum::routing::any(sightings::missing_id))
        .route(
            "/items/:id",
            get(sightings::get_sighting)
                .put(sightings::update_sighting)
                .delete(sightings::delete_sighting),
        );

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .merge(items)
        .with_state(state)
        .layer(build_cors())
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status code and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
