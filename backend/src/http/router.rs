//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing,
//! panic recovery, request logging), and creates the axum router ready for
//! serving.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use super::assets;
use super::config::BODY_LIMIT_BYTES;
use super::handlers;
use super::middleware::{catch_panic_layer, cors_layer, log_requests};
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/lessons",
            get(handlers::list_lessons).post(handlers::add_lesson),
        )
        .route("/lessons/{id}", put(handlers::update_lesson))
        .route(
            "/orders",
            get(handlers::list_orders).post(handlers::place_order),
        )
        .route("/search", get(handlers::search_lessons));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/images/{*path}", get(assets::serve_image))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(middleware::from_fn(log_requests))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(catch_panic_layer())
        .layer(cors_layer())
        .with_state(state)
}
