//! River projection HTTP service.
//!
//! Thin axum adapter over `river-core`: requests are parsed and validated
//! here, the projection itself runs on the blocking pool, and every failure
//! becomes a `{"error", "message"}` body with a mapped status.

pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Extension, Router};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::state::AppState;

/// Build the service router with its middleware stack.
pub fn build_router(state: Arc<AppState>) -> Router {
    let timeout = state.config.server.request_timeout();
    let body_limit = state.config.server.max_body_bytes;

    Router::new()
        .route("/process", post(handlers::process::process_handler))
        .route("/query", post(handlers::query::query_handler))
        .route("/download", get(handlers::download::download_handler))
        .route(
            "/download-and-process",
            post(handlers::download::download_and_process_handler),
        )
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
