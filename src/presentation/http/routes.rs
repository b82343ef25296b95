//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/connect", post(handlers::environment::connect))
        .route("/status", get(handlers::environment::status))
        .route("/time-starts", get(handlers::environment::time_starts))
        .route("/reset", post(handlers::environment::reset))
        .route("/interval", put(handlers::environment::set_interval))
        .nest("/draw", draw_routes())
}

fn draw_routes() -> Router<AppState> {
    Router::new()
        .route("/start", post(handlers::draw::start))
        .route("/stop", post(handlers::draw::stop))
        .route("/status", get(handlers::draw::status))
        .route("/interval", put(handlers::draw::set_interval))
}
