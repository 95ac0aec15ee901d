//! Router configuration for the web server.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/runs",
            post(handlers::start_run).get(handlers::list_runs),
        )
        .route("/api/runs/:run_id", get(handlers::get_run))
        .route(
            "/api/companies/:corporate_number",
            get(handlers::get_company),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
