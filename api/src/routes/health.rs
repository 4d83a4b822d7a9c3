use axum::{Json, Router, response::IntoResponse, routing::get};
use common::response::ApiResponse;
use util::state::AppState;

/// Builds the `/health` route group.
///
/// Useful for uptime checks, load balancers, or deployment health monitoring.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// GET /health
///
/// Returns a simple success response to indicate the service is running.
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success("OK", "Health check passed"))
}
