//! HTTP route entry point for the widget relay.
//!
//! Route groups:
//! - `/widget` → public endpoints used by the embedded chat widget
//! - `/api/agent` → agent-message notifications from the backend
//! - `/health` → health check

use axum::Router;
use util::state::AppState;

pub mod agent;
pub mod health;
pub mod widget;

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/widget", widget::widget_routes())
        .nest("/api/agent", agent::agent_routes())
        .nest("/health", health::health_routes())
        .with_state(app_state)
}
