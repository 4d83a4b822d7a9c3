//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/tickets` → authoritative ticket store (list/create/detail/messages)
//! - `/widget` → ingestion of visitor traffic relayed by the widget service
//! - `/agent` → ingestion of agent messages
//! - `/health` → health check (unguarded)
//!
//! Everything except `/health` sits behind the bearer-key guard.

use axum::{Router, middleware::from_fn};
use util::state::AppState;

use crate::auth::require_api_key;

pub mod agent;
pub mod health;
pub mod tickets;
pub mod widget;

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/tickets", tickets::ticket_routes())
        .nest("/widget", widget::widget_routes())
        .nest("/agent", agent::agent_routes())
        .route_layer(from_fn(require_api_key))
        .nest("/health", health::health_routes())
        .with_state(app_state)
}
