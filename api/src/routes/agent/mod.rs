use axum::{Router, routing::post};
use util::state::AppState;

pub mod post;

pub fn agent_routes() -> Router<AppState> {
    Router::new().route("/messages", post(post::receive_agent_message))
}
