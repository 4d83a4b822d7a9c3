use axum::{Router, routing::post};
use util::state::AppState;

pub mod post;

pub fn widget_routes() -> Router<AppState> {
    Router::new().route("/messages", post(post::receive_widget_message))
}
