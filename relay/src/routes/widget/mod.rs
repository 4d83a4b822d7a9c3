use axum::{
    Router,
    routing::{get, post},
};
use util::state::AppState;

pub mod get;
pub mod post;

pub fn widget_routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", post(post::create_widget_ticket))
        .route("/messages", post(post::send_widget_message))
        .route("/tickets/{ticket_id}/messages", get(get::get_widget_messages))
}
