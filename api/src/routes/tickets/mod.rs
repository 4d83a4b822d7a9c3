use axum::{Router, routing::get};
use util::state::AppState;

pub mod common;
pub mod get;
pub mod post;

pub fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get::list_tickets).post(post::create_ticket))
        .route("/{ticket_id}", get(get::get_ticket))
        .route("/{ticket_id}/messages", get(get::get_ticket_messages))
}
