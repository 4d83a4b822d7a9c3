use axum::{Router, routing::get};
use util::state::AppState;

pub mod chat;

pub fn ws_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/chat/{ticket_id}", get(chat::ticket_chat_handler))
        .with_state(app_state)
}
