use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use common::notify::{ClientMessageNotification, HEADER_MESSAGE_SOURCE};
use common::response::{ApiResponse, MessageAccepted};
use db::error::StoreError;
use util::state::AppState;

use crate::services::chat;

/// POST /api/widget/messages
///
/// Visitor-origin ingestion: the widget relay delivers messages typed into
/// the embedded chat. Attribution is fixed to `isClient=true` on this path;
/// the flag in the body is ignored.
pub async fn receive_widget_message(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ClientMessageNotification>,
) -> impl IntoResponse {
    if req.ticket_id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error("Ticket ID is required")),
        )
            .into_response();
    }
    if req.content.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error("Content is required")),
        )
            .into_response();
    }

    let source = headers
        .get(HEADER_MESSAGE_SOURCE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info!("widget message for ticket {} (source: {source})", req.ticket_id);

    match chat::ingest_client_message(
        &app_state,
        &req.ticket_id,
        req.content.trim(),
        req.user_name,
        req.user_email,
    )
    .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                MessageAccepted {
                    message_id: outcome.message.id,
                    duplicate: outcome.duplicate,
                },
                "Message added successfully",
            )),
        )
            .into_response(),
        Err(StoreError::TicketNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("Ticket not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to store widget message: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to add message")),
            )
                .into_response()
        }
    }
}
