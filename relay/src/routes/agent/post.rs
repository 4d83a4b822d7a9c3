use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use common::notify::AgentMessageNotification;
use common::response::{ApiResponse, MessageAccepted};
use db::error::StoreError;
use util::state::AppState;

use crate::services::chat;

/// POST /api/agent/messages
///
/// Called by the backend's notifier after it persists a message. Attribution
/// is fixed to `isClient=false`; a re-delivery inside the duplicate window
/// (the notifier retries, and visitor messages are echoed back) is
/// acknowledged without storing a second copy.
pub async fn receive_agent_message(
    State(app_state): State<AppState>,
    Json(req): Json<AgentMessageNotification>,
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

    tracing::info!("agent message received for ticket {}", req.ticket_id);

    match chat::ingest_agent_message(&app_state, &req.ticket_id, req.content.trim(), req.agent_name)
        .await
    {
        Ok(outcome) => {
            let note = if outcome.duplicate {
                "Duplicate message detected, not processed"
            } else {
                "Agent message sent successfully"
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    MessageAccepted {
                        message_id: outcome.message.id,
                        duplicate: outcome.duplicate,
                    },
                    note,
                )),
            )
                .into_response()
        }
        Err(StoreError::TicketNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("Ticket not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to store agent message: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to save message")),
            )
                .into_response()
        }
    }
}
