use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::envelope::WireMessage;
use common::response::ApiResponse;
use db::models::{messages::Model as MessageModel, tickets::Model as TicketModel};
use util::state::AppState;

use super::common::TicketResponse;

/// GET /api/tickets
pub async fn list_tickets(State(app_state): State<AppState>) -> impl IntoResponse {
    match TicketModel::find_all(app_state.db()).await {
        Ok(tickets) => (
            StatusCode::OK,
            Json(ApiResponse::success(tickets, "Tickets retrieved successfully")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to list tickets: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to retrieve tickets")),
            )
                .into_response()
        }
    }
}

/// GET /api/tickets/{ticket_id}
pub async fn get_ticket(
    Path(ticket_id): Path<String>,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    let db = app_state.db();

    let ticket = match TicketModel::find_by_id(db, &ticket_id).await {
        Ok(Some(ticket)) => ticket,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error("Ticket not found")),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("failed to load ticket {ticket_id}: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to retrieve ticket")),
            )
                .into_response();
        }
    };

    let messages = match MessageModel::find_all_for_ticket(db, &ticket_id).await {
        Ok(messages) => messages.iter().map(WireMessage::from).collect(),
        Err(e) => {
            tracing::error!("failed to load messages for {ticket_id}: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to retrieve ticket messages")),
            )
                .into_response();
        }
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            TicketResponse { ticket, messages },
            "Ticket retrieved successfully",
        )),
    )
        .into_response()
}

/// GET /api/tickets/{ticket_id}/messages
pub async fn get_ticket_messages(
    Path(ticket_id): Path<String>,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    let db = app_state.db();

    match TicketModel::find_by_id(db, &ticket_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error("Ticket not found")),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("failed to load ticket {ticket_id}: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to retrieve ticket")),
            )
                .into_response();
        }
    }

    match MessageModel::find_all_for_ticket(db, &ticket_id).await {
        Ok(messages) => {
            let wire: Vec<WireMessage> = messages.iter().map(WireMessage::from).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(wire, "Messages retrieved successfully")),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("failed to load messages for {ticket_id}: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to retrieve messages")),
            )
                .into_response()
        }
    }
}
