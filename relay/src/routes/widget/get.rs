use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::envelope::WireMessage;
use common::response::ApiResponse;
use db::models::{messages::Model as MessageModel, tickets::Model as TicketModel};
use util::{config, state::AppState};

const BACKEND_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// GET /widget/tickets/{ticket_id}/messages
///
/// Backend-first read: the backend's copy is authoritative when reachable.
/// Any failure there (down, slow, 404) falls back to the local shadow copy
/// so a reconnecting widget still gets its history.
pub async fn get_widget_messages(
    Path(ticket_id): Path<String>,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    if let Some(messages) = fetch_from_backend(&ticket_id).await {
        return (
            StatusCode::OK,
            Json(ApiResponse::success(messages, "Messages retrieved successfully")),
        )
            .into_response();
    }
    tracing::info!("serving local history for ticket {ticket_id}");

    match TicketModel::find_by_id(app_state.db(), &ticket_id).await {
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
                Json(ApiResponse::<()>::error("Failed to load ticket")),
            )
                .into_response();
        }
    }

    match MessageModel::find_all_for_ticket(app_state.db(), &ticket_id).await {
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
                Json(ApiResponse::<()>::error("Failed to load messages")),
            )
                .into_response()
        }
    }
}

/// One bounded attempt against the backend; `None` on any failure.
async fn fetch_from_backend(ticket_id: &str) -> Option<Vec<WireMessage>> {
    let base = config::backend_api_url();
    let url = format!(
        "{}/api/tickets/{ticket_id}/messages",
        base.trim_end_matches('/')
    );

    let client = reqwest::Client::builder()
        .timeout(BACKEND_READ_TIMEOUT)
        .build()
        .ok()?;

    let mut req = client.get(&url);
    let api_key = config::api_key();
    if !api_key.is_empty() {
        req = req.bearer_auth(api_key);
    }

    let resp = req.send().await.ok()?;
    if !resp.status().is_success() {
        tracing::warn!("backend history read for {ticket_id} returned {}", resp.status());
        return None;
    }

    let value: serde_json::Value = resp.json().await.ok()?;
    serde_json::from_value(value["data"].clone()).ok()
}
