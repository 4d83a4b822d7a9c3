use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use common::envelope::WireMessage;
use common::response::ApiResponse;
use db::models::{
    messages::{Model as MessageModel, NewMessageRecord},
    tickets::{Model as TicketModel, NewTicket, TicketMetadata},
};
use serde::Deserialize;
use util::state::AppState;
use validator::Validate;

use super::common::TicketResponse;

/// Create-ticket body. The widget relay sends its own ticket id so both
/// stores converge on one; a missing id is minted here instead.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub metadata: Option<RelayedMetadata>,
}

/// Metadata bag as the relay sends it: browser context plus widget routing
/// fields folded into one object.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayedMetadata {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub screen_size: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub widget_id: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
}

/// POST /api/tickets
///
/// Persists the ticket and its initial visitor message (the description).
/// This endpoint receives relayed widget traffic, so the initial message is
/// always client-authored.
pub async fn create_ticket(
    State(app_state): State<AppState>,
    Json(req): Json<CreateTicketRequest>,
) -> impl IntoResponse {
    if req.title.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error("Title is required")),
        )
            .into_response();
    }

    if let Err(e) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(e.to_string())),
        )
            .into_response();
    }

    let meta = req.metadata.unwrap_or_default();
    let user_name = req
        .user_name
        .or(meta.client_name.clone())
        .unwrap_or_else(|| "Anonymous".to_string());
    let user_email = req
        .user_email
        .or(meta.client_email.clone())
        .unwrap_or_else(|| format!("user_{}@temporary.com", Utc::now().timestamp()));

    let db = app_state.db();
    let ticket = match TicketModel::create(
        db,
        NewTicket {
            id: req.id,
            title: req.title.trim().to_string(),
            description: req.description.clone(),
            priority: req.priority,
            user_name: user_name.clone(),
            user_email: user_email.clone(),
            category_id: req.category_id,
            widget_id: meta.widget_id,
            department: meta.department,
            source: meta.source,
            metadata: Some(TicketMetadata {
                url: meta.url,
                referrer: meta.referrer,
                user_agent: meta.user_agent,
                screen_size: meta.screen_size,
            }),
        },
    )
    .await
    {
        Ok(ticket) => ticket,
        Err(e) => {
            tracing::error!("failed to create ticket: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to create ticket")),
            )
                .into_response();
        }
    };

    let mut messages: Vec<WireMessage> = Vec::new();
    if !req.description.trim().is_empty() {
        match MessageModel::append(
            db,
            &ticket.id,
            NewMessageRecord {
                content: req.description,
                is_client: true,
                user_name: Some(user_name),
                user_email: Some(user_email),
            },
        )
        .await
        {
            Ok(message) => messages.push(WireMessage::from(&message)),
            // The ticket itself is committed; a failed initial message only logs.
            Err(e) => tracing::error!("failed to store initial message for {}: {e}", ticket.id),
        }
    }

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(
            TicketResponse { ticket, messages },
            "Ticket created successfully",
        )),
    )
        .into_response()
}
