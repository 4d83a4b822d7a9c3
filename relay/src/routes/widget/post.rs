use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use common::notify::{CreateTicketNotification, HEADER_SOURCE, HEADER_WIDGET_ID, SOURCE_WIDGET};
use common::response::{ApiResponse, MessageAccepted};
use db::error::StoreError;
use db::models::{
    messages::{Model as MessageModel, NewMessageRecord},
    tickets::{Model as TicketModel, NewTicket, TicketMetadata},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use util::state::AppState;
use validator::Validate;

use crate::services::chat;

/// Ticket submission from the embedded widget.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWidgetTicketRequest {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub widget_id: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub metadata: Option<TicketMetadata>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetTicketCreated {
    pub ticket_id: String,
    /// Same value as `ticket_id`; the widget reads this key.
    pub id: String,
    pub live_chat_available: bool,
}

/// Chat message submission from the embedded widget. The text arrives under
/// either `message` or `content` depending on the widget version.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetMessageRequest {
    #[serde(default)]
    pub ticket_id: String,
    #[serde(default, alias = "message")]
    pub content: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// POST /widget/tickets
///
/// Persists the local shadow ticket (plus the initial visitor message) and
/// relays the creation to the backend on a detached task. The response never
/// waits on the relay.
pub async fn create_widget_ticket(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateWidgetTicketRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(e.to_string())),
        )
            .into_response();
    }

    let user_name = req
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .or_else(|| header_value(&headers, "X-User-Name"))
        .unwrap_or_else(|| "Anonymous".to_string());
    let user_email = req
        .email
        .clone()
        .filter(|e| !e.is_empty())
        .or_else(|| header_value(&headers, "X-User-Email"))
        .unwrap_or_else(|| format!("user_{}@temporary.com", Utc::now().timestamp()));
    let client_name = req.client_name.clone().filter(|n| !n.is_empty());
    let client_email = req.client_email.clone().filter(|e| !e.is_empty());

    let subject = req
        .subject
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("Support request - {user_name}"));

    let widget_id = req
        .widget_id
        .clone()
        .or_else(|| header_value(&headers, HEADER_WIDGET_ID));

    let ticket = match TicketModel::create(
        app_state.db(),
        NewTicket {
            id: None,
            title: subject.clone(),
            description: req.message.clone(),
            priority: req.priority.clone(),
            user_name: user_name.clone(),
            user_email: user_email.clone(),
            category_id: None,
            widget_id: widget_id.clone(),
            department: req.department.clone(),
            source: Some(SOURCE_WIDGET.to_string()),
            metadata: req.metadata.clone(),
        },
    )
    .await
    {
        Ok(ticket) => ticket,
        Err(e) => {
            tracing::error!("failed to create widget ticket: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to create ticket")),
            )
                .into_response();
        }
    };

    if !req.message.trim().is_empty() {
        if let Err(e) = MessageModel::append(
            app_state.db(),
            &ticket.id,
            NewMessageRecord {
                content: req.message.clone(),
                is_client: true,
                user_name: Some(user_name.clone()),
                user_email: Some(user_email.clone()),
            },
        )
        .await
        {
            tracing::error!("failed to store initial message for {}: {e}", ticket.id);
        }
    }

    relay_ticket_creation(
        &app_state,
        &ticket.id,
        &req,
        subject,
        user_name,
        user_email,
        client_name,
        client_email,
        widget_id,
    );

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(
            WidgetTicketCreated {
                ticket_id: ticket.id.clone(),
                id: ticket.id,
                live_chat_available: true,
            },
            "Ticket created successfully",
        )),
    )
        .into_response()
}

/// Hands the creation relay to a detached task. The backend keeps the
/// relay's ticket id; when its response carries a different one the
/// divergence is logged and nothing else happens.
#[allow(clippy::too_many_arguments)]
fn relay_ticket_creation(
    app_state: &AppState,
    local_id: &str,
    req: &CreateWidgetTicketRequest,
    subject: String,
    user_name: String,
    user_email: String,
    client_name: Option<String>,
    client_email: Option<String>,
    widget_id: Option<String>,
) {
    let metadata = req.metadata.clone().unwrap_or_default();
    let payload = CreateTicketNotification {
        id: Some(local_id.to_string()),
        title: subject,
        description: req.message.clone(),
        category_id: None,
        priority: req.priority.clone().unwrap_or_else(|| "medium".into()),
        user_name: user_name.clone(),
        user_email: user_email.clone(),
        is_client: true,
        metadata: json!({
            "url": metadata.url,
            "userAgent": metadata.user_agent,
            "referrer": metadata.referrer,
            "screenSize": metadata.screen_size,
            "source": SOURCE_WIDGET,
            "widgetId": widget_id,
            "clientName": client_name.unwrap_or(user_name),
            "clientEmail": client_email.unwrap_or(user_email),
            "department": req.department,
        }),
    };

    let notifier = app_state.notifier_clone();
    let local_id = local_id.to_string();
    let headers = vec![
        (HEADER_SOURCE, SOURCE_WIDGET.to_string()),
        (
            HEADER_WIDGET_ID,
            payload.metadata["widgetId"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
        ),
    ];
    tokio::spawn(async move {
        match notifier.post("/api/tickets", &payload, &headers).await {
            Ok(body) => {
                let backend_id = serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|v| {
                        v["data"]["id"]
                            .as_str()
                            .or(v["id"].as_str())
                            .map(str::to_string)
                    });
                match backend_id {
                    Some(id) if id != local_id => {
                        tracing::warn!("ticket id diverged: local={local_id} backend={id}");
                    }
                    _ => tracing::info!("ticket {local_id} relayed to backend"),
                }
            }
            Err(e) => tracing::error!("ticket relay failed for {local_id}: {e}"),
        }
    });
}

/// POST /widget/messages
///
/// Visitor message for an existing ticket. Attribution is fixed to
/// `isClient=true`; author identity falls back from the body to the
/// `X-User-Name`/`X-User-Email` headers and finally to the ticket itself.
pub async fn send_widget_message(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<WidgetMessageRequest>,
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
            Json(ApiResponse::<()>::error("Message must not be empty")),
        )
            .into_response();
    }

    let user_name = req
        .user_name
        .clone()
        .or_else(|| header_value(&headers, "X-User-Name"));
    let user_email = req
        .user_email
        .clone()
        .or_else(|| header_value(&headers, "X-User-Email"));

    match chat::ingest_client_message(
        &app_state,
        &req.ticket_id,
        req.content.trim(),
        user_name,
        user_email,
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
                "Message sent successfully",
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
                Json(ApiResponse::<()>::error("Failed to save message")),
            )
                .into_response()
        }
    }
}
