//! Agent console chat over WebSocket.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::envelope::{NewMessage, Outbound, WireMessage};
use common::response::ApiResponse;
use db::models::{messages::Model as MessageModel, tickets::Model as TicketModel};
use util::state::AppState;
use util::ws::handler_trait::WsHandler;
use util::ws::runtime::WsContext;
use util::ws::serve::{WsServerOptions, serve_ticket};

use crate::services::chat;

/// Sessions on this service belong to support agents, so inbound messages
/// take the agent ingestion path (`isClient=false`).
pub struct AgentChatHandler {
    state: AppState,
}

impl WsHandler for AgentChatHandler {
    async fn load_history(&self, ctx: &WsContext) -> Vec<WireMessage> {
        match MessageModel::find_all_for_ticket(self.state.db(), &ctx.ticket_id).await {
            Ok(messages) => messages.iter().map(WireMessage::from).collect(),
            Err(e) => {
                tracing::error!("failed to load history for {}: {e}", ctx.ticket_id);
                Vec::new()
            }
        }
    }

    async fn on_message(&self, ctx: &WsContext, msg: NewMessage) {
        match chat::ingest_agent_message(&self.state, &ctx.ticket_id, &msg.content, msg.user_name)
            .await
        {
            Ok(outcome) => {
                let wire = WireMessage::from(&outcome.message);
                let _ = ctx
                    .reply(&Outbound::message_received(&ctx.ticket_id, wire))
                    .await;
            }
            Err(e) => {
                tracing::error!("failed to ingest socket message on {}: {e}", ctx.ticket_id);
            }
        }
    }
}

/// GET /ws/chat/{ticket_id}
pub async fn ticket_chat_handler(
    ws: WebSocketUpgrade,
    Path(ticket_id): Path<String>,
    State(app_state): State<AppState>,
) -> Response {
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

    let registry = app_state.registry_clone();
    let handler = Arc::new(AgentChatHandler { state: app_state });
    let opts = WsServerOptions {
        ping_interval: Duration::from_secs(util::config::ws_ping_secs()),
    };

    ws.on_upgrade(move |socket| serve_ticket(socket, registry, ticket_id, handler, opts))
        .into_response()
}
