//! Message ingestion for the widget relay: persist the local shadow copy,
//! fan out to widget sockets, and forward visitor traffic to the backend.

use common::envelope::Outbound;
use common::notify::{
    ClientMessageNotification, HEADER_MESSAGE_SOURCE, HEADER_WIDGET_ID, MESSAGE_SOURCE_WIDGET,
};
use db::error::StoreError;
use db::models::messages::{self, NewMessageRecord};
use db::models::tickets;
use util::notifier::notify_detached;
use util::state::AppState;
use util::ws;

/// Result of one ingestion call: the stored (or matched) message and whether
/// the call was suppressed as a re-delivery.
pub struct IngestOutcome {
    pub message: messages::Model,
    pub duplicate: bool,
}

/// Ingests a visitor message from the embedded widget (REST or socket).
///
/// `is_client` is always `true` on this path. Missing author fields fall
/// back to the identity stored on the ticket. After the local append the
/// message is broadcast to widget sockets and forwarded to the backend on a
/// detached task; the submitter's response never waits on the forward.
pub async fn ingest_client_message(
    state: &AppState,
    ticket_id: &str,
    content: &str,
    user_name: Option<String>,
    user_email: Option<String>,
) -> Result<IngestOutcome, StoreError> {
    let ticket = tickets::Model::find_by_id(state.db(), ticket_id)
        .await?
        .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))?;

    let user_name = user_name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| ticket.user_name.clone());
    let user_email = user_email
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| ticket.user_email.clone());

    let message = messages::Model::append(
        state.db(),
        ticket_id,
        NewMessageRecord {
            content: content.to_string(),
            is_client: true,
            user_name: Some(user_name.clone()),
            user_email: Some(user_email.clone()),
        },
    )
    .await?;

    let envelope = Outbound::new_message(ticket_id, (&message).into());
    ws::emit(state.registry(), ticket_id, &envelope).await;

    let payload = ClientMessageNotification {
        ticket_id: ticket_id.to_string(),
        content: message.content.clone(),
        user_id: Some(user_email.clone()),
        is_client: true,
        user_name: Some(user_name),
        user_email: Some(user_email),
    };
    notify_detached(
        state.notifier_clone(),
        "/api/widget/messages".to_string(),
        payload,
        vec![
            (HEADER_MESSAGE_SOURCE, MESSAGE_SOURCE_WIDGET.to_string()),
            (HEADER_WIDGET_ID, ticket.widget_id.unwrap_or_default()),
        ],
    );

    Ok(IngestOutcome {
        message,
        duplicate: false,
    })
}

/// Ingests an agent message delivered by the backend's notifier.
///
/// `is_client` is always `false` here. The backend retries delivery and also
/// echoes visitor messages back, so an identical-content message stored
/// within the duplicate window is acknowledged without a second copy; this
/// window is the system's only idempotence guard.
pub async fn ingest_agent_message(
    state: &AppState,
    ticket_id: &str,
    content: &str,
    agent_name: Option<String>,
) -> Result<IngestOutcome, StoreError> {
    if let Some(existing) =
        messages::Model::find_recent_duplicate(state.db(), ticket_id, content).await?
    {
        tracing::info!("suppressed duplicate agent message on ticket {ticket_id}");
        return Ok(IngestOutcome {
            message: existing,
            duplicate: true,
        });
    }

    let message = messages::Model::append(
        state.db(),
        ticket_id,
        NewMessageRecord {
            content: content.to_string(),
            is_client: false,
            user_name: Some(agent_name.unwrap_or_else(|| "Support".to_string())),
            user_email: None,
        },
    )
    .await?;

    // Widget-side fan-out only; relaying back to the backend would loop.
    let envelope = Outbound::new_message(ticket_id, (&message).into());
    ws::emit(state.registry(), ticket_id, &envelope).await;

    Ok(IngestOutcome {
        message,
        duplicate: false,
    })
}
