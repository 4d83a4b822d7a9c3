//! Message ingestion for the backend: persist, fan out, notify the relay.

use common::envelope::Outbound;
use common::notify::AgentMessageNotification;
use db::error::StoreError;
use db::models::messages::{self, NewMessageRecord};
use util::notifier::notify_detached;
use util::state::AppState;
use util::ws;

/// Result of one ingestion call: the stored (or matched) message and whether
/// the call was suppressed as a re-delivery.
pub struct IngestOutcome {
    pub message: messages::Model,
    pub duplicate: bool,
}

/// Ingests a visitor-authored message relayed from the widget service.
///
/// `is_client` is always `true` on this path regardless of what the caller
/// sent; the flag in the wire payload is never trusted.
pub async fn ingest_client_message(
    state: &AppState,
    ticket_id: &str,
    content: &str,
    user_name: Option<String>,
    user_email: Option<String>,
) -> Result<IngestOutcome, StoreError> {
    let message = messages::Model::append(
        state.db(),
        ticket_id,
        NewMessageRecord {
            content: content.to_string(),
            is_client: true,
            user_name,
            user_email,
        },
    )
    .await?;

    fan_out(state, &message).await;
    Ok(IngestOutcome {
        message,
        duplicate: false,
    })
}

/// Ingests an agent-authored message (REST or agent console socket).
///
/// `is_client` is always `false` on this path. An identical-content message
/// stored within the duplicate window is reported as a flagged no-op success
/// instead of being stored again.
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

    fan_out(state, &message).await;
    Ok(IngestOutcome {
        message,
        duplicate: false,
    })
}

/// Fan-out after a successful persistence: broadcast to this service's own
/// sockets, then hand the relay notification to a detached task. The two are
/// independent; neither failing blocks the other, and the request path never
/// waits on the notifier.
async fn fan_out(state: &AppState, message: &messages::Model) {
    let envelope = Outbound::new_message(&message.ticket_id, message.into());
    ws::emit(state.registry(), &message.ticket_id, &envelope).await;

    let payload = AgentMessageNotification {
        ticket_id: message.ticket_id.clone(),
        content: message.content.clone(),
        user_id: message.user_email.clone(),
        agent_name: message.user_name.clone(),
    };
    notify_detached(
        state.notifier_clone(),
        "/api/agent/messages".to_string(),
        payload,
        Vec::new(),
    );
}
