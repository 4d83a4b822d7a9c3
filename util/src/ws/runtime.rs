use axum::extract::ws::Message;
use common::envelope::Outbound;
use tokio::sync::mpsc;

use crate::ws::ConnectionRegistry;

/// Per-session handle given to feature handlers.
pub struct WsContext {
    pub ticket_id: String,
    pub registry: ConnectionRegistry,
    // enqueue frames for this session's writer task
    out_tx: mpsc::Sender<Message>,
}

impl WsContext {
    pub fn new(
        ticket_id: String,
        registry: ConnectionRegistry,
        out_tx: mpsc::Sender<Message>,
    ) -> Self {
        Self {
            ticket_id,
            registry,
            out_tx,
        }
    }

    /// Send an envelope to this client only.
    pub async fn reply(&self, env: &Outbound) -> Result<(), ()> {
        match env.to_text() {
            Some(text) => self
                .out_tx
                .send(Message::Text(text.into()))
                .await
                .map_err(|_| ()),
            None => Err(()),
        }
    }

    /// Send a WS-level pong to this client.
    pub async fn reply_pong(&self, payload: bytes::Bytes) -> Result<(), ()> {
        self.out_tx
            .send(Message::Pong(payload))
            .await
            .map_err(|_| ())
    }

    /// Broadcast an envelope to every connection on this ticket.
    pub async fn emit(&self, env: &Outbound) {
        crate::ws::emit(&self.registry, &self.ticket_id, env).await;
    }
}
