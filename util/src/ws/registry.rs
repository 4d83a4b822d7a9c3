//! A thread-safe registry of live socket connections, bucketed by ticket.
//!
//! Owned by the service's `AppState` and handed to every handler that needs
//! it; nothing in the workspace reaches for it through global state. Each
//! registered connection is a bounded queue into that session's writer task,
//! so a stalled client can never block delivery to its neighbours.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::Message;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc};

/// Depth of each connection's outbound frame queue.
pub const OUTBOUND_QUEUE_DEPTH: usize = 64;

struct RegisteredConnection {
    id: String,
    #[allow(dead_code)]
    connected_at: DateTime<Utc>,
    sender: mpsc::Sender<Message>,
}

/// Tracks which live connections are interested in which ticket and
/// broadcasts to all of them.
///
/// - Mutations and the broadcast snapshot are serialized by a single mutex.
/// - Delivery happens outside the guard via `try_send`; a full or closed
///   queue is logged and skipped.
/// - A ticket's bucket is removed as soon as its last connection leaves.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<Mutex<HashMap<String, Vec<RegisteredConnection>>>>,
    next_id: Arc<AtomicU64>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection under the ticket's bucket and returns its id.
    ///
    /// Ids are unique for the lifetime of the process.
    pub async fn register(&self, ticket_id: &str, sender: mpsc::Sender<Message>) -> String {
        let id = format!("conn-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut map = self.inner.lock().await;
        map.entry(ticket_id.to_string())
            .or_default()
            .push(RegisteredConnection {
                id: id.clone(),
                connected_at: Utc::now(),
                sender,
            });
        tracing::info!("registered connection {id} for ticket {ticket_id}");
        id
    }

    /// Removes a connection; drops the bucket entirely once it is empty.
    pub async fn unregister(&self, ticket_id: &str, connection_id: &str) {
        let mut map = self.inner.lock().await;
        if let Some(conns) = map.get_mut(ticket_id) {
            conns.retain(|c| c.id != connection_id);
            if conns.is_empty() {
                map.remove(ticket_id);
            }
        }
        tracing::info!("removed connection {connection_id} for ticket {ticket_id}");
    }

    /// Writes `text` to every connection currently registered for the ticket.
    ///
    /// The connection set is snapshotted under the lock and delivery happens
    /// outside it. A failed write on one connection is logged and does not
    /// abort delivery to the others; no back-pressure reaches the caller.
    pub async fn broadcast(&self, ticket_id: &str, text: impl Into<String>) {
        let text = text.into();
        let snapshot: Vec<(String, mpsc::Sender<Message>)> = {
            let map = self.inner.lock().await;
            match map.get(ticket_id) {
                Some(conns) => conns
                    .iter()
                    .map(|c| (c.id.clone(), c.sender.clone()))
                    .collect(),
                None => {
                    tracing::debug!("no live connections for ticket {ticket_id}");
                    return;
                }
            }
        };

        let total = snapshot.len();
        let mut sent = 0usize;
        for (id, sender) in snapshot {
            match sender.try_send(Message::Text(text.clone().into())) {
                Ok(()) => sent += 1,
                Err(e) => {
                    tracing::warn!(
                        "dropping broadcast to connection {id} on ticket {ticket_id}: {e}"
                    );
                }
            }
        }
        tracing::debug!("broadcast to {sent}/{total} connections on ticket {ticket_id}");
    }

    /// Number of live connections for a ticket.
    pub async fn connection_count(&self, ticket_id: &str) -> usize {
        let map = self.inner.lock().await;
        map.get(ticket_id).map(|c| c.len()).unwrap_or(0)
    }

    /// Whether the registry holds any entry for the ticket.
    pub async fn has_ticket(&self, ticket_id: &str) -> bool {
        let map = self.inner.lock().await;
        map.contains_key(ticket_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Duration, timeout};

    async fn recv_text(rx: &mut mpsc::Receiver<Message>) -> String {
        let frame = timeout(Duration::from_millis(50), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match frame {
            Message::Text(text) => text.as_str().to_string(),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn it_broadcasts_to_all_connections() {
        let registry = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);

        registry.register("TICKET-1", tx1).await;
        registry.register("TICKET-1", tx2).await;

        registry.broadcast("TICKET-1", "hello world").await;

        assert_eq!(recv_text(&mut rx1).await, "hello world");
        assert_eq!(recv_text(&mut rx2).await, "hello world");
    }

    #[tokio::test]
    async fn a_dead_connection_does_not_block_the_others() {
        let registry = ConnectionRegistry::new();
        let (tx1, rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);

        registry.register("TICKET-1", tx1).await;
        registry.register("TICKET-1", tx2).await;
        drop(rx1);

        registry.broadcast("TICKET-1", "still delivered").await;

        assert_eq!(recv_text(&mut rx2).await, "still delivered");
    }

    #[tokio::test]
    async fn broadcast_to_unknown_ticket_does_not_panic() {
        let registry = ConnectionRegistry::new();
        registry.broadcast("TICKET-none", "silent").await;
    }

    #[tokio::test]
    async fn bucket_is_removed_after_last_unregister() {
        let registry = ConnectionRegistry::new();
        let (tx1, _rx1) = mpsc::channel(8);
        let (tx2, _rx2) = mpsc::channel(8);

        let a = registry.register("TICKET-1", tx1).await;
        let b = registry.register("TICKET-1", tx2).await;
        assert_eq!(registry.connection_count("TICKET-1").await, 2);

        registry.unregister("TICKET-1", &a).await;
        assert!(registry.has_ticket("TICKET-1").await);
        registry.unregister("TICKET-1", &b).await;
        assert!(!registry.has_ticket("TICKET-1").await);
    }

    #[tokio::test]
    async fn connection_ids_are_unique() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::channel(8);
        let a = registry.register("TICKET-1", tx.clone()).await;
        let b = registry.register("TICKET-2", tx).await;
        assert_ne!(a, b);
    }
}
