use common::envelope::{NewMessage, WireMessage};
use std::future::Future;

use super::runtime::WsContext;

/// Feature hook for ticket chat sessions.
///
/// The session runtime handles the protocol floor itself (welcome, history
/// replay, ping/pong, identify); handlers only see normalized new-message
/// submissions.
pub trait WsHandler: Send + Sync + 'static {
    /// Loads the ticket's stored history for the replay envelope.
    ///
    /// The runtime calls this after the connection is registered, so a
    /// message appended concurrently is at worst delivered twice, never
    /// lost.
    fn load_history(&self, ctx: &WsContext) -> impl Future<Output = Vec<WireMessage>> + Send {
        async move {
            let _ = ctx;
            Vec::new()
        }
    }

    /// Called once after the welcome and history envelopes have been queued.
    fn on_open(&self, ctx: &WsContext) -> impl Future<Output = ()> + Send {
        async move {
            let _ = ctx;
        }
    }

    /// Called for every normalized inbound chat message.
    fn on_message(&self, ctx: &WsContext, msg: NewMessage) -> impl Future<Output = ()> + Send;

    /// Called when the connection is closing (the registry entry is removed
    /// after this returns).
    fn on_close(&self, ctx: &WsContext) -> impl Future<Output = ()> + Send {
        async move {
            let _ = ctx;
        }
    }
}
