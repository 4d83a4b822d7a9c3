use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use common::envelope::{Inbound, Outbound};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::{sync::mpsc, time};

use super::handler_trait::WsHandler;
use super::registry::{ConnectionRegistry, OUTBOUND_QUEUE_DEPTH};
use super::runtime::WsContext;

pub struct WsServerOptions {
    pub ping_interval: Duration,
}

impl Default for WsServerOptions {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(30),
        }
    }
}

/// Runs one ticket chat session to completion.
///
/// Lifecycle: register in the registry, queue the welcome envelope, snapshot
/// and queue the full ordered history (when non-empty) before any live
/// traffic, then serve bidirectionally until the transport closes. The
/// history snapshot is taken only after registration, so a message appended
/// concurrently is delivered live even when it missed the snapshot.
///
/// Teardown is unified: a read error, a transport close, or a dead writer
/// (which is how a failed ping write surfaces) all end the session, and every
/// exit path unregisters the connection.
pub async fn serve_ticket<H: WsHandler>(
    socket: WebSocket,
    registry: ConnectionRegistry,
    ticket_id: String,
    handler: Arc<H>,
    opts: WsServerOptions,
) {
    let (mut sink, mut stream) = socket.split();

    // Outbound queue and writer task; broadcasts from other sessions land
    // here through the registry.
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(OUTBOUND_QUEUE_DEPTH);
    let conn_id = registry.register(&ticket_id, out_tx.clone()).await;

    let mut writer_task = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if sink.send(frame).await.is_err() {
                break;
            }
        }
    });

    let ctx = WsContext::new(ticket_id.clone(), registry.clone(), out_tx.clone());

    let _ = ctx.reply(&Outbound::connection_established(&ticket_id)).await;
    let history = handler.load_history(&ctx).await;
    if !history.is_empty() {
        let _ = ctx
            .reply(&Outbound::message_history(&ticket_id, history))
            .await;
    }

    handler.on_open(&ctx).await;

    // WS-level keepalive on an independent timer. A ping that cannot be
    // queued within one interval (dead writer, or a client that stopped
    // reading) ends the session like a read failure would.
    let mut ping_task = {
        let out_tx = out_tx.clone();
        let interval = opts.ping_interval;
        tokio::spawn(async move {
            loop {
                time::sleep(interval).await;
                let send = out_tx.send(Message::Ping(Bytes::new()));
                match time::timeout(interval, send).await {
                    Ok(Ok(())) => {}
                    _ => break,
                }
            }
        })
    };

    // C→S: decode and dispatch until the transport gives out.
    let receive = async {
        while let Some(Ok(frame)) = stream.next().await {
            match frame {
                Message::Text(text) => {
                    dispatch(&ctx, handler.as_ref(), text.as_str()).await;
                }
                Message::Ping(payload) => {
                    let _ = ctx.reply_pong(payload).await;
                }
                Message::Pong(_) => {}
                Message::Binary(_) => {
                    tracing::warn!("ignoring binary frame on ticket '{}'", ctx.ticket_id);
                }
                Message::Close(_) => break,
            }
        }
    };

    tokio::select! {
        _ = &mut writer_task => {}
        _ = &mut ping_task => {}
        _ = receive => {}
    }

    handler.on_close(&ctx).await;
    ping_task.abort();
    writer_task.abort();
    registry.unregister(&ticket_id, &conn_id).await;
    tracing::info!("socket session ended for ticket '{ticket_id}' ({conn_id})");
}

async fn dispatch<H: WsHandler>(ctx: &WsContext, handler: &H, raw: &str) {
    match serde_json::from_str::<Inbound>(raw) {
        Ok(Inbound::Ping) => {
            let _ = ctx.reply(&Outbound::pong()).await;
        }
        Ok(Inbound::Pong) => {}
        Ok(Inbound::Identify { user_id }) => {
            let _ = ctx
                .reply(&Outbound::identify_success(&ctx.ticket_id, user_id))
                .await;
        }
        Ok(Inbound::NewMessage(frame)) => match frame.normalize() {
            Some(msg) => handler.on_message(ctx, msg).await,
            None => {
                tracing::warn!(
                    "dropping new_message without content on ticket '{}'",
                    ctx.ticket_id
                );
            }
        },
        // Unroutable or malformed frames are dropped; the session stays up.
        Err(e) => {
            tracing::warn!("dropping unroutable frame on '{}': {e}", ctx.ticket_id);
        }
    }
}
