//! WebSocket connection lifecycle.
//!
//! Each accepted socket gets a reader loop (this task) and a writer task.
//! The writer drains the connection's bounded outbound queue; it finishes
//! when every sender is gone, which happens once the registry drops the
//! connection. Eviction and replacement by a reconnecting device also fire
//! the handle's close signal, so a writer stuck on a stalled peer cannot
//! keep the reader alive.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::router::{MessageRouter, Session};
use crate::domain::{ConnectionHandle, ConnectionId};

/// Runs the read/write loops for a single WebSocket connection.
///
/// Returns after the peer closes, the transport errors, the writer finishes
/// or the connection is told to close. The connection is always
/// deregistered before returning, and dropping the read half together with
/// the aborted writer tears the socket down.
pub async fn run_connection(socket: WebSocket, router: Arc<MessageRouter>, outbound_capacity: usize) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(outbound_capacity);
    let handle = ConnectionHandle::new(ConnectionId::new(), out_tx);
    let shutdown = handle.shutdown_signal();
    let mut session = Session::new(handle);
    let connection_id = session.id();
    tracing::debug!(connection_id = %connection_id, "connection accepted");

    let mut writer = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if ws_tx.send(frame).await.is_err() {
                return;
            }
        }
        let _ = ws_tx.close().await;
    });

    loop {
        tokio::select! {
            // Incoming frame from the peer
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(frame)) => {
                        router.route(&mut session, frame).await;
                    }
                    Some(Err(err)) => {
                        tracing::debug!(connection_id = %connection_id, error = %err, "transport error");
                        break;
                    }
                }
            }
            // Writer finished: socket dead or connection dropped by the registry
            _ = &mut writer => break,
            // Evicted or displaced while the writer may still be blocked
            () = shutdown.notified() => {
                tracing::debug!(connection_id = %connection_id, "connection closed by relay");
                break;
            }
        }
    }

    router.disconnect(&session).await;
    writer.abort();
}
