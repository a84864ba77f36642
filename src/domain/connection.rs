//! Outbound handle for a single live connection.

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::{Notify, mpsc};
use tokio::sync::mpsc::error::TrySendError;

use super::ConnectionId;

/// Reason a frame could not be queued for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The connection's outbound queue is full; the peer is not keeping up.
    #[error("outbound queue full")]
    QueueFull,
    /// The connection's writer has gone away.
    #[error("connection closed")]
    Closed,
}

/// Cloneable sending side of a connection.
///
/// Wraps the bounded outbound queue drained by the connection's writer task.
/// Once every clone of a handle is dropped the writer task finishes and the
/// socket is closed, so the registry holding the only long-lived clone is
/// what keeps a classified connection open.
///
/// A writer blocked on a stalled peer never sees its queue close, so every
/// clone also shares a close signal watched by the connection's reader loop.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::Sender<Message>,
    shutdown: Arc<Notify>,
}

impl ConnectionHandle {
    /// Creates a handle for the connection `id` writing into `outbound`.
    #[must_use]
    pub fn new(id: ConnectionId, outbound: mpsc::Sender<Message>) -> Self {
        Self {
            id,
            outbound,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Returns the transport identity of this connection.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues a frame without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::QueueFull`] when the peer is lagging and
    /// [`DeliveryError::Closed`] when the writer task has exited.
    pub fn try_deliver(&self, message: Message) -> Result<(), DeliveryError> {
        self.outbound.try_send(message).map_err(|err| match err {
            TrySendError::Full(_) => DeliveryError::QueueFull,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    /// Asks the connection to tear itself down.
    ///
    /// The request is remembered if the reader loop is not waiting yet.
    pub fn close(&self) {
        self.shutdown.notify_one();
    }

    /// Returns the signal fired by [`ConnectionHandle::close`].
    #[must_use]
    pub fn shutdown_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn delivers_into_queue() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new(ConnectionId::new(), tx);
        assert!(handle.try_deliver(Message::text("hello")).is_ok());

        let Some(Message::Text(text)) = rx.recv().await else {
            panic!("expected text frame");
        };
        assert_eq!(text.as_str(), "hello");
    }

    #[test]
    fn full_queue_is_reported() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new(ConnectionId::new(), tx);
        assert!(handle.try_deliver(Message::text("a")).is_ok());
        assert_eq!(
            handle.try_deliver(Message::text("b")),
            Err(DeliveryError::QueueFull)
        );
    }

    #[tokio::test]
    async fn close_fires_signal_of_every_clone() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new(ConnectionId::new(), tx);
        let signal = handle.shutdown_signal();

        handle.clone().close();
        let fired = tokio::time::timeout(Duration::from_secs(1), signal.notified()).await;
        assert!(fired.is_ok(), "close before waiting must still be observed");
    }

    #[test]
    fn dropped_receiver_is_reported() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let handle = ConnectionHandle::new(ConnectionId::new(), tx);
        assert_eq!(
            handle.try_deliver(Message::text("a")),
            Err(DeliveryError::Closed)
        );
    }
}
