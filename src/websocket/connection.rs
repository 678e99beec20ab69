//! A single registered WebSocket peer
//!
//! The connection never touches the socket directly. Outbound frames go into a
//! bounded queue drained by a writer task, so `send` is non-blocking and safe
//! to call from any number of concurrent broadcasts.

use super::message::Message;
use std::fmt;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

/// Default outbound queue depth per connection
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Identity of a connection inside a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Why a frame could not be queued for a peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("outbound queue full, peer is not reading")]
    Full,
    #[error("connection closed")]
    Closed,
}

pub struct Connection {
    id: ConnectionId,
    sender: mpsc::Sender<Message>,
    closed: watch::Sender<bool>,
}

impl Connection {
    /// Wrap an existing outbound queue
    pub fn new(sender: mpsc::Sender<Message>) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            id: ConnectionId::new(),
            sender,
            closed,
        }
    }

    /// Create a connection together with the receiving end of its outbound queue
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a frame for delivery without waiting.
    ///
    /// Fails once the connection is closed, the writer is gone, or the queue
    /// is full.
    pub fn send(&self, msg: Message) -> Result<(), SendError> {
        if self.is_closed() {
            return Err(SendError::Closed);
        }
        self.sender.try_send(msg).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::Full,
            mpsc::error::TrySendError::Closed(_) => SendError::Closed,
        })
    }

    /// Send a text frame
    pub fn send_text(&self, text: impl Into<String>) -> Result<(), SendError> {
        self.send(Message::text(text))
    }

    /// Mark the connection closed and wake everything waiting on [`closed`](Self::closed).
    ///
    /// Returns `true` only for the call that performed the close.
    pub fn close(&self) -> bool {
        !self.closed.send_replace(true)
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once the connection has been closed
    pub async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        // The sender lives in `self`, so this only returns once the flag flips.
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}
