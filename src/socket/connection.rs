//! Connection identity and outbound handles.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing and equality
//! - Give handlers a cloneable handle for pushing events to a live socket
//!
//! # Design Decisions
//! - The handle owns only the sending half of the connection's outbound
//!   queue; the socket itself stays with the connection task
//! - Sending to a closed connection is a silent no-op

use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::Message;
use tokio::sync::mpsc;

use crate::socket::frame::{encode_event, JsonObject};

/// Relaxed ordering is enough, we only need uniqueness.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Handle to one live persistent connection.
///
/// Two handles are equal when they refer to the same connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Message>,
}

impl ConnectionHandle {
    /// Create a handle and the receiver that drains its outbound queue.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: ConnectionId::new(),
                tx,
            },
            rx,
        )
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Whether the connection task is still draining this handle's queue.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Send an event on `channel`. `None` sends an empty object.
    ///
    /// Returns false if the connection has gone away.
    pub fn send(&self, channel: &str, payload: Option<&JsonObject>) -> bool {
        let text = match encode_event(channel, payload) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(connection_id = %self.id, channel = %channel, error = %e, "Failed to encode event");
                return false;
            }
        };

        if self.tx.send(Message::Text(text.into())).is_err() {
            tracing::debug!(connection_id = %self.id, channel = %channel, "Send to closed connection ignored");
            return false;
        }
        true
    }

    /// Queue a raw message, used for close frames.
    pub(crate) fn send_message(&self, message: Message) -> bool {
        self.tx.send(message).is_ok()
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}
