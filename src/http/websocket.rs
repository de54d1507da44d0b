//! Persistent connection handling.
//!
//! # Responsibilities
//! - Complete the WebSocket upgrade on the socket path
//! - Decode inbound events and dispatch them to channel handlers
//! - Bind identities on every accepted message
//! - Purge the registry when the connection goes away
//!
//! # Data Flow
//! ```text
//! Plain HTTP on the socket path ──▶ same dispatch as every other path
//! Client ──text frame──▶ reader loop ──▶ SocketHub::dispatch ──▶ channel handler
//! Client ◀──text frame── writer task ◀── ConnectionHandle::send (any task)
//! ```
//!
//! # Design Decisions
//! - One writer task per connection drains the handle's queue
//! - Malformed frames, unknown channels and identity failures are dropped
//!   without a reply and without closing the connection
//! - Panics in the extractor or a channel handler are caught and count as a
//!   dropped message, so the reader loop always reaches the purge

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::Request;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};

use crate::http::handler::ChannelHandler;
use crate::http::server::{gateway_handler, AppState};
use crate::observability::metrics;
use crate::socket::frame::{decode_event, FrameError, InboundEvent, JsonObject};
use crate::socket::{ConnectionHandle, ConnectionRegistry, IdentityExtractor};

/// How long queued outbound frames may take to flush after disconnect.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Channel table, identity extraction and registry for socket traffic.
pub struct SocketHub {
    channels: HashMap<String, Arc<dyn ChannelHandler>>,
    extractor: Arc<dyn IdentityExtractor>,
    registry: ConnectionRegistry,
}

impl SocketHub {
    pub fn new(extractor: Arc<dyn IdentityExtractor>, registry: ConnectionRegistry) -> Self {
        Self {
            channels: HashMap::new(),
            extractor,
            registry,
        }
    }

    /// Register the handler for a channel, replacing any earlier one.
    pub fn register_channel(&mut self, name: impl Into<String>, handler: Arc<dyn ChannelHandler>) {
        let name = name.into();
        if self.channels.insert(name.clone(), handler).is_some() {
            tracing::warn!(channel = %name, "Channel handler replaced");
        }
    }

    pub fn set_extractor(&mut self, extractor: Arc<dyn IdentityExtractor>) {
        self.extractor = extractor;
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Handle one inbound text message from `connection`.
    ///
    /// On success the identity is bound to `connection` before the channel
    /// handler runs. Returns the identity, or why the message was dropped.
    pub fn dispatch(&self, connection: &ConnectionHandle, text: &str) -> Result<i64, FrameError> {
        let event = decode_event(text)?;
        let handler = self
            .channels
            .get(&event.channel)
            .ok_or_else(|| FrameError::UnknownChannel(event.channel.clone()))?;
        let identity = panic::catch_unwind(AssertUnwindSafe(|| self.extractor.extract(&event.payload)))
            .map_err(|_| FrameError::ExtractorPanicked)?
            .ok_or(FrameError::ExtractionFailed)?;

        self.registry.bind(identity, connection.clone());
        tracing::debug!(
            connection_id = %connection.id(),
            identity,
            channel = %event.channel,
            "Socket event dispatched"
        );

        let InboundEvent { channel, payload } = event;
        panic::catch_unwind(AssertUnwindSafe(|| handler.handle(connection.clone(), identity, payload)))
            .map_err(|_| FrameError::HandlerPanicked(channel))?;
        Ok(identity)
    }

    /// Send to an identity; unknown identities are ignored.
    pub fn send(&self, identity: i64, channel: &str, payload: Option<&JsonObject>) -> bool {
        self.registry.send(identity, channel, payload)
    }
}

/// Handler mounted on the socket path.
///
/// Upgrade requests become socket connections. Anything else on the path
/// goes through the usual route and asset dispatch.
pub async fn ws_handler(
    State(state): State<AppState>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    request: Request<Body>,
) -> Response {
    match upgrade {
        Ok(ws) => ws.on_upgrade(move |socket| handle_socket(socket, state.hub)),
        Err(rejection) => {
            tracing::debug!(path = %request.uri().path(), reason = %rejection, "Non-upgrade request on socket path");
            gateway_handler(State(state), request).await
        }
    }
}

async fn handle_socket(socket: WebSocket, hub: Arc<SocketHub>) {
    let (mut sender, mut receiver) = socket.split();
    let (connection, mut outbound) = ConnectionHandle::new();
    let connection_id = connection.id();

    metrics::record_socket_connection();
    tracing::info!(connection_id = %connection_id, "Socket connected");

    let send_task = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let closing = matches!(message, Message::Close(_));
            if sender.send(message).await.is_err() || closing {
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        let message = match result {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(connection_id = %connection_id, error = %e, "Socket read error");
                break;
            }
        };

        match message {
            Message::Text(text) => handle_text(&hub, &connection, text.as_str()),
            Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                Ok(text) => handle_text(&hub, &connection, text),
                Err(_) => {
                    tracing::debug!(connection_id = %connection_id, "Non UTF-8 binary frame dropped");
                    metrics::record_socket_message("malformed_frame");
                }
            },
            Message::Close(_) => {
                connection.send_message(Message::Close(None));
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    let removed = hub.registry().unbind_all(&connection);
    drop(connection);

    // Handlers may still hold clones of the handle; stop the writer so
    // their sends start failing instead of queueing forever.
    let writer = send_task.abort_handle();
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, send_task).await.is_err() {
        writer.abort();
    }

    tracing::info!(
        connection_id = %connection_id,
        identities_released = removed.len(),
        "Socket disconnected"
    );
}

fn handle_text(hub: &SocketHub, connection: &ConnectionHandle, text: &str) {
    match hub.dispatch(connection, text) {
        Ok(_) => metrics::record_socket_message("dispatched"),
        Err(e) => {
            tracing::debug!(connection_id = %connection.id(), error = %e, "Socket message dropped");
            metrics::record_socket_message(e.label());
        }
    }
}
