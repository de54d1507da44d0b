//! Application callback seams.
//!
//! Both traits are implemented for plain closures, so registration usually
//! looks like `gateway.register("/api/*", |query, body, responder| { ... })`.

use crate::http::request::RequestQuery;
use crate::http::response::Responder;
use crate::socket::{ConnectionHandle, JsonObject};

/// Handles routed HTTP requests.
///
/// Called synchronously on the connection's task. Long work should be moved
/// to a spawned task, carrying the `Responder` along.
pub trait HttpHandler: Send + Sync + 'static {
    fn handle(&self, query: RequestQuery, body: JsonObject, responder: Responder);
}

impl<F> HttpHandler for F
where
    F: Fn(RequestQuery, JsonObject, Responder) + Send + Sync + 'static,
{
    fn handle(&self, query: RequestQuery, body: JsonObject, responder: Responder) {
        self(query, body, responder)
    }
}

/// Handles inbound events on one socket channel.
pub trait ChannelHandler: Send + Sync + 'static {
    fn handle(&self, connection: ConnectionHandle, identity: i64, payload: JsonObject);
}

impl<F> ChannelHandler for F
where
    F: Fn(ConnectionHandle, i64, JsonObject) + Send + Sync + 'static,
{
    fn handle(&self, connection: ConnectionHandle, identity: i64, payload: JsonObject) {
        self(connection, identity, payload)
    }
}
