//! Response construction.
//!
//! # Responsibilities
//! - Provide the single-use `Responder` handed to routed handlers
//! - Build JSON, static asset, 404 and 500 responses
//!
//! # Design Decisions
//! - Every gateway response carries `Connection: close`
//! - `Responder::respond` consumes the responder, so a second reply cannot
//!   be written; a dropped responder is answered with 500

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::assets::Asset;

/// A handler's reply to a routed request.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonReply {
    pub status: StatusCode,
    pub body: Value,
}

/// Single-use capability for answering a routed request.
///
/// May be moved to another task and used later, for example after a delay.
#[derive(Debug)]
pub struct Responder {
    tx: oneshot::Sender<JsonReply>,
}

impl Responder {
    /// Create a responder and the receiver the gateway waits on.
    pub fn channel() -> (Self, oneshot::Receiver<JsonReply>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Send `payload` with `status`.
    ///
    /// Returns false if the client is no longer waiting.
    pub fn respond(self, payload: impl Into<Value>, status: StatusCode) -> bool {
        self.tx
            .send(JsonReply {
                status,
                body: payload.into(),
            })
            .is_ok()
    }

    /// Send `payload` with 200 OK.
    pub fn ok(self, payload: impl Into<Value>) -> bool {
        self.respond(payload, StatusCode::OK)
    }

    /// Whether the client is still waiting for this reply.
    pub fn is_pending(&self) -> bool {
        !self.tx.is_closed()
    }
}

fn close_after(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}

/// Serialize a handler reply.
pub fn json_response(reply: JsonReply) -> Response {
    let body = match serde_json::to_vec(&reply.body) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize handler reply");
            return internal_error();
        }
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = reply.status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    close_after(response)
}

/// Serve a resolved static asset with 200.
pub fn asset_response(asset: Asset) -> Response {
    let content_type = HeaderValue::from_str(&asset.mime_type).unwrap_or_else(|_| {
        tracing::warn!(mime_type = %asset.mime_type, "Unrepresentable content type");
        HeaderValue::from_static("application/octet-stream")
    });

    let mut response = Response::new(Body::from(asset.body));
    response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    close_after(response)
}

/// Empty 404 without a content type.
pub fn not_found() -> Response {
    empty(StatusCode::NOT_FOUND)
}

/// Empty 500 without a content type.
pub fn internal_error() -> Response {
    empty(StatusCode::INTERNAL_SERVER_ERROR)
}

fn empty(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    close_after(response)
}
