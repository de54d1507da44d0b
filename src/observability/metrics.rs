//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_http_requests_total` (counter): requests by kind, status
//! - `gateway_http_request_duration_seconds` (histogram): latency by kind
//! - `gateway_socket_messages_total` (counter): inbound socket messages by outcome
//! - `gateway_socket_connections_total` (counter): accepted socket connections
//! - `gateway_bound_identities` (gauge): identities currently bound
//!
//! Recording is a no-op until a recorder is installed with [`init_metrics`].

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// How an HTTP request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Routed,
    Static,
    NotFound,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Routed => "routed",
            RequestKind::Static => "static",
            RequestKind::NotFound => "not_found",
        }
    }
}

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(kind: RequestKind, status: u16, start: Instant) {
    counter!(
        "gateway_http_requests_total",
        "kind" => kind.as_str(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_http_request_duration_seconds", "kind" => kind.as_str())
        .record(start.elapsed().as_secs_f64());
}

/// `outcome` is `dispatched` or a drop reason.
pub fn record_socket_message(outcome: &'static str) {
    counter!("gateway_socket_messages_total", "outcome" => outcome).increment(1);
}

pub fn record_socket_connection() {
    counter!("gateway_socket_connections_total").increment(1);
}

pub fn record_bound_identities(count: usize) {
    gauge!("gateway_bound_identities").set(count as f64);
}
