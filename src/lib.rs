//! Single-port gateway for static assets, routed JSON calls and
//! identity-keyed WebSocket connections.

pub mod assets;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod socket;

pub use config::GatewayConfig;
pub use http::{Gateway, RequestQuery, Responder};
pub use lifecycle::Shutdown;
pub use socket::{ConnectionHandle, ConnectionRegistry, JsonObject};
