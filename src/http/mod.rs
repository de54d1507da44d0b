//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (normalize URI, decode query, read JSON body)
//!     → [routing layer picks a handler] or [assets resolve a file]
//!     → response.rs (JSON / asset / 404, Connection: close)
//!     → Send to client
//!
//! Upgrade on the socket path
//!     → websocket.rs (event loop per connection)
//! ```

pub mod handler;
pub mod request;
pub mod response;
pub mod server;
pub mod websocket;

pub use handler::{ChannelHandler, HttpHandler};
pub use request::{normalize_path, RequestQuery};
pub use response::{JsonReply, Responder};
pub use server::{AppState, Gateway};
pub use websocket::SocketHub;
