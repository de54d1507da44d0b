//! Persistent connection subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound text frame
//!     → frame.rs (decode channel + payload envelope)
//!     → identity.rs (extract application identity)
//!     → registry.rs (bind identity → connection)
//!     → channel handler
//!
//! Outbound event
//!     → registry.rs (identity → connection) or a ConnectionHandle directly
//!     → connection.rs (encode + queue on the connection's writer)
//!
//! Disconnect
//!     → registry.rs (purge every identity bound to the connection)
//! ```

pub mod connection;
pub mod frame;
pub mod identity;
pub mod registry;

pub use connection::{ConnectionHandle, ConnectionId};
pub use frame::{FrameError, InboundEvent, JsonObject};
pub use identity::{FieldExtractor, IdentityExtractor};
pub use registry::ConnectionRegistry;
