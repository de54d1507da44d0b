//! Identity to connection registry.
//!
//! # Responsibilities
//! - Bind an application identity to the connection that last spoke for it
//! - Resolve identities for outbound sends
//! - Purge every identity of a connection when it disconnects
//!
//! # Design Decisions
//! - Backed by `DashMap`; cloning the registry shares the same map
//! - Most recent bind wins; the replaced connection is not closed
//! - Purge is two-phase (snapshot keys, then remove), and each removal
//!   re-checks that the key still maps to the disconnecting handle so a
//!   fresh bind is never lost to a stale purge

use std::sync::Arc;

use dashmap::DashMap;

use crate::observability::metrics;
use crate::socket::connection::ConnectionHandle;
use crate::socket::frame::JsonObject;

/// Thread-safe `identity → connection` map.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<DashMap<i64, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `identity` to `handle`, replacing any earlier binding.
    pub fn bind(&self, identity: i64, handle: ConnectionHandle) {
        let connection_id = handle.id();
        if let Some(previous) = self.inner.insert(identity, handle) {
            if previous.id() != connection_id {
                tracing::debug!(
                    identity,
                    previous = %previous.id(),
                    connection_id = %connection_id,
                    "Identity rebound to new connection"
                );
            }
        }
        metrics::record_bound_identities(self.inner.len());
    }

    /// The connection currently bound to `identity`.
    pub fn lookup(&self, identity: i64) -> Option<ConnectionHandle> {
        self.inner.get(&identity).map(|entry| entry.value().clone())
    }

    /// Remove every identity bound to `handle`. Returns the identities removed.
    pub fn unbind_all(&self, handle: &ConnectionHandle) -> Vec<i64> {
        let keys: Vec<i64> = self
            .inner
            .iter()
            .filter(|entry| entry.value() == handle)
            .map(|entry| *entry.key())
            .collect();

        let removed = self.remove_if_bound(keys, handle);
        if !removed.is_empty() {
            tracing::debug!(connection_id = %handle.id(), identities = ?removed, "Connection unbound");
        }
        metrics::record_bound_identities(self.inner.len());
        removed
    }

    fn remove_if_bound(&self, keys: Vec<i64>, handle: &ConnectionHandle) -> Vec<i64> {
        keys.into_iter()
            .filter(|key| self.inner.remove_if(key, |_, current| current == handle).is_some())
            .collect()
    }

    /// Send an event to the connection bound to `identity`.
    ///
    /// Unknown identities are ignored; returns whether a message was queued.
    pub fn send(&self, identity: i64, channel: &str, payload: Option<&JsonObject>) -> bool {
        match self.lookup(identity) {
            Some(handle) => handle.send(channel, payload),
            None => {
                tracing::debug!(identity, channel = %channel, "Send to unknown identity ignored");
                false
            }
        }
    }

    /// Number of bound identities.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
