//! Connection Registry
//!
//! Two views over the accepted connections:
//!
//! - **live**: connections whose socket is open; pruned on disconnect
//! - **pending**: connections that may still hold unparsed chunks; pruned
//!   only after a drain finds the connection disconnected and empty
//!
//! Both are `BTreeMap`s keyed by `ConnectionId`, so iteration order is
//! accept order and snapshots are stable for the duration of one call.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use sysrelay_protocol::ConnectionId;

use crate::connection::FramedConnection;

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;

/// Shared set of live and pending connections
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    live: RwLock<BTreeMap<ConnectionId, Arc<FramedConnection>>>,
    pending: RwLock<BTreeMap<ConnectionId, Arc<FramedConnection>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly accepted connection to both views
    ///
    /// An already disconnected connection only joins the pending view.
    pub fn register(&self, connection: Arc<FramedConnection>) {
        let id = connection.id();
        if !connection.is_disconnected() {
            self.live.write().insert(id, Arc::clone(&connection));
        }
        self.pending.write().insert(id, connection);
    }

    /// Disconnect a connection and drop it from the live view
    ///
    /// The connection stays pending until its queued chunks are drained.
    /// Unknown ids are ignored.
    pub fn disconnect(&self, id: ConnectionId) {
        let removed = self.live.write().remove(&id);
        if let Some(connection) = removed {
            connection.disconnect();
            tracing::debug!(connection_id = %id, peer = %connection.peer_addr(), "connection disconnected");
        }
    }

    /// Disconnect every live connection
    pub fn disconnect_all(&self) -> usize {
        let connections = std::mem::take(&mut *self.live.write());
        for connection in connections.values() {
            connection.disconnect();
        }
        connections.len()
    }

    /// Drain one chunk of `connection`, pruning it from pending when done
    ///
    /// Same result contract as `FramedConnection::drain`.
    pub fn drain(&self, connection: &Arc<FramedConnection>) -> Option<Vec<String>> {
        let result = connection.drain();

        if connection.is_exhausted() {
            let mut pending = self.pending.write();
            // Re-check under the lock; removal happens at most once.
            if connection.is_exhausted() && pending.remove(&connection.id()).is_some() {
                tracing::trace!(connection_id = %connection.id(), "connection left pending registry");
            }
        }

        result
    }

    /// Drain every queued chunk of every pending connection
    ///
    /// No fairness: connections are emptied one after another in accept
    /// order.
    pub fn drain_all(&self) -> Vec<String> {
        let mut messages = Vec::new();
        for connection in self.pending_snapshot() {
            // The final `None` drain also prunes a finished connection.
            while let Some(batch) = self.drain(&connection) {
                messages.extend(batch);
            }
        }
        messages
    }

    /// Point-in-time copy of the pending view, in accept order
    pub fn pending_snapshot(&self) -> Vec<Arc<FramedConnection>> {
        self.pending.read().values().cloned().collect()
    }

    /// Look up a live connection
    pub fn get(&self, id: ConnectionId) -> Option<Arc<FramedConnection>> {
        self.live.read().get(&id).cloned()
    }

    /// Whether `id` is in the pending view
    pub fn is_pending(&self, id: ConnectionId) -> bool {
        self.pending.read().contains_key(&id)
    }

    /// Number of live connections
    pub fn live_count(&self) -> usize {
        self.live.read().len()
    }

    /// Number of connections that may still hold data
    pub fn pending_count(&self) -> usize {
        self.pending.read().len()
    }
}
