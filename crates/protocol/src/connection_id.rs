//! Connection identification
//!
//! `ConnectionId` identifies one accepted inbound connection for its whole
//! lifetime. Ids are never reused, so a connection dropped from the
//! pending-data registry can only come back as a fresh connection.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque, process-unique connection identifier
///
/// Ids are allocated from a monotonic counter, so ordering by id is the
/// same as ordering by accept time.
///
/// # Example
///
/// ```
/// use sysrelay_protocol::ConnectionId;
///
/// let a = ConnectionId::next();
/// let b = ConnectionId::next();
/// assert!(a < b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

impl ConnectionId {
    /// Allocate a new, never before used id
    #[inline]
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value (for logging)
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}
