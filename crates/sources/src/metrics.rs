//! Listener metrics
//!
//! Lock-free counters updated from the accept loop, the receive tasks and
//! the fair reader.

use std::sync::atomic::{AtomicU64, Ordering};

use sysrelay_protocol::{Priority, Severity};

/// Counters for the inbound side
#[derive(Debug, Default)]
pub struct ListenerMetrics {
    /// Currently open connections
    pub connections_active: AtomicU64,

    /// Connections accepted since start
    pub connections_total: AtomicU64,

    /// Successful socket reads
    pub chunks_received: AtomicU64,

    /// Bytes read from sockets
    pub bytes_received: AtomicU64,

    /// Failed accepts
    pub accept_errors: AtomicU64,

    /// Failed reads (excluding resets by the peer)
    pub read_errors: AtomicU64,

    /// Messages decoded, indexed by severity code
    pub messages_by_severity: [AtomicU64; 8],

    /// Messages decoded without a valid `<PRI>`
    pub messages_unparsed: AtomicU64,
}

impl ListenerMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn connection_opened(&self) {
        self.connections_active.fetch_add(1, Ordering::Relaxed);
        self.connections_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn chunk_received(&self, bytes: usize) {
        self.chunks_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn accept_error(&self) {
        self.accept_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Count decoded messages by their syslog severity
    pub fn messages_decoded(&self, messages: &[String]) {
        for message in messages {
            match Priority::parse(message) {
                Ok(priority) => {
                    self.messages_by_severity[priority.severity.code() as usize]
                        .fetch_add(1, Ordering::Relaxed);
                }
                Err(_) => {
                    self.messages_unparsed.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> ListenerMetricsSnapshot {
        ListenerMetricsSnapshot {
            connections_active: self.connections_active.load(Ordering::Relaxed),
            connections_total: self.connections_total.load(Ordering::Relaxed),
            chunks_received: self.chunks_received.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            accept_errors: self.accept_errors.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            messages_by_severity: std::array::from_fn(|i| {
                self.messages_by_severity[i].load(Ordering::Relaxed)
            }),
            messages_unparsed: self.messages_unparsed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of listener metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerMetricsSnapshot {
    pub connections_active: u64,
    pub connections_total: u64,
    pub chunks_received: u64,
    pub bytes_received: u64,
    pub accept_errors: u64,
    pub read_errors: u64,
    pub messages_by_severity: [u64; 8],
    pub messages_unparsed: u64,
}

impl ListenerMetricsSnapshot {
    /// Messages counted for one severity
    pub fn messages_with(&self, severity: Severity) -> u64 {
        self.messages_by_severity[severity.code() as usize]
    }

    /// All decoded messages
    pub fn messages_total(&self) -> u64 {
        self.messages_by_severity.iter().sum::<u64>() + self.messages_unparsed
    }
}
