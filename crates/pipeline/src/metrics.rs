//! Pipeline metrics
//!
//! Atomic counters for the fair-read, dispatch and worker loops, plus the
//! combined snapshot returned by `RelayServer::metrics()`.

use std::sync::atomic::{AtomicU64, Ordering};

use sysrelay_sinks::ForwarderMetricsSnapshot;
use sysrelay_sources::ListenerMetricsSnapshot;

/// Counters shared by every pipeline task
///
/// All counters use relaxed ordering; values may be slightly stale.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Messages pushed onto the inbound queue by the fair-read loop
    messages_read: AtomicU64,

    /// Messages handed to a worker queue
    messages_dispatched: AtomicU64,

    /// Messages delivered downstream
    messages_forwarded: AtomicU64,

    /// Messages whose transform produced empty text
    messages_skipped: AtomicU64,

    /// Messages dropped because the transform failed
    transform_failures: AtomicU64,

    /// Messages dropped after every send attempt failed
    delivery_failures: AtomicU64,

    /// Messages still queued in a worker when the server stopped
    messages_discarded: AtomicU64,
}

impl PipelineMetrics {
    /// Create new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            messages_read: AtomicU64::new(0),
            messages_dispatched: AtomicU64::new(0),
            messages_forwarded: AtomicU64::new(0),
            messages_skipped: AtomicU64::new(0),
            transform_failures: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
            messages_discarded: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_read(&self, count: u64) {
        self.messages_read.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dispatched(&self) {
        self.messages_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_forwarded(&self) {
        self.messages_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_skipped(&self) {
        self.messages_skipped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_transform_failure(&self) {
        self.transform_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_discarded(&self, count: u64) {
        self.messages_discarded.fetch_add(count, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> PipelineMetricsSnapshot {
        PipelineMetricsSnapshot {
            messages_read: self.messages_read.load(Ordering::Relaxed),
            messages_dispatched: self.messages_dispatched.load(Ordering::Relaxed),
            messages_forwarded: self.messages_forwarded.load(Ordering::Relaxed),
            messages_skipped: self.messages_skipped.load(Ordering::Relaxed),
            transform_failures: self.transform_failures.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            messages_discarded: self.messages_discarded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of pipeline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineMetricsSnapshot {
    pub messages_read: u64,
    pub messages_dispatched: u64,
    pub messages_forwarded: u64,
    pub messages_skipped: u64,
    pub transform_failures: u64,
    pub delivery_failures: u64,
    pub messages_discarded: u64,
}

/// Per-worker view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerMetricsSnapshot {
    /// Worker position in the pool
    pub index: usize,

    /// Messages waiting in the worker's queue
    pub queue_depth: usize,

    /// Outbound link counters
    pub forwarder: ForwarderMetricsSnapshot,
}

/// Everything `RelayServer::metrics()` reports
#[derive(Debug, Clone, Default)]
pub struct ServerMetrics {
    pub listener: ListenerMetricsSnapshot,
    pub pipeline: PipelineMetricsSnapshot,

    /// Empty while the server is stopped
    pub workers: Vec<WorkerMetricsSnapshot>,
}

impl ServerMetrics {
    /// Messages waiting across all worker queues
    pub fn total_queue_depth(&self) -> usize {
        self.workers.iter().map(|w| w.queue_depth).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = PipelineMetrics::new();
        metrics.record_read(3);
        metrics.record_dispatched();
        metrics.record_dispatched();
        metrics.record_forwarded();
        metrics.record_skipped();
        metrics.record_transform_failure();
        metrics.record_delivery_failure();
        metrics.record_discarded(4);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.messages_read, 3);
        assert_eq!(snapshot.messages_dispatched, 2);
        assert_eq!(snapshot.messages_forwarded, 1);
        assert_eq!(snapshot.messages_skipped, 1);
        assert_eq!(snapshot.transform_failures, 1);
        assert_eq!(snapshot.delivery_failures, 1);
        assert_eq!(snapshot.messages_discarded, 4);
    }

    #[test]
    fn test_total_queue_depth() {
        let metrics = ServerMetrics {
            workers: vec![
                WorkerMetricsSnapshot {
                    index: 0,
                    queue_depth: 2,
                    forwarder: ForwarderMetricsSnapshot::default(),
                },
                WorkerMetricsSnapshot {
                    index: 1,
                    queue_depth: 5,
                    forwarder: ForwarderMetricsSnapshot::default(),
                },
            ],
            ..Default::default()
        };
        assert_eq!(metrics.total_queue_depth(), 7);
    }
}
