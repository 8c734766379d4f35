//! Forwarder - Downstream Delivery
//!
//! Sends framed messages to the single downstream endpoint of a worker.
//!
//! # Design
//!
//! - **Lazy connection**: Nothing is dialed until the first send. A link
//!   found closed is dropped and redialed on the next send; callers never
//!   reconnect explicitly.
//! - **Bounded retry**: `send_with_retry` makes at most `retry_attempts`
//!   attempts with a fixed `retry_interval` between them, then gives up.
//!   Delivery is at-most-once.
//! - **Pluggable link**: The transport sits behind the `Downstream` trait;
//!   `TcpDownstream` is the production implementation.
//!
//! # Protocol
//!
//! Frames are written as-is. The caller is responsible for the trailing
//! NUL (see `sysrelay_protocol::encode_frame`):
//! ```text
//! <13>message one\0<13>message two\0
//! ```

mod downstream;

pub use downstream::{Downstream, TcpDownstream};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;


/// Configuration for a forwarder
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Downstream address (host:port)
    pub target: String,

    /// Connection timeout (zero = wait for the OS)
    pub connect_timeout: Duration,

    /// Write timeout per frame (zero = none)
    pub write_timeout: Duration,

    /// Total send attempts per message
    pub retry_attempts: usize,

    /// Wait time between attempts
    pub retry_interval: Duration,

    /// TCP keep-alive enabled
    pub tcp_keepalive: bool,

    /// TCP keep-alive interval (only used if tcp_keepalive is true)
    pub tcp_keepalive_interval: Duration,
}

impl ForwarderConfig {
    /// Create a config with default retry policy (3 attempts, 100ms apart)
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            connect_timeout: Duration::ZERO,
            write_timeout: Duration::ZERO,
            retry_attempts: 3,
            retry_interval: Duration::from_millis(100),
            tcp_keepalive: true,
            tcp_keepalive_interval: Duration::from_secs(30),
        }
    }

    /// Set connection timeout
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set write timeout
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set retry attempts
    #[must_use]
    pub fn with_retry_attempts(mut self, attempts: usize) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Set retry interval
    #[must_use]
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Enable or disable TCP keep-alive
    #[must_use]
    pub fn with_tcp_keepalive(mut self, enabled: bool) -> Self {
        self.tcp_keepalive = enabled;
        self
    }
}

/// Metrics for a forwarder
#[derive(Debug, Default)]
pub struct ForwarderMetrics {
    /// Messages delivered
    pub messages_sent: AtomicU64,

    /// Bytes delivered
    pub bytes_sent: AtomicU64,

    /// Individual failed attempts
    pub send_failures: AtomicU64,

    /// Messages dropped after the last attempt failed
    pub messages_failed: AtomicU64,

    /// Successful connects (first connect included)
    pub reconnect_count: AtomicU64,
}

impl ForwarderMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            messages_sent: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            send_failures: AtomicU64::new(0),
            messages_failed: AtomicU64::new(0),
            reconnect_count: AtomicU64::new(0),
        }
    }

    /// Record a delivered message
    #[inline]
    pub fn record_sent(&self, byte_count: u64) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a failed attempt
    #[inline]
    pub fn record_attempt_failed(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a message given up on
    #[inline]
    pub fn record_failed(&self) {
        self.messages_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a connection established
    #[inline]
    pub fn record_reconnect(&self) {
        self.reconnect_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of metrics
    pub fn snapshot(&self) -> ForwarderMetricsSnapshot {
        ForwarderMetricsSnapshot {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            messages_failed: self.messages_failed.load(Ordering::Relaxed),
            reconnect_count: self.reconnect_count.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of forwarder metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwarderMetricsSnapshot {
    pub messages_sent: u64,
    pub bytes_sent: u64,
    pub send_failures: u64,
    pub messages_failed: u64,
    pub reconnect_count: u64,
}

/// Errors from the forwarder
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    /// Connection failed
    #[error("connection failed to {target}: {source}")]
    ConnectionFailed {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// Write failed
    #[error("write failed: {0}")]
    WriteFailed(#[from] std::io::Error),

    /// All retry attempts exhausted
    #[error("all {attempts} send attempts failed: {last_error}")]
    RetriesExhausted { attempts: usize, last_error: String },

    /// Timeout
    #[error("operation timed out")]
    Timeout,
}

/// Delivers frames to one downstream with bounded retry
pub struct Forwarder {
    /// Outbound link
    downstream: Box<dyn Downstream>,

    /// Total attempts per frame
    retry_attempts: usize,

    /// Pause between attempts
    retry_interval: Duration,

    /// Shared with the link so reconnects are counted
    metrics: Arc<ForwarderMetrics>,
}

impl Forwarder {
    /// Create a forwarder over a lazily connected TCP link
    pub fn new(config: ForwarderConfig) -> Self {
        let metrics = Arc::new(ForwarderMetrics::new());
        let retry_attempts = config.retry_attempts;
        let retry_interval = config.retry_interval;
        let downstream = TcpDownstream::new(config, Arc::clone(&metrics));

        Self {
            downstream: Box::new(downstream),
            retry_attempts,
            retry_interval,
            metrics,
        }
    }

    /// Create a forwarder over any link
    pub fn with_downstream(
        downstream: impl Downstream + 'static,
        retry_attempts: usize,
        retry_interval: Duration,
    ) -> Self {
        Self {
            downstream: Box::new(downstream),
            retry_attempts,
            retry_interval,
            metrics: Arc::new(ForwarderMetrics::new()),
        }
    }

    /// Downstream address for logging
    pub fn target(&self) -> &str {
        self.downstream.target()
    }

    /// Get reference to metrics
    pub fn metrics(&self) -> &Arc<ForwarderMetrics> {
        &self.metrics
    }

    /// Send one frame, retrying up to the configured attempt count
    ///
    /// # Errors
    /// `ForwarderError::RetriesExhausted` carrying the last attempt's error
    pub async fn send_with_retry(&self, frame: &[u8]) -> Result<(), ForwarderError> {
        let attempts = self.retry_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(self.retry_interval).await;
            }

            match self.downstream.send(frame).await {
                Ok(()) => {
                    self.metrics.record_sent(frame.len() as u64);
                    return Ok(());
                }
                Err(e) => {
                    self.metrics.record_attempt_failed();
                    tracing::debug!(
                        target = %self.downstream.target(),
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        error = %e,
                        "send attempt failed"
                    );
                    last_error = e.to_string();
                }
            }
        }

        self.metrics.record_failed();
        Err(ForwarderError::RetriesExhausted {
            attempts,
            last_error,
        })
    }

    /// Close the link (the next send reconnects)
    pub async fn close(&self) {
        self.downstream.close().await;
    }
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("target", &self.downstream.target())
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_interval", &self.retry_interval)
            .finish()
    }
}
