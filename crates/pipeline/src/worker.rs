//! Worker
//!
//! Pulls messages from its private queue, transforms each one and
//! forwards the result downstream:
//!
//! ```text
//! queue ──▶ transform ──▶ encode_frame (ASCII + NUL) ──▶ send_with_retry
//!               │                                            │
//!               └── error: report + drop        exhausted: report + drop
//! ```
//!
//! Transform errors are never retried. Delivery is at-most-once.

use std::sync::Arc;

use sysrelay_protocol::encode_frame;
use sysrelay_sinks::Forwarder;
use sysrelay_transform::Transformer;
use tokio_util::sync::CancellationToken;

use crate::error_sink::ErrorSink;
use crate::metrics::PipelineMetrics;
use crate::queue::WorkReceiver;

#[cfg(test)]
#[path = "worker_test.rs"]
mod tests;

/// What happened to one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Delivered downstream
    Forwarded,
    /// Input or transformed text was empty; nothing sent
    Skipped,
    /// Transform failed; reported and dropped
    TransformFailed,
    /// Every send attempt failed; reported and dropped
    DeliveryFailed,
}

/// Transform-and-forward unit with one downstream link
pub struct Worker {
    index: usize,
    transformer: Box<dyn Transformer>,
    forwarder: Forwarder,
    errors: Arc<ErrorSink>,
    metrics: Arc<PipelineMetrics>,
}

impl Worker {
    /// Create a worker
    pub fn new(
        index: usize,
        transformer: Box<dyn Transformer>,
        forwarder: Forwarder,
        errors: Arc<ErrorSink>,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            index,
            transformer,
            forwarder,
            errors,
            metrics,
        }
    }

    /// Position in the pool
    pub fn index(&self) -> usize {
        self.index
    }

    /// Outbound link
    pub fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }

    /// Handle one message end to end
    pub async fn process(&self, message: &str) -> Outcome {
        if message.is_empty() {
            return Outcome::Skipped;
        }

        let transformed = match self.transformer.transform(message) {
            Ok(text) => text,
            Err(e) => {
                self.metrics.record_transform_failure();
                self.errors
                    .report(format!("Error converting message {} : {}", message, e));
                return Outcome::TransformFailed;
            }
        };

        if transformed.is_empty() {
            self.metrics.record_skipped();
            tracing::debug!(worker = self.index, "transform produced empty text, not forwarded");
            return Outcome::Skipped;
        }

        let frame = encode_frame(&transformed);
        match self.forwarder.send_with_retry(&frame).await {
            Ok(()) => {
                self.metrics.record_forwarded();
                tracing::trace!(worker = self.index, bytes = frame.len(), "message forwarded");
                Outcome::Forwarded
            }
            Err(e) => {
                self.metrics.record_delivery_failure();
                self.errors.report(format!(
                    "Error sending message {} to destination : {}",
                    message, e
                ));
                Outcome::DeliveryFailed
            }
        }
    }

    /// Process queued messages until cancelled or the queue closes
    ///
    /// Messages still queued at cancellation are discarded and counted.
    pub async fn run(self, mut queue: WorkReceiver, cancel: CancellationToken) {
        tracing::info!(
            worker = self.index,
            transformer = self.transformer.name(),
            target = %self.forwarder.target(),
            "worker started"
        );

        loop {
            let message = tokio::select! {
                biased;

                _ = cancel.cancelled() => break,
                message = queue.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
            };

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    self.metrics.record_discarded(1);
                    break;
                }
                _ = self.process(&message) => {}
            }
        }

        let discarded = queue.discard_remaining();
        if discarded > 0 {
            self.metrics.record_discarded(discarded as u64);
            tracing::warn!(worker = self.index, discarded, "worker stopped with queued messages");
        }

        self.forwarder.close().await;
        tracing::info!(worker = self.index, "worker stopped");
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("index", &self.index)
            .field("transformer", &self.transformer.name())
            .field("forwarder", &self.forwarder)
            .finish()
    }
}
