//! Dispatcher
//!
//! Two loops connect the fair reader to the workers:
//!
//! ```text
//! FairReader ──read loop──▶ inbound queue ──dispatch loop──▶ worker[i % n]
//! ```
//!
//! The read loop polls: completed messages only exist after a drain, so
//! there is nothing to wait on. When a full scan finds nothing it sleeps
//! for `poll_interval`. The dispatch loop awaits the inbound channel
//! directly and hands each message to exactly one worker, round-robin,
//! without looking at queue depth.

use std::sync::Arc;
use std::time::Duration;

use sysrelay_sources::FairReader;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::metrics::PipelineMetrics;
use crate::queue::WorkSender;

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod tests;

/// Move messages from the fair reader onto the inbound queue until
/// cancelled
///
/// Empty messages are skipped.
pub async fn run_read_loop(
    reader: Arc<FairReader>,
    inbound: mpsc::UnboundedSender<String>,
    poll_interval: Duration,
    metrics: Arc<PipelineMetrics>,
    cancel: CancellationToken,
) {
    tracing::debug!(poll_interval = ?poll_interval, "read loop starting");

    while !cancel.is_cancelled() {
        let messages = match reader.read_one() {
            Some(messages) => messages,
            None => {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(poll_interval) => {}
                }
                continue;
            }
        };

        let mut pushed = 0u64;
        for message in messages {
            if message.is_empty() {
                continue;
            }
            if inbound.send(message).is_err() {
                tracing::debug!("inbound queue closed, read loop stopping");
                return;
            }
            pushed += 1;
        }
        metrics.record_read(pushed);

        // Draining is synchronous; give other tasks a turn between batches
        tokio::task::yield_now().await;
    }

    tracing::debug!("read loop stopped");
}

/// Round-robin distribution over worker queues
#[derive(Debug)]
pub struct Dispatcher {
    workers: Vec<WorkSender>,
    next: usize,
    metrics: Arc<PipelineMetrics>,
}

impl Dispatcher {
    /// Create a dispatcher over the given worker queues
    pub fn new(workers: Vec<WorkSender>, metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            workers,
            next: 0,
            metrics,
        }
    }

    /// Number of workers
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Hand one message to the next worker
    ///
    /// Returns the chosen worker index, or `None` if there are no workers
    /// or the chosen worker has shut down (the message is dropped).
    pub fn dispatch(&mut self, message: String) -> Option<usize> {
        if self.workers.is_empty() {
            return None;
        }

        let index = self.next % self.workers.len();
        self.next = self.next.wrapping_add(1);

        match self.workers[index].send(message) {
            Ok(()) => {
                self.metrics.record_dispatched();
                Some(index)
            }
            Err(_) => {
                tracing::debug!(worker = index, "worker queue closed, message dropped");
                None
            }
        }
    }

    /// Drain the inbound queue into the workers until cancelled
    ///
    /// Messages still inbound at cancellation are discarded and counted.
    pub async fn run(mut self, mut inbound: mpsc::UnboundedReceiver<String>, cancel: CancellationToken) {
        if self.workers.is_empty() {
            // Messages stay queued until a pool exists
            tracing::warn!("dispatcher has no workers, waiting for shutdown");
            cancel.cancelled().await;
            return;
        }

        tracing::debug!(workers = self.workers.len(), "dispatch loop starting");

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,
                message = inbound.recv() => match message {
                    Some(message) => {
                        self.dispatch(message);
                    }
                    None => break,
                },
            }
        }

        inbound.close();
        let mut discarded = 0u64;
        while inbound.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            self.metrics.record_discarded(discarded);
            tracing::warn!(discarded, "dispatch loop stopped with undispatched messages");
        }

        tracing::debug!("dispatch loop stopped");
    }
}
