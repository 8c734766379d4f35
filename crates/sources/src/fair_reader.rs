//! Fair Reader
//!
//! Round-robin selection over the pending-data registry. Each call takes a
//! fresh snapshot of the pending connections and starts scanning just past
//! the connection that produced messages last time, so one chatty client
//! cannot monopolize the reader.
//!
//! Fairness is best-effort: connections accepted or pruned between calls
//! shift positions in the next snapshot, which can skip or revisit a
//! connection once.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::metrics::ListenerMetrics;
use crate::registry::ConnectionRegistry;

#[cfg(test)]
#[path = "fair_reader_test.rs"]
mod tests;

/// Round-robin reader over pending connections
#[derive(Debug)]
pub struct FairReader {
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<ListenerMetrics>,

    /// Snapshot position of the last connection that yielded messages
    last_index: Mutex<Option<usize>>,
}

impl FairReader {
    /// Create a reader with the cursor before the first position
    pub fn new(registry: Arc<ConnectionRegistry>, metrics: Arc<ListenerMetrics>) -> Self {
        Self {
            registry,
            metrics,
            last_index: Mutex::new(None),
        }
    }

    /// Messages from the next connection that has any
    ///
    /// Scans at most once around the snapshot. Chunks that only extend a
    /// message in progress are consumed without ending the scan. Returns
    /// `None` when no connection produced a complete message.
    pub fn read_one(&self) -> Option<Vec<String>> {
        let connections = self.registry.pending_snapshot();
        if connections.is_empty() {
            return None;
        }

        let len = connections.len();
        let mut last_index = self.last_index.lock();
        let start = last_index.map_or(0, |last| (last + 1) % len);

        for index in (start..len).chain(0..start) {
            match self.registry.drain(&connections[index]) {
                Some(messages) if !messages.is_empty() => {
                    *last_index = Some(index);
                    self.metrics.messages_decoded(&messages);
                    return Some(messages);
                }
                _ => {}
            }
        }

        None
    }

    /// Registry this reader drains
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }
}
