//! Error Sink
//!
//! Operator-visible failures (dropped messages) collected as plain
//! strings. Reporting never blocks on anything but a short mutex and
//! never fails; entries leave only through `clear()`.

use parking_lot::Mutex;

/// Thread-safe, unbounded list of failure descriptions
#[derive(Debug, Default)]
pub struct ErrorSink {
    entries: Mutex<Vec<String>>,
}

impl ErrorSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a failure
    pub fn report(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(error = %message, "message dropped");
        self.entries.lock().push(message);
    }

    /// Point-in-time copy, oldest first
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Remove every entry
    pub fn clear(&self) {
        *self.entries.lock() = Vec::new();
    }

    /// Remove and return every entry in one step
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Number of buffered entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
