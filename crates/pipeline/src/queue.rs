//! Worker queues
//!
//! Each worker owns an unbounded FIFO. The dispatcher holds the sending
//! side; the depth gauge lets the server report per-worker backlog, which
//! is the only backpressure signal for a slow downstream.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;

/// Create a connected queue pair
pub fn work_queue() -> (WorkSender, WorkReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let depth = Arc::new(AtomicUsize::new(0));
    (
        WorkSender {
            tx,
            depth: Arc::clone(&depth),
        },
        WorkReceiver { rx, depth },
    )
}

/// Producer side of a worker queue
#[derive(Debug, Clone)]
pub struct WorkSender {
    tx: mpsc::UnboundedSender<String>,
    depth: Arc<AtomicUsize>,
}

impl WorkSender {
    /// Enqueue a message; gives it back if the worker is gone
    pub fn send(&self, message: String) -> Result<(), String> {
        self.depth.fetch_add(1, Ordering::Relaxed);
        self.tx.send(message).map_err(|e| {
            self.depth.fetch_sub(1, Ordering::Relaxed);
            e.0
        })
    }

    /// Messages waiting
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }

    /// Shared depth gauge
    pub fn depth_gauge(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.depth)
    }
}

/// Consumer side of a worker queue
#[derive(Debug)]
pub struct WorkReceiver {
    rx: mpsc::UnboundedReceiver<String>,
    depth: Arc<AtomicUsize>,
}

impl WorkReceiver {
    /// Wait for the next message; `None` once every sender is dropped
    pub async fn recv(&mut self) -> Option<String> {
        let message = self.rx.recv().await?;
        self.depth.fetch_sub(1, Ordering::Relaxed);
        Some(message)
    }

    /// Close the queue and drop whatever is left, returning the count
    pub fn discard_remaining(&mut self) -> usize {
        self.rx.close();
        let mut discarded = 0;
        while self.rx.try_recv().is_ok() {
            self.depth.fetch_sub(1, Ordering::Relaxed);
            discarded += 1;
        }
        discarded
    }

    /// Messages waiting
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }
}
