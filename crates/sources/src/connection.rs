//! Framed Connection
//!
//! One accepted client socket, seen from the relay's side. The receive
//! task appends raw chunks; the fair reader drains them one at a time
//! through the connection's `FrameDecoder`.
//!
//! The decoder accumulator survives across chunks, so a message split
//! over several TCP segments is emitted once its terminator arrives. An
//! unterminated tail is dropped with the connection.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;
use sysrelay_protocol::{ConnectionId, FrameDecoder};
use tokio_util::sync::CancellationToken;

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;

/// An accepted inbound connection with its unparsed input
#[derive(Debug)]
pub struct FramedConnection {
    /// Unique identity (accept order)
    id: ConnectionId,

    /// Remote address
    peer_addr: SocketAddr,

    /// Raw chunks not yet handed to the decoder
    chunks: Mutex<VecDeque<Bytes>>,

    /// Framing state carried between drains
    decoder: Mutex<FrameDecoder>,

    /// Set once the socket is gone; never cleared
    disconnected: AtomicBool,

    /// Cancelling this closes the socket (ends the receive task)
    close: CancellationToken,
}

impl FramedConnection {
    /// Create a connection with a fresh id
    ///
    /// `close` is observed by the receive task; `disconnect()` cancels it.
    pub fn new(peer_addr: SocketAddr, split_on_marker: bool, close: CancellationToken) -> Self {
        Self {
            id: ConnectionId::next(),
            peer_addr,
            chunks: Mutex::new(VecDeque::new()),
            decoder: Mutex::new(FrameDecoder::with_marker_split(split_on_marker)),
            disconnected: AtomicBool::new(false),
            close,
        }
    }

    /// Connection id
    #[inline]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Remote address
    #[inline]
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Token the receive task selects on
    pub fn close_token(&self) -> &CancellationToken {
        &self.close
    }

    /// Queue a raw chunk for later parsing
    ///
    /// Never parses and never waits on the decoder.
    pub fn append(&self, chunk: Bytes) {
        self.chunks.lock().push_back(chunk);
    }

    /// Parse exactly one queued chunk
    ///
    /// Returns `None` when no chunk was queued, and `Some` (possibly empty)
    /// otherwise. An empty vector means the chunk only extended the
    /// message in progress.
    pub fn drain(&self) -> Option<Vec<String>> {
        // Hold the decoder across the pop so chunks are parsed in arrival
        // order even with concurrent drains.
        let mut decoder = self.decoder.lock();
        let chunk = self.chunks.lock().pop_front()?;
        Some(decoder.decode(&chunk))
    }

    /// Number of chunks waiting to be parsed
    pub fn queued_chunks(&self) -> usize {
        self.chunks.lock().len()
    }

    /// Whether unterminated bytes are being held
    pub fn has_partial(&self) -> bool {
        self.decoder.lock().pending_len() > 0
    }

    /// Mark disconnected and close the socket
    ///
    /// Idempotent. Returns `true` only for the call that performed the
    /// transition. Callers outside the registry go through
    /// `ConnectionRegistry::disconnect`, which also drops the live entry.
    pub(crate) fn disconnect(&self) -> bool {
        let first = !self.disconnected.swap(true, Ordering::AcqRel);
        self.close.cancel();
        first
    }

    /// Whether the socket is gone
    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
    }

    /// Disconnected with nothing left to parse
    ///
    /// Such a connection can leave the pending-data registry.
    pub fn is_exhausted(&self) -> bool {
        self.is_disconnected() && self.chunks.lock().is_empty()
    }
}
