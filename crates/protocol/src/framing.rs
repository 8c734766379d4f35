//! NUL-delimited message framing
//!
//! Messages arrive as arbitrary TCP chunks. `FrameDecoder` keeps the bytes
//! of the message in progress between calls, so a message split across
//! segments reassembles no matter where the chunk boundaries fall.
//!
//! # Rules
//!
//! For each byte of a chunk:
//! 1. `0x00` completes the accumulated message (if any) and is discarded
//! 2. With marker splitting enabled, `<` completes the accumulated message
//!    and then starts the next one
//! 3. Anything else is appended to the accumulator
//!
//! A trailing fragment without terminator is kept for the next chunk and
//! never emitted on its own.

use bytes::{BufMut, Bytes, BytesMut};

/// Message terminator
pub const NUL: u8 = 0x00;

/// Syslog header start, used by the marker-split heuristic
pub const MARKER: u8 = b'<';

/// Initial accumulator capacity (typical syslog line)
const INITIAL_CAPACITY: usize = 1024;

/// Stateful decoder for one inbound byte stream
#[derive(Debug)]
pub struct FrameDecoder {
    /// Split on a leading `<` even without a NUL terminator
    split_on_marker: bool,

    /// Bytes of the message in progress
    current: BytesMut,
}

impl FrameDecoder {
    /// Create a decoder using NUL framing only
    pub fn new() -> Self {
        Self::with_marker_split(false)
    }

    /// Create a decoder, optionally enabling the `<` heuristic
    pub fn with_marker_split(split_on_marker: bool) -> Self {
        Self {
            split_on_marker,
            current: BytesMut::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Whether the `<` heuristic is enabled
    #[inline]
    pub fn split_on_marker(&self) -> bool {
        self.split_on_marker
    }

    /// Number of bytes held for an unterminated message
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.current.len()
    }

    /// Decode one chunk, returning every message it completes
    ///
    /// Messages are returned in the order they complete. Unterminated
    /// bytes stay in the decoder.
    pub fn decode(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut messages = Vec::new();

        for &byte in chunk {
            if byte == NUL {
                self.complete(&mut messages);
                continue;
            }

            if self.split_on_marker && byte == MARKER {
                self.complete(&mut messages);
            }

            self.current.put_u8(byte);
        }

        messages
    }

    /// Move the accumulator into `out` if it holds anything
    #[inline]
    fn complete(&mut self, out: &mut Vec<String>) {
        if !self.current.is_empty() {
            out.push(ascii_decode(&self.current));
            self.current.clear();
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode bytes as ASCII, replacing anything above 0x7F with `?`
pub fn ascii_decode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}

/// Encode a message for the wire
///
/// Non-ASCII characters become `?`. A NUL terminator is appended unless
/// the text already ends with one.
pub fn encode_frame(text: &str) -> Bytes {
    let mut buf = BytesMut::with_capacity(text.len() + 1);
    for c in text.chars() {
        buf.put_u8(if c.is_ascii() { c as u8 } else { b'?' });
    }
    if buf.last() != Some(&NUL) {
        buf.put_u8(NUL);
    }
    buf.freeze()
}
