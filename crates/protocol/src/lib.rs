//! sysrelay Protocol - framing and syslog primitives
//!
//! This crate provides the types shared by the inbound and outbound side
//! of the relay:
//! - `FrameDecoder` - Stateful reassembly of NUL-delimited messages from raw chunks
//! - `encode_frame` - ASCII encoding plus NUL terminator for forwarding
//! - `ConnectionId` - Identity of an accepted connection
//! - `Priority` / `Severity` - Leading `<PRI>` parsing
//!
//! # Wire Format
//!
//! ```text
//! <34>Oct 11 22:14:15 host app: message one\0<13>message two\0
//! ```
//!
//! Every message is terminated by a single `0x00` byte. Text is ASCII;
//! bytes outside the ASCII range are replaced with `?` on decode.

mod connection_id;
mod error;
mod framing;
mod syslog;

pub use connection_id::ConnectionId;
pub use error::ProtocolError;
pub use framing::{FrameDecoder, MARKER, NUL, ascii_decode, encode_frame};
pub use syslog::{Priority, Severity};

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Maximum syslog PRI value (facility 23, severity 7)
pub const MAX_PRIORITY: u8 = 191;

// Test modules - only compiled during testing
#[cfg(test)]
mod error_test;
