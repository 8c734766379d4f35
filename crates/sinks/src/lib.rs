//! sysrelay - Sinks
//!
//! The outbound half of the relay. Each worker owns one `Forwarder`, which
//! writes NUL-framed messages to the configured downstream over a lazily
//! (re)connected TCP link.
//!
//! ```text
//! [Worker] --frame--> [Forwarder] --retry--> [Downstream] --TCP--> [host:port]
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sysrelay_sinks::forwarder::{Forwarder, ForwarderConfig};
//!
//! let forwarder = Forwarder::new(ForwarderConfig::new("127.0.0.1:5141"));
//!
//! // Connects on first use, reconnects transparently after a drop
//! forwarder.send_with_retry(b"<13>hello\0").await?;
//! ```

/// Forwarder - lazily connected TCP downstream with bounded retry
pub mod forwarder;

pub use forwarder::{
    Downstream, Forwarder, ForwarderConfig, ForwarderError, ForwarderMetrics,
    ForwarderMetricsSnapshot, TcpDownstream,
};
