//! sysrelay - Sources
//!
//! The inbound half of the relay: accept TCP clients, collect the raw
//! chunks they send, and hand complete messages to the pipeline.
//!
//! # Data Flow
//!
//! ```text
//! socket ──read──▶ FramedConnection (chunk queue)
//!                        │
//!                 ConnectionRegistry (live + pending)
//!                        │
//!                   FairReader ──▶ Vec<String> per call
//! ```
//!
//! # Design Principles
//!
//! - **Event-driven reads**: One tokio task per connection, suspended in `read()`
//! - **Lazy parsing**: Receive tasks only queue `Bytes`; framing runs when
//!   the fair reader drains a connection
//! - **Round-robin fairness**: A busy client cannot starve quiet ones
//! - **Tolerant accept loop**: A failed accept is logged and counted, the
//!   next accept is issued regardless
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sysrelay_sources::{ConnectionRegistry, FairReader, Listener, ListenerConfig, ListenerMetrics};
//! use tokio_util::sync::CancellationToken;
//!
//! let registry = Arc::new(ConnectionRegistry::new());
//! let metrics = Arc::new(ListenerMetrics::new());
//! let listener = Listener::bind(ListenerConfig::default(), Arc::clone(&registry), Arc::clone(&metrics))?;
//!
//! let cancel = CancellationToken::new();
//! tokio::spawn(listener.run(cancel.clone()));
//!
//! let reader = FairReader::new(registry, metrics);
//! if let Some(messages) = reader.read_one() {
//!     println!("{:?}", messages);
//! }
//! ```

pub mod connection;
pub mod fair_reader;
pub mod listener;
mod metrics;
pub mod registry;

pub use connection::FramedConnection;
pub use fair_reader::FairReader;
pub use listener::{Listener, ListenerConfig, ListenerError};
pub use metrics::{ListenerMetrics, ListenerMetricsSnapshot};
pub use registry::ConnectionRegistry;
