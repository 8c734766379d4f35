//! sysrelay - Pipeline
//!
//! Everything between the listener and the downstream socket, plus the
//! server that owns it all.
//!
//! # Architecture
//!
//! ```text
//! [Listener]              [Read loop]          [Dispatcher]           [Workers]
//!   conn 1 ──┐                                                   ┌──▶ queue ─▶ transform ─▶ downstream
//!   conn 2 ──┼──▶ Registry ──▶ FairReader ──▶ inbound ──▶ round-robin ─┼──▶ queue ─▶ transform ─▶ downstream
//!   conn N ──┘     (pending)    (poll/backoff)   queue               └──▶ queue ─▶ transform ─▶ downstream
//! ```
//!
//! # Key Design
//!
//! - **Fair**: one connection's backlog never starves the others
//! - **Round-robin dispatch**: no load awareness; a slow downstream only
//!   grows its own worker's queue
//! - **At-most-once**: bounded send retry, then report and drop
//! - **Observable failures**: steady-state errors go to the `ErrorSink`,
//!   only `start()` returns errors
//!
//! # Example
//!
//! ```no_run
//! use std::str::FromStr;
//! use sysrelay_config::Config;
//! use sysrelay_pipeline::RelayServer;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_str("[downstream]\nport = 5141")?;
//! let mut server = RelayServer::new(config);
//! let addr = server.start()?;
//! println!("listening on {}", addr);
//!
//! // ... later
//! for error in server.errors() {
//!     eprintln!("{}", error);
//! }
//! server.stop().await;
//! # Ok(())
//! # }
//! ```

mod dispatcher;
mod error;
mod error_sink;
mod metrics;
mod queue;
mod server;
mod worker;

pub use dispatcher::{Dispatcher, run_read_loop};
pub use error::{Result, ServerError};
pub use error_sink::ErrorSink;
pub use metrics::{PipelineMetrics, PipelineMetricsSnapshot, ServerMetrics, WorkerMetricsSnapshot};
pub use queue::{WorkReceiver, WorkSender, work_queue};
pub use server::{RelayServer, ServerState};
pub use worker::{Outcome, Worker};
