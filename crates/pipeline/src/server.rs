//! Relay Server
//!
//! Lifecycle owner that wires the pipeline together:
//!
//! ```text
//! Listener ──▶ ConnectionRegistry ──▶ FairReader ──▶ read loop
//!                                                      │ inbound queue
//!                                                      ▼
//!                                   Worker[i] ◀── Dispatcher
//!                                      │
//!                                      ▼
//!                                  downstream
//! ```
//!
//! The registry, fair reader, error sink and counters live as long as the
//! server, so connection data that was pending at `stop()` is picked up
//! again after the next `start()`. Everything else (listening socket,
//! queues, workers, outbound links) is created by `start()` and torn
//! down by `stop()`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sysrelay_config::{Config, DownstreamConfig};
use sysrelay_sinks::{Forwarder, ForwarderConfig, ForwarderMetrics};
use sysrelay_sources::{ConnectionRegistry, FairReader, Listener, ListenerMetrics};
use sysrelay_transform::{Transformer, TransformerRegistry, create_default_registry};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::dispatcher::{Dispatcher, run_read_loop};
use crate::error::{Result, ServerError};
use crate::error_sink::ErrorSink;
use crate::metrics::{PipelineMetrics, ServerMetrics, WorkerMetricsSnapshot};
use crate::queue::work_queue;
use crate::worker::Worker;

#[cfg(test)]
#[path = "server_test.rs"]
mod tests;

/// Whether the server is accepting connections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Running,
}

/// Handles kept for each spawned worker
#[derive(Debug)]
struct WorkerHandle {
    index: usize,
    depth: Arc<AtomicUsize>,
    forwarder: Arc<ForwarderMetrics>,
}

/// Resources that exist only while running
#[derive(Debug)]
struct Running {
    cancel: CancellationToken,
    local_addr: SocketAddr,
    tasks: Vec<JoinHandle<()>>,
    workers: Vec<WorkerHandle>,
}

/// Syslog relay server
pub struct RelayServer {
    config: Config,
    transformers: TransformerRegistry,
    registry: Arc<ConnectionRegistry>,
    reader: Arc<FairReader>,
    listener_metrics: Arc<ListenerMetrics>,
    pipeline_metrics: Arc<PipelineMetrics>,
    errors: Arc<ErrorSink>,
    running: Option<Running>,
}

impl RelayServer {
    /// Create a stopped server with the built-in transformer kinds
    pub fn new(config: Config) -> Self {
        Self::with_registry(config, create_default_registry())
    }

    /// Create a stopped server resolving worker kinds through `transformers`
    pub fn with_registry(config: Config, transformers: TransformerRegistry) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let listener_metrics = Arc::new(ListenerMetrics::new());
        let reader = Arc::new(FairReader::new(
            Arc::clone(&registry),
            Arc::clone(&listener_metrics),
        ));

        Self {
            config,
            transformers,
            registry,
            reader,
            listener_metrics,
            pipeline_metrics: Arc::new(PipelineMetrics::new()),
            errors: Arc::new(ErrorSink::new()),
            running: None,
        }
    }

    /// Bind, start accepting and spawn the pipeline
    ///
    /// Transformers are built before the socket is bound, so a bad pattern
    /// never leaves a half-started server behind. Must be called inside a
    /// tokio runtime.
    ///
    /// # Errors
    ///
    /// - configuration errors (`ServerError::is_config`): invalid ports,
    ///   worker count, worker kind, pattern or bind address
    /// - resource errors (`ServerError::is_resource`): socket creation or
    ///   bind failure
    /// - `AlreadyRunning`
    pub fn start(&mut self) -> Result<SocketAddr> {
        if self.running.is_some() {
            return Err(ServerError::AlreadyRunning);
        }

        self.config.validate()?;
        let transformers = self.build_transformers()?;

        let listener = Listener::bind(
            listener_config(&self.config),
            Arc::clone(&self.registry),
            Arc::clone(&self.listener_metrics),
        )?;
        let local_addr = listener.local_addr();

        let cancel = CancellationToken::new();
        let mut tasks = Vec::with_capacity(transformers.len() + 3);
        let mut senders = Vec::with_capacity(transformers.len());
        let mut workers = Vec::with_capacity(transformers.len());

        for (index, transformer) in transformers.into_iter().enumerate() {
            let (tx, rx) = work_queue();
            let forwarder = Forwarder::new(forwarder_config(&self.config.downstream));

            workers.push(WorkerHandle {
                index,
                depth: tx.depth_gauge(),
                forwarder: Arc::clone(forwarder.metrics()),
            });
            senders.push(tx);

            let worker = Worker::new(
                index,
                transformer,
                forwarder,
                Arc::clone(&self.errors),
                Arc::clone(&self.pipeline_metrics),
            );
            tasks.push(tokio::spawn(worker.run(rx, cancel.child_token())));
        }

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(senders, Arc::clone(&self.pipeline_metrics));
        tasks.push(tokio::spawn(dispatcher.run(inbound_rx, cancel.child_token())));

        tasks.push(tokio::spawn(run_read_loop(
            Arc::clone(&self.reader),
            inbound_tx,
            self.config.workers.poll_interval,
            Arc::clone(&self.pipeline_metrics),
            cancel.child_token(),
        )));

        tasks.push(tokio::spawn(listener.run(cancel.child_token())));

        tracing::info!(
            address = %local_addr,
            downstream = %self.config.downstream.target(),
            workers = workers.len(),
            kind = %self.config.workers.kind,
            "relay server started"
        );

        self.running = Some(Running {
            cancel,
            local_addr,
            tasks,
            workers,
        });
        Ok(local_addr)
    }

    /// Stop accepting, disconnect every client and stop the pipeline
    ///
    /// Waits for every task to finish. Messages still queued for workers
    /// are discarded; undrained connection data stays pending. No-op when
    /// already stopped.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        tracing::info!(address = %running.local_addr, "stopping relay server");
        running.cancel.cancel();

        for task in running.tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "relay task failed");
            }
        }

        tracing::info!(
            address = %running.local_addr,
            pending_connections = self.registry.pending_count(),
            "relay server stopped"
        );
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServerState {
        if self.running.is_some() {
            ServerState::Running
        } else {
            ServerState::Stopped
        }
    }

    /// Whether the server is running
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Bound listen address while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }

    /// Server configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accepted connections
    pub fn connections(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Point-in-time copy of buffered errors
    pub fn errors(&self) -> Vec<String> {
        self.errors.snapshot()
    }

    /// Discard buffered errors
    pub fn clear_errors(&self) {
        self.errors.clear();
    }

    /// Shared error sink
    pub fn error_sink(&self) -> &Arc<ErrorSink> {
        &self.errors
    }

    /// Drain every pending connection in one unfair pass
    ///
    /// Intended for a stopped server; while running it competes with the
    /// fair-read loop for the same chunks.
    pub fn flush_pending(&self) -> Vec<String> {
        let messages = self.registry.drain_all();
        self.listener_metrics.messages_decoded(&messages);
        messages
    }

    /// Combined counters
    pub fn metrics(&self) -> ServerMetrics {
        let workers = self
            .running
            .as_ref()
            .map(|running| {
                running
                    .workers
                    .iter()
                    .map(|w| WorkerMetricsSnapshot {
                        index: w.index,
                        queue_depth: w.depth.load(Ordering::Relaxed),
                        forwarder: w.forwarder.snapshot(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        ServerMetrics {
            listener: self.listener_metrics.snapshot(),
            pipeline: self.pipeline_metrics.snapshot(),
            workers,
        }
    }

    /// One transformer per worker, all from the same kind and parameters
    fn build_transformers(&self) -> Result<Vec<Box<dyn Transformer>>> {
        let kind = self.config.workers.kind.as_str();
        let params = &self.config.workers.params;

        (0..self.config.workers.count)
            .map(|_| self.transformers.create(kind, params).map_err(ServerError::from))
            .collect()
    }
}

impl Drop for RelayServer {
    fn drop(&mut self) {
        // Tasks stop on their own once cancelled; nothing to await here
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for RelayServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayServer")
            .field("state", &self.state())
            .field("local_addr", &self.local_addr())
            .field("live_connections", &self.registry.live_count())
            .field("pending_connections", &self.registry.pending_count())
            .finish()
    }
}

// =============================================================================
// Config conversion
// =============================================================================

fn listener_config(config: &Config) -> sysrelay_sources::ListenerConfig {
    let listener = &config.listener;
    sysrelay_sources::ListenerConfig {
        address: listener.address.clone(),
        port: listener.port,
        buffer_size: listener.buffer_size,
        backlog: listener.backlog,
        split_on_marker: listener.split_on_marker,
        nodelay: listener.nodelay,
    }
}

fn forwarder_config(downstream: &DownstreamConfig) -> ForwarderConfig {
    ForwarderConfig::new(downstream.target())
        .with_retry_attempts(downstream.retry_attempts)
        .with_retry_interval(downstream.retry_interval)
        .with_connect_timeout(downstream.connect_timeout)
        .with_write_timeout(downstream.write_timeout)
}
