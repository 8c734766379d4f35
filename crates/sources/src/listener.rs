//! Listener / Accept Loop
//!
//! Owns the bound listening socket. Every accepted client becomes a
//! `FramedConnection` in the registry plus one receive task that copies
//! each successful read into a `Bytes` chunk.
//!
//! # Accept Behavior
//!
//! The receive task is spawned as soon as a connection is registered, so
//! the loop goes straight back to `accept()`. Socket tuning happens inside
//! the task. An accept error is logged and counted and the next accept is
//! issued anyway; one bad client never stops the listener.
//!
//! # Shutdown
//!
//! Cancelling the token passed to `run()` closes the listening socket,
//! disconnects every live connection and waits for all receive tasks.
//! Chunks already queued stay in the registry.

use std::io;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use socket2::{SockRef, TcpKeepalive};
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::connection::FramedConnection;
use crate::metrics::ListenerMetrics;
use crate::registry::ConnectionRegistry;

#[cfg(test)]
#[path = "listener_test.rs"]
mod tests;

// =============================================================================
// Constants
// =============================================================================

/// Default listen port
const DEFAULT_PORT: u16 = 5140;

/// Default per-connection read buffer (1MB)
const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Default listen backlog
const DEFAULT_BACKLOG: u32 = 65535;

/// Keepalive idle time for accepted sockets
const KEEPALIVE_TIME: Duration = Duration::from_secs(60);

// =============================================================================
// Configuration
// =============================================================================

/// Listener configuration
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Bind address (IPv4 or IPv6 literal)
    pub address: String,

    /// Listen port (0 = ephemeral)
    pub port: u16,

    /// Fixed read buffer per connection
    pub buffer_size: usize,

    /// Listen backlog
    pub backlog: u32,

    /// Split messages on a leading `<` as well as NUL
    pub split_on_marker: bool,

    /// TCP_NODELAY on accepted sockets
    pub nodelay: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            buffer_size: DEFAULT_BUFFER_SIZE,
            backlog: DEFAULT_BACKLOG,
            split_on_marker: false,
            nodelay: true,
        }
    }
}

impl ListenerConfig {
    /// Resolve the bind address
    pub fn socket_addr(&self) -> Result<SocketAddr, ListenerError> {
        let ip: IpAddr = self
            .address
            .parse()
            .map_err(|source| ListenerError::InvalidAddress {
                address: self.address.clone(),
                source,
            })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Listener errors
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Bind address is not an IP literal
    #[error("invalid listen address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    /// Listening socket could not be created or configured
    #[error("failed to create listening socket: {0}")]
    Socket(#[source] io::Error),

    /// Bind or listen failed
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },
}

impl ListenerError {
    /// Whether the error comes from configuration rather than the OS
    pub fn is_config(&self) -> bool {
        matches!(self, Self::InvalidAddress { .. })
    }
}

// =============================================================================
// Listener
// =============================================================================

/// Bound TCP listener feeding a `ConnectionRegistry`
pub struct Listener {
    config: ListenerConfig,
    listener: TcpListener,
    local_addr: SocketAddr,
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<ListenerMetrics>,
    tracker: TaskTracker,
}

impl Listener {
    /// Create, bind and listen
    ///
    /// Must be called inside a tokio runtime.
    pub fn bind(
        config: ListenerConfig,
        registry: Arc<ConnectionRegistry>,
        metrics: Arc<ListenerMetrics>,
    ) -> Result<Self, ListenerError> {
        let addr = config.socket_addr()?;

        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4(),
            SocketAddr::V6(_) => TcpSocket::new_v6(),
        }
        .map_err(ListenerError::Socket)?;

        #[cfg(unix)]
        socket.set_reuseaddr(true).map_err(ListenerError::Socket)?;

        let bind_err = |source| ListenerError::Bind {
            address: addr,
            source,
        };
        socket.bind(addr).map_err(bind_err)?;
        let listener = socket.listen(config.backlog).map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;

        tracing::info!(
            address = %local_addr,
            backlog = config.backlog,
            split_on_marker = config.split_on_marker,
            "listener bound"
        );

        Ok(Self {
            config,
            listener,
            local_addr,
            registry,
            metrics,
            tracker: TaskTracker::new(),
        })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept until `cancel` fires, then tear down every connection
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(address = %self.local_addr, "accepting connections");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => self.spawn_connection(stream, peer_addr, &cancel),
                        Err(e) => {
                            self.metrics.accept_error();
                            tracing::warn!(error = %e, "accept error");
                        }
                    }
                }
            }
        }

        let Self {
            listener,
            local_addr,
            registry,
            tracker,
            ..
        } = self;

        // Close the listening socket before draining connections
        drop(listener);

        tracker.close();
        let closed = registry.disconnect_all();
        tracker.wait().await;

        tracing::info!(address = %local_addr, connections_closed = closed, "listener stopped");
    }

    /// Register an accepted socket and start its receive task
    fn spawn_connection(&self, stream: TcpStream, peer_addr: SocketAddr, cancel: &CancellationToken) {
        self.metrics.connection_opened();

        let connection = Arc::new(FramedConnection::new(
            peer_addr,
            self.config.split_on_marker,
            cancel.child_token(),
        ));
        self.registry.register(Arc::clone(&connection));

        tracing::debug!(
            connection_id = %connection.id(),
            peer = %peer_addr,
            "connection accepted"
        );

        let handler = ConnectionHandler {
            connection,
            registry: Arc::clone(&self.registry),
            metrics: Arc::clone(&self.metrics),
            buffer_size: self.config.buffer_size,
            nodelay: self.config.nodelay,
        };
        self.tracker.spawn(handler.run(stream));
    }
}

// =============================================================================
// Connection Handler
// =============================================================================

/// Receive task for a single connection
struct ConnectionHandler {
    connection: Arc<FramedConnection>,
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<ListenerMetrics>,
    buffer_size: usize,
    nodelay: bool,
}

impl ConnectionHandler {
    async fn run(self, mut stream: TcpStream) {
        configure_socket(&stream, self.nodelay, self.buffer_size);

        let id = self.connection.id();
        let peer = self.connection.peer_addr();
        let close = self.connection.close_token().clone();
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            tokio::select! {
                biased;

                _ = close.cancelled() => break,
                read_result = stream.read(&mut buffer) => {
                    match read_result {
                        Ok(0) => {
                            tracing::debug!(connection_id = %id, peer = %peer, "connection closed by peer");
                            break;
                        }
                        Ok(n) => {
                            self.metrics.chunk_received(n);
                            self.connection.append(Bytes::copy_from_slice(&buffer[..n]));
                        }
                        Err(e) => {
                            if !is_connection_reset(&e) {
                                self.metrics.read_error();
                            }
                            tracing::debug!(connection_id = %id, peer = %peer, error = %e, "read error");
                            break;
                        }
                    }
                }
            }
        }

        self.registry.disconnect(id);
        self.metrics.connection_closed();
    }
}

/// Apply per-connection socket options (failures are non-fatal)
fn configure_socket(stream: &TcpStream, nodelay: bool, buffer_size: usize) {
    let socket = SockRef::from(stream);

    if nodelay && let Err(e) = socket.set_tcp_nodelay(true) {
        tracing::warn!(error = %e, "failed to set TCP_NODELAY");
    }

    if let Err(e) = socket.set_recv_buffer_size(buffer_size) {
        tracing::debug!(error = %e, "failed to set SO_RCVBUF");
    }

    let keepalive = TcpKeepalive::new().with_time(KEEPALIVE_TIME);
    if let Err(e) = socket.set_tcp_keepalive(&keepalive) {
        tracing::debug!(error = %e, "failed to set TCP keepalive");
    }
}

/// Check if error is a connection reset (expected when clients disconnect)
fn is_connection_reset(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted | io::ErrorKind::BrokenPipe
    )
}
