//! Outbound link
//!
//! `Downstream` is the seam between the retry policy and the transport.
//! `TcpDownstream` keeps at most one `TcpStream`, created on first use and
//! replaced whenever it is found closed or a write fails.

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use socket2::{SockRef, TcpKeepalive};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;

use super::{ForwarderConfig, ForwarderError, ForwarderMetrics};

/// One attempt at delivering a frame
#[async_trait]
pub trait Downstream: Send + Sync {
    /// Write the whole frame or fail
    async fn send(&self, frame: &[u8]) -> Result<(), ForwarderError>;

    /// Drop the current connection, if any
    async fn close(&self);

    /// Address for logging
    fn target(&self) -> &str;
}

/// Lazily connected TCP downstream
pub struct TcpDownstream {
    config: ForwarderConfig,

    /// TCP connection (protected by mutex for reconnection)
    connection: Mutex<Option<TcpStream>>,

    metrics: Arc<ForwarderMetrics>,
}

impl TcpDownstream {
    /// Create a link; nothing is dialed yet
    pub fn new(config: ForwarderConfig, metrics: Arc<ForwarderMetrics>) -> Self {
        Self {
            config,
            connection: Mutex::new(None),
            metrics,
        }
    }

    /// Whether a connection is currently held
    pub async fn is_connected(&self) -> bool {
        self.connection.lock().await.is_some()
    }

    /// Dial the target
    async fn connect(&self) -> Result<TcpStream, ForwarderError> {
        let connect = TcpStream::connect(&self.config.target);

        let connect_result = if self.config.connect_timeout.is_zero() {
            connect.await
        } else {
            match timeout(self.config.connect_timeout, connect).await {
                Ok(result) => result,
                Err(_) => Err(std::io::Error::new(
                    ErrorKind::TimedOut,
                    "connection timed out",
                )),
            }
        };

        let stream = connect_result.map_err(|source| ForwarderError::ConnectionFailed {
            target: self.config.target.clone(),
            source,
        })?;

        // Set TCP_NODELAY for lower latency (non-fatal if it fails)
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(
                target = %self.config.target,
                error = %e,
                "failed to set TCP_NODELAY, continuing with default buffering"
            );
        }

        if self.config.tcp_keepalive {
            set_keepalive(&stream, self.config.tcp_keepalive_interval);
        }

        self.metrics.record_reconnect();
        tracing::debug!(target = %self.config.target, "connected to downstream");

        Ok(stream)
    }
}

#[async_trait]
impl Downstream for TcpDownstream {
    async fn send(&self, frame: &[u8]) -> Result<(), ForwarderError> {
        let mut conn = self.connection.lock().await;

        // A peer that closed its side is only noticed on read
        let mut stream = match conn.take() {
            Some(stream) if is_alive(&stream) => stream,
            Some(_) => {
                tracing::debug!(target = %self.config.target, "downstream closed, reconnecting");
                self.connect().await?
            }
            None => self.connect().await?,
        };

        let write = async {
            stream.write_all(frame).await?;
            stream.flush().await
        };

        let write_result = if self.config.write_timeout.is_zero() {
            Ok(write.await)
        } else {
            timeout(self.config.write_timeout, write).await
        };

        // On failure the stream is dropped, so the next send redials
        match write_result {
            Ok(Ok(())) => {
                *conn = Some(stream);
                Ok(())
            }
            Ok(Err(e)) => Err(ForwarderError::WriteFailed(e)),
            Err(_) => Err(ForwarderError::Timeout),
        }
    }

    async fn close(&self) {
        if self.connection.lock().await.take().is_some() {
            tracing::debug!(target = %self.config.target, "downstream connection closed");
        }
    }

    fn target(&self) -> &str {
        &self.config.target
    }
}

/// Non-blocking liveness probe
///
/// `Ok(0)` means the peer sent FIN. Data from the peer is discarded; the
/// relay protocol is one-way.
fn is_alive(stream: &TcpStream) -> bool {
    let mut probe = [0u8; 64];
    match stream.try_read(&mut probe) {
        Ok(0) => false,
        Ok(_) => true,
        Err(e) if e.kind() == ErrorKind::WouldBlock => true,
        Err(_) => false,
    }
}

/// Enable TCP keep-alive (non-fatal if it fails)
fn set_keepalive(stream: &TcpStream, interval: Duration) {
    let sock_ref = SockRef::from(stream);
    let keepalive = TcpKeepalive::new().with_time(interval);

    // On Linux, also set the interval between probes
    #[cfg(target_os = "linux")]
    let keepalive = keepalive.with_interval(interval);

    if let Err(e) = sock_ref.set_tcp_keepalive(&keepalive) {
        tracing::debug!(error = %e, "failed to set TCP keep-alive, continuing without keep-alive");
    }
}
