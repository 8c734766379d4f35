//! Serve command - Run the relay until SIGINT/SIGTERM

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sysrelay_config::Config;
use sysrelay_pipeline::{ErrorSink, RelayServer};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Run the relay
pub async fn run(config: Config) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        "sysrelay starting"
    );

    let report_interval = config.errors.report_interval;
    let mut server = RelayServer::new(config);
    let addr = server.start().context("failed to start relay server")?;

    let cancel = CancellationToken::new();
    let reporter = spawn_error_reporter(&server, report_interval, &cancel);

    info!(address = %addr, "sysrelay running");

    wait_for_shutdown().await;
    info!("shutdown signal received, stopping relay...");

    cancel.cancel();
    if let Some(task) = reporter
        && let Err(e) = task.await
    {
        warn!(error = %e, "error reporter panicked");
    }

    server.stop().await;

    // Whatever failed since the last report
    report_errors(server.error_sink());

    let metrics = server.metrics();
    info!(
        connections = metrics.listener.connections_total,
        messages_read = metrics.pipeline.messages_read,
        forwarded = metrics.pipeline.messages_forwarded,
        transform_failures = metrics.pipeline.transform_failures,
        delivery_failures = metrics.pipeline.delivery_failures,
        discarded = metrics.pipeline.messages_discarded,
        "sysrelay shutdown complete"
    );
    Ok(())
}

/// Spawn the periodic error reporter, if enabled
fn spawn_error_reporter(
    server: &RelayServer,
    interval: Duration,
    cancel: &CancellationToken,
) -> Option<tokio::task::JoinHandle<()>> {
    if interval.is_zero() {
        return None;
    }

    let errors = Arc::clone(server.error_sink());
    let cancel = cancel.clone();
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => report_errors(&errors),
            }
        }
    }))
}

/// Log and clear buffered errors
fn report_errors(errors: &ErrorSink) {
    let entries = errors.take();
    if entries.is_empty() {
        return;
    }

    warn!(count = entries.len(), "messages dropped since last report");
    for entry in &entries {
        warn!("{}", entry);
    }
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
