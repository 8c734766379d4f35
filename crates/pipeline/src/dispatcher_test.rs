use super::*;

use std::net::SocketAddr;

use sysrelay_protocol::Bytes;
use sysrelay_sources::{ConnectionRegistry, FramedConnection, ListenerMetrics};

use crate::queue::{WorkReceiver, work_queue};

fn pool(count: usize) -> (Vec<WorkSender>, Vec<WorkReceiver>) {
    (0..count).map(|_| work_queue()).unzip()
}

/// Receive everything already buffered in a worker queue
async fn drain_now(rx: &mut WorkReceiver) -> Vec<String> {
    let mut out = Vec::new();
    while rx.depth() > 0 {
        out.push(rx.recv().await.unwrap());
    }
    out
}

#[tokio::test]
async fn test_round_robin_even_distribution() {
    let (senders, mut receivers) = pool(3);
    let mut dispatcher = Dispatcher::new(senders, Arc::new(PipelineMetrics::new()));

    let chosen: Vec<_> = (0..12)
        .map(|i| dispatcher.dispatch(format!("m{}", i)).unwrap())
        .collect();
    assert_eq!(chosen, [0, 1, 2, 0, 1, 2, 0, 1, 2, 0, 1, 2]);

    for (index, rx) in receivers.iter_mut().enumerate() {
        let messages = drain_now(rx).await;
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], format!("m{}", index));
    }
}

#[test]
fn test_uneven_count_differs_by_at_most_one() {
    let (senders, receivers) = pool(4);
    let mut dispatcher = Dispatcher::new(senders, Arc::new(PipelineMetrics::new()));

    for i in 0..10 {
        dispatcher.dispatch(i.to_string());
    }

    let depths: Vec<_> = receivers.iter().map(|rx| rx.depth()).collect();
    assert_eq!(depths, [3, 3, 2, 2]);
}

#[test]
fn test_no_workers() {
    let metrics = Arc::new(PipelineMetrics::new());
    let mut dispatcher = Dispatcher::new(Vec::new(), Arc::clone(&metrics));

    assert_eq!(dispatcher.worker_count(), 0);
    assert_eq!(dispatcher.dispatch("lost".into()), None);
    assert_eq!(metrics.snapshot().messages_dispatched, 0);
}

#[test]
fn test_closed_worker_still_advances_cursor() {
    let (senders, mut receivers) = pool(2);
    let metrics = Arc::new(PipelineMetrics::new());
    let mut dispatcher = Dispatcher::new(senders, Arc::clone(&metrics));

    receivers.remove(0);

    assert_eq!(dispatcher.dispatch("a".into()), None);
    assert_eq!(dispatcher.dispatch("b".into()), Some(1));
    assert_eq!(dispatcher.dispatch("c".into()), None);
    assert_eq!(metrics.snapshot().messages_dispatched, 1);
}

#[tokio::test]
async fn test_run_dispatches_until_cancelled() {
    let (senders, mut receivers) = pool(2);
    let metrics = Arc::new(PipelineMetrics::new());
    let dispatcher = Dispatcher::new(senders, Arc::clone(&metrics));
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(dispatcher.run(inbound_rx, cancel.clone()));

    for i in 0..4 {
        inbound_tx.send(format!("m{}", i)).unwrap();
    }

    assert_eq!(receivers[0].recv().await.as_deref(), Some("m0"));
    assert_eq!(receivers[1].recv().await.as_deref(), Some("m1"));
    assert_eq!(receivers[0].recv().await.as_deref(), Some("m2"));
    assert_eq!(receivers[1].recv().await.as_deref(), Some("m3"));

    cancel.cancel();
    handle.await.unwrap();
    assert_eq!(metrics.snapshot().messages_dispatched, 4);
}

#[tokio::test]
async fn test_run_without_workers_waits_for_cancel() {
    let dispatcher = Dispatcher::new(Vec::new(), Arc::new(PipelineMetrics::new()));
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(dispatcher.run(inbound_rx, cancel.clone()));
    inbound_tx.send("kept".into()).unwrap();
    tokio::task::yield_now().await;
    assert!(!handle.is_finished());

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_read_loop_moves_messages_in_order() {
    let registry = Arc::new(ConnectionRegistry::new());
    let reader = Arc::new(FairReader::new(
        Arc::clone(&registry),
        Arc::new(ListenerMetrics::new()),
    ));
    let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
    let conn = Arc::new(FramedConnection::new(peer, false, CancellationToken::new()));
    registry.register(Arc::clone(&conn));

    let metrics = Arc::new(PipelineMetrics::new());
    let (inbound_tx, mut inbound_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(run_read_loop(
        reader,
        inbound_tx,
        Duration::from_millis(5),
        Arc::clone(&metrics),
        cancel.clone(),
    ));

    conn.append(Bytes::from_static(b"<13>a\0<13>b"));
    conn.append(Bytes::from_static(b"\0<13>c\0"));

    assert_eq!(inbound_rx.recv().await.as_deref(), Some("<13>a"));
    assert_eq!(inbound_rx.recv().await.as_deref(), Some("<13>b"));
    assert_eq!(inbound_rx.recv().await.as_deref(), Some("<13>c"));

    cancel.cancel();
    handle.await.unwrap();
    assert_eq!(metrics.snapshot().messages_read, 3);
}

#[tokio::test(start_paused = true)]
async fn test_read_loop_idle_until_cancelled() {
    let reader = Arc::new(FairReader::new(
        Arc::new(ConnectionRegistry::new()),
        Arc::new(ListenerMetrics::new()),
    ));
    let (inbound_tx, _inbound_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(run_read_loop(
        reader,
        inbound_tx,
        Duration::from_millis(250),
        Arc::new(PipelineMetrics::new()),
        cancel.clone(),
    ));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!handle.is_finished());

    cancel.cancel();
    handle.await.unwrap();
}
