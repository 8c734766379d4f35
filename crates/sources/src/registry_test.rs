use super::*;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

fn connection() -> Arc<FramedConnection> {
    Arc::new(FramedConnection::new(
        "127.0.0.1:40000".parse().unwrap(),
        false,
        CancellationToken::new(),
    ))
}

#[test]
fn test_register_adds_to_both_views() {
    let registry = ConnectionRegistry::new();
    let conn = connection();
    registry.register(Arc::clone(&conn));

    assert_eq!(registry.live_count(), 1);
    assert_eq!(registry.pending_count(), 1);
    assert!(registry.get(conn.id()).is_some());
    assert!(registry.is_pending(conn.id()));
}

#[test]
fn test_disconnect_keeps_pending_until_drained() {
    let registry = ConnectionRegistry::new();
    let conn = connection();
    registry.register(Arc::clone(&conn));
    conn.append(Bytes::from_static(b"a\0"));

    registry.disconnect(conn.id());
    assert!(conn.is_disconnected());
    assert_eq!(registry.live_count(), 0);
    assert!(registry.is_pending(conn.id()));

    assert_eq!(registry.drain(&conn), Some(vec!["a".to_string()]));
    assert!(!registry.is_pending(conn.id()));
}

#[test]
fn test_register_disconnected_skips_live() {
    let registry = ConnectionRegistry::new();
    let conn = connection();
    conn.append(Bytes::from_static(b"late\0"));
    conn.disconnect();

    registry.register(Arc::clone(&conn));
    assert_eq!(registry.live_count(), 0);
    assert!(registry.get(conn.id()).is_none());
    assert!(registry.is_pending(conn.id()));

    assert_eq!(registry.drain(&conn), Some(vec!["late".to_string()]));
    assert_eq!(registry.pending_count(), 0);
}

#[test]
fn test_drain_prunes_disconnected_empty_connection() {
    let registry = ConnectionRegistry::new();
    let conn = connection();
    registry.register(Arc::clone(&conn));
    registry.disconnect(conn.id());

    assert_eq!(registry.drain(&conn), None);
    assert_eq!(registry.pending_count(), 0);
}

#[test]
fn test_drain_keeps_connected_idle_connection() {
    let registry = ConnectionRegistry::new();
    let conn = connection();
    registry.register(Arc::clone(&conn));

    assert_eq!(registry.drain(&conn), None);
    assert!(registry.is_pending(conn.id()));
}

#[test]
fn test_disconnect_unknown_is_noop() {
    let registry = ConnectionRegistry::new();
    let conn = connection();
    registry.disconnect(conn.id());
    assert!(!conn.is_disconnected());
}

#[test]
fn test_disconnect_all() {
    let registry = ConnectionRegistry::new();
    let a = connection();
    let b = connection();
    registry.register(Arc::clone(&a));
    registry.register(Arc::clone(&b));

    assert_eq!(registry.disconnect_all(), 2);
    assert!(a.is_disconnected());
    assert!(b.is_disconnected());
    assert_eq!(registry.live_count(), 0);
    assert_eq!(registry.pending_count(), 2);
    assert_eq!(registry.disconnect_all(), 0);
}

#[test]
fn test_drain_all_in_accept_order() {
    let registry = ConnectionRegistry::new();
    let a = connection();
    let b = connection();
    registry.register(Arc::clone(&a));
    registry.register(Arc::clone(&b));

    b.append(Bytes::from_static(b"b1\0"));
    a.append(Bytes::from_static(b"a1\0"));
    a.append(Bytes::from_static(b"a2\0"));
    registry.disconnect(b.id());

    let messages = registry.drain_all();
    assert_eq!(messages, ["a1", "a2", "b1"]);
    assert!(registry.is_pending(a.id()));
    assert!(!registry.is_pending(b.id()));
}

#[test]
fn test_snapshot_order_is_accept_order() {
    let registry = ConnectionRegistry::new();
    let conns: Vec<_> = (0..4).map(|_| connection()).collect();
    for conn in conns.iter().rev() {
        registry.register(Arc::clone(conn));
    }

    let ids: Vec<_> = registry.pending_snapshot().iter().map(|c| c.id()).collect();
    let mut expected: Vec<_> = conns.iter().map(|c| c.id()).collect();
    expected.sort();
    assert_eq!(ids, expected);
}
