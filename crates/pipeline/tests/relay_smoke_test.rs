//! Smoke tests for the relay
//!
//! Real sockets on both sides: clients write to the relay, a local
//! downstream collects whatever the workers forward.

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use sysrelay_config::Config;
use sysrelay_pipeline::RelayServer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Downstream that accepts any number of worker connections and yields
/// every NUL-terminated frame it receives
struct Collector {
    port: u16,
    frames: mpsc::UnboundedReceiver<String>,
}

impl Collector {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, frames) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(collect_frames(stream, tx.clone()));
            }
        });

        Self { port, frames }
    }

    async fn next_frames(&mut self, count: usize) -> Vec<String> {
        let mut frames = Vec::with_capacity(count);
        while frames.len() < count {
            let frame = timeout(Duration::from_secs(5), self.frames.recv())
                .await
                .expect("timed out waiting for downstream frames")
                .expect("collector stopped");
            frames.push(frame);
        }
        frames
    }
}

async fn collect_frames(mut stream: TcpStream, tx: mpsc::UnboundedSender<String>) {
    let mut pending = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        for &byte in &buf[..n] {
            if byte == 0 {
                let frame = String::from_utf8_lossy(&pending).into_owned();
                pending.clear();
                if tx.send(frame).is_err() {
                    return;
                }
            } else {
                pending.push(byte);
            }
        }
    }
}

fn relay_config(downstream_port: u16, extra: &str) -> Config {
    let toml = format!(
        r#"
[listener]
address = "127.0.0.1"
port = 0

[downstream]
port = {downstream_port}
retry_interval = "10ms"

[workers]
poll_interval = "10ms"
{extra}
"#
    );
    Config::from_str(&toml).unwrap()
}

async fn start_relay(config: Config) -> (RelayServer, SocketAddr) {
    let mut server = RelayServer::new(config);
    let addr = server.start().unwrap();
    (server, addr)
}

#[tokio::test]
async fn test_regex_relay_end_to_end() {
    let mut collector = Collector::start().await;
    let config = relay_config(
        collector.port,
        r#"
kind = "regex"
[workers.params.substitutions]
"password=\\S+" = "password=***"
"#,
    );
    let (mut server, addr) = start_relay(config).await;

    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(b"<13>login password=hunter2 ok\0<14>plain\0")
        .await
        .unwrap();

    let frames = collector.next_frames(2).await;
    assert_eq!(frames, ["<13>login password=*** ok", "<14>plain"]);
    assert!(server.errors().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_message_split_across_writes() {
    let mut collector = Collector::start().await;
    let (mut server, addr) = start_relay(relay_config(collector.port, "kind = \"noop\"")).await;

    let mut client = TcpStream::connect(addr).await.unwrap();
    client.write_all(b"<13>hel").await.unwrap();
    client.flush().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.write_all(b"lo wor").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.write_all(b"ld\0").await.unwrap();

    assert_eq!(collector.next_frames(1).await, ["<13>hello world"]);

    server.stop().await;
}

#[tokio::test]
async fn test_marker_framing() {
    let mut collector = Collector::start().await;
    let mut config = relay_config(collector.port, "kind = \"noop\"");
    config.listener.split_on_marker = true;
    let (mut server, addr) = start_relay(config).await;

    let mut client = TcpStream::connect(addr).await.unwrap();
    client.write_all(b"<13>first<14>second\0").await.unwrap();

    assert_eq!(collector.next_frames(2).await, ["<13>first", "<14>second"]);

    server.stop().await;
}

#[tokio::test]
async fn test_many_clients_many_workers() {
    const CLIENTS: usize = 3;
    const PER_CLIENT: usize = 20;

    let mut collector = Collector::start().await;
    let config = relay_config(collector.port, "count = 4\nkind = \"noop\"");
    let (mut server, addr) = start_relay(config).await;

    let mut expected = BTreeSet::new();
    for c in 0..CLIENTS {
        let mut client = TcpStream::connect(addr).await.unwrap();
        let mut payload = Vec::new();
        for m in 0..PER_CLIENT {
            let message = format!("<14>client{} message{}", c, m);
            payload.extend_from_slice(message.as_bytes());
            payload.push(0);
            expected.insert(message);
        }
        tokio::spawn(async move {
            client.write_all(&payload).await.unwrap();
            // Keep the socket open until the test ends
            tokio::time::sleep(Duration::from_secs(10)).await;
        });
    }

    let received: BTreeSet<String> = collector
        .next_frames(CLIENTS * PER_CLIENT)
        .await
        .into_iter()
        .collect();
    assert_eq!(received, expected);

    let metrics = server.metrics();
    assert_eq!(metrics.listener.connections_total, CLIENTS as u64);
    assert_eq!(metrics.pipeline.messages_dispatched, (CLIENTS * PER_CLIENT) as u64);
    assert_eq!(metrics.workers.len(), 4);

    // The last send is recorded just after the collector sees its frame
    let total = (CLIENTS * PER_CLIENT) as u64;
    let sent = |server: &RelayServer| -> u64 {
        server.metrics().workers.iter().map(|w| w.forwarder.messages_sent).sum()
    };
    timeout(Duration::from_secs(5), async {
        while sent(&server) < total {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    server.stop().await;
}
