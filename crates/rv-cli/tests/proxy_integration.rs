//! Client proxy integration tests
//!
//! Runs the proxy against a real broker on loopback, with in-memory pipes
//! standing in for stdin/stdout.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use rv_broker::Broker;
use rv_cli::proxy::{self, ProxyOptions};
use rv_core::config::BrokerConfig;
use rv_core::{Peer, RvError, TcpDialer};
use rv_protocol::{NodeId, Reply};

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

async fn start_broker() -> (SocketAddr, Arc<Broker>, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let broker = Arc::new(Broker::new(BrokerConfig::default(), cancel.clone()));
    tokio::spawn({
        let broker = Arc::clone(&broker);
        async move { broker.serve(listener).await }
    });
    (addr, broker, cancel)
}

async fn register_agent(addr: SocketAddr, broker: &Broker, id: &str) -> Peer<TcpStream> {
    let mut agent = Peer::tcp(TcpStream::connect(addr).await.unwrap());
    agent.send_line(&format!("AGENT {}\n", id)).await.unwrap();
    let line = agent.read_line().await.unwrap();
    assert_eq!(Reply::parse(&line), Reply::Ok);

    let id = NodeId::parse(id).unwrap();
    timeout(TEST_TIMEOUT, async {
        while !broker.registry().contains(&id) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("agent never registered");
    agent
}

fn options(server: impl ToString, id: &str) -> ProxyOptions {
    ProxyOptions {
        server: server.to_string(),
        node_id: NodeId::parse(id).unwrap(),
    }
}

#[tokio::test]
async fn test_proxy_rejected_when_agent_offline() {
    let (addr, _broker, cancel) = start_broker().await;

    let err = proxy::dial(&TcpDialer::default(), &options(addr, "ghost"))
        .await
        .unwrap_err();
    match err {
        RvError::Rejected(reason) => assert_eq!(reason, "agent offline"),
        other => panic!("unexpected error: {other}"),
    }

    cancel.cancel();
}

#[tokio::test]
async fn test_proxy_relays_stdio_to_agent() {
    let (addr, broker, cancel) = start_broker().await;
    let mut agent = register_agent(addr, &broker, "n1").await;

    let (mut stdin, proxy_in) = tokio::io::duplex(1024);
    let (proxy_out, mut stdout) = tokio::io::duplex(1024);
    let opts = options(addr, "n1");
    let proxy = tokio::spawn(async move {
        proxy::run(&TcpDialer::default(), &opts, proxy_in, proxy_out).await
    });

    stdin.write_all(b"ping").await.unwrap();
    let mut buf = [0u8; 4];
    timeout(TEST_TIMEOUT, agent.read_exact(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&buf, b"ping");

    agent.write_all(b"pong").await.unwrap();
    timeout(TEST_TIMEOUT, stdout.read_exact(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&buf, b"pong");

    // Agent side ends the session; the proxy finishes without stdin closing
    drop(agent);
    let mut rest = Vec::new();
    timeout(TEST_TIMEOUT, stdout.read_to_end(&mut rest))
        .await
        .unwrap()
        .unwrap();
    assert!(rest.is_empty());

    let stats = timeout(TEST_TIMEOUT, proxy)
        .await
        .expect("proxy did not finish")
        .unwrap()
        .unwrap();
    assert_eq!(stats.a_to_b.bytes, 4);
    assert_eq!(stats.b_to_a.bytes, 4);

    cancel.cancel();
}

#[tokio::test]
async fn test_proxy_keeps_bytes_sent_with_ack() {
    // Fake broker that acks and sends data in the same write
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut header = [0u8; 10];
        stream.read_exact(&mut header).await.unwrap();
        assert_eq!(&header, b"CLIENT n1\n");
        stream.write_all(b"OK\nSSH-2.0-agent\r\n").await.unwrap();
    });

    let mut broker = proxy::dial(&TcpDialer::default(), &options(addr, "n1"))
        .await
        .unwrap();
    assert_eq!(broker.buffered(), b"SSH-2.0-agent\r\n");

    let mut greeting = Vec::new();
    broker.read_to_end(&mut greeting).await.unwrap();
    assert_eq!(greeting, b"SSH-2.0-agent\r\n");
}

#[tokio::test]
async fn test_proxy_broker_closing_before_reply() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        drop(stream);
    });

    let err = proxy::dial(&TcpDialer::default(), &options(addr, "n1"))
        .await
        .unwrap_err();
    // Usually a clean EOF; a reset shows up as an I/O error instead
    assert!(
        matches!(err, RvError::Protocol(_) | RvError::Io(_)),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn test_proxy_unreachable_broker() {
    // Bind then drop to get a port nothing listens on
    let addr = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();

    let err = proxy::dial(&TcpDialer::default(), &options(addr, "n1"))
        .await
        .unwrap_err();
    assert!(matches!(err, RvError::Connect { .. }), "unexpected error: {err}");
}
