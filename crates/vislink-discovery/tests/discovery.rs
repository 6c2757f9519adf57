//! Integration tests for the discovery exchange.
//!
//! These drive real UDP sockets on loopback: a simulated responder
//! listens for the query datagram and answers after a configurable
//! delay, optionally from a second socket to impersonate a distinct
//! responder. Timing assertions use generous tolerances so the tests
//! stay stable under load.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::Instant;

use vislink_discovery::packet::{is_query, DiscoveryReply};
use vislink_discovery::{
    DiscoveryClient, DiscoveryConfig, DiscoveryError, DiscoveryPhase,
};

/// One simulated server reply: wait `delay`, then answer the query's
/// sender from a fresh socket, advertising `ws_port`.
struct PlannedReply {
    delay: Duration,
    ws_port: u16,
}

/// Binds a responder on a loopback port and returns that port.
///
/// The responder waits for one query datagram, then sends each planned
/// reply from its own ephemeral socket — distinct source addresses, so
/// the client sees them as distinct responders.
async fn spawn_responder(replies: Vec<PlannedReply>) -> u16 {
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("responder should bind");
    let port = socket.local_addr().expect("local addr").port();

    tokio::spawn(async move {
        let mut buf = [0u8; 512];
        let (len, querier) =
            socket.recv_from(&mut buf).await.expect("recv query");
        assert!(is_query(&buf[..len]), "expected the broadcast query");

        for reply in replies {
            tokio::time::sleep(reply.delay).await;
            let reply_socket =
                UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
                    .await
                    .expect("reply socket should bind");
            let bytes = DiscoveryReply { port: reply.ws_port }
                .to_bytes()
                .expect("reply encodes");
            reply_socket
                .send_to(&bytes, querier)
                .await
                .expect("reply should send");
        }
    });

    port
}

fn loopback_config(port: u16, timeout: Duration) -> DiscoveryConfig {
    DiscoveryConfig {
        port,
        broadcast_addr: Ipv4Addr::LOCALHOST,
        bind_addr: Ipv4Addr::LOCALHOST,
        timeout,
    }
}

#[tokio::test]
async fn test_short_circuit_fires_once_on_first_reply() {
    let port = spawn_responder(vec![
        PlannedReply {
            delay: Duration::from_millis(10),
            ws_port: 9001,
        },
        PlannedReply {
            delay: Duration::from_millis(40),
            ws_port: 9002,
        },
    ])
    .await;

    let client =
        loopback_client(port, Duration::from_millis(500));
    let started = Instant::now();
    let addrs = client.discover(true).await.expect("discover");
    let elapsed = started.elapsed();

    // Exactly the first responder, well before the 500ms window ends.
    assert_eq!(addrs.len(), 1);
    assert_eq!(addrs[0].port(), 9001);
    assert!(
        elapsed < Duration::from_millis(250),
        "short-circuit took {elapsed:?}"
    );
    assert_eq!(client.phase(), DiscoveryPhase::Finished(addrs));
}

#[tokio::test]
async fn test_timeout_with_no_responder_finishes_empty() {
    // Nothing listens on this port; bind-and-drop just reserves a
    // number no responder will ever answer from.
    let probe = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("probe bind");
    let port = probe.local_addr().expect("local addr").port();
    drop(probe);

    let client =
        loopback_client(port, Duration::from_millis(200));
    let started = Instant::now();
    let addrs = client.discover(false).await.expect("discover");
    let elapsed = started.elapsed();

    assert!(addrs.is_empty());
    assert!(
        elapsed >= Duration::from_millis(190),
        "finished early at {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_millis(600),
        "overran the window: {elapsed:?}"
    );
    assert_eq!(client.phase(), DiscoveryPhase::Finished(vec![]));
}

#[tokio::test]
async fn test_full_window_collects_replies_in_arrival_order() {
    let port = spawn_responder(vec![
        PlannedReply {
            delay: Duration::from_millis(10),
            ws_port: 9001,
        },
        PlannedReply {
            delay: Duration::from_millis(30),
            ws_port: 9002,
        },
    ])
    .await;

    let client =
        loopback_client(port, Duration::from_millis(300));
    let addrs = client.discover(false).await.expect("discover");

    let ports: Vec<u16> = addrs.iter().map(SocketAddr::port).collect();
    assert_eq!(ports, [9001, 9002]);
}

#[tokio::test]
async fn test_duplicate_replies_from_one_responder_count_once() {
    // A single reply socket answering twice: same source address, so
    // the second reply must be ignored.
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("responder bind");
    let port = socket.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        let mut buf = [0u8; 512];
        let (_, querier) =
            socket.recv_from(&mut buf).await.expect("recv query");
        let bytes = DiscoveryReply { port: 9001 }
            .to_bytes()
            .expect("reply encodes");
        socket.send_to(&bytes, querier).await.expect("first reply");
        socket.send_to(&bytes, querier).await.expect("second reply");
    });

    let client =
        loopback_client(port, Duration::from_millis(200));
    let addrs = client.discover(false).await.expect("discover");
    assert_eq!(addrs.len(), 1);
}

#[tokio::test]
async fn test_foreign_datagrams_are_ignored() {
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("responder bind");
    let port = socket.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        let mut buf = [0u8; 512];
        let (_, querier) =
            socket.recv_from(&mut buf).await.expect("recv query");
        socket
            .send_to(b"some other protocol", querier)
            .await
            .expect("noise");
    });

    let client =
        loopback_client(port, Duration::from_millis(150));
    let addrs = client.discover(false).await.expect("discover");
    assert!(addrs.is_empty());
}

#[tokio::test]
async fn test_second_start_while_discovering_is_rejected() {
    let probe = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("probe bind");
    let port = probe.local_addr().expect("local addr").port();
    drop(probe);

    let client =
        loopback_client(port, Duration::from_millis(300));
    let rx = client.start(false).await.expect("first start");
    assert_eq!(client.phase(), DiscoveryPhase::Discovering);

    let second = client.start(false).await;
    assert!(matches!(
        second,
        Err(DiscoveryError::AlreadyDiscovering)
    ));

    // The open window still finishes exactly once.
    let addrs = rx.await.expect("window result");
    assert!(addrs.is_empty());

    // From Finished, a fresh window is allowed again.
    let rx = client.start(false).await.expect("restart");
    let _ = rx.await.expect("second window result");
}

fn loopback_client(port: u16, timeout: Duration) -> DiscoveryClient {
    DiscoveryClient::new(loopback_config(port, timeout))
}
