//! Integration tests for the RCON client task

mod common;

use common::*;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{Instant, timeout};
use zanrcon::{ClientError, ClientOptions, connect_server, spawn};
use zanrcore::{
    AuthFailure, ClientPacket, HuffmanCodec, ProtocolError, ServerPacket, SessionError,
    SessionEvent, SessionState, Update,
};

fn fast_keepalive() -> ClientOptions {
    ClientOptions {
        keepalive: Duration::from_millis(100),
        ..ClientOptions::default()
    }
}

fn memory_server() -> SocketAddr {
    "127.0.0.1:10666".parse().unwrap()
}

/// Complete a handshake over a memory transport
async fn memory_handshake(peer: &mut MemoryPeer, huffman: &HuffmanCodec, password: &str) {
    let server = memory_server();

    let (datagram, to) = peer.sent.recv().await.unwrap();
    assert_eq!(to, server);
    assert_eq!(
        client_packet(huffman, &datagram),
        ClientPacket::BeginConnection { protocol_version: 3 }
    );

    peer.deliver
        .send((server_datagram(huffman, &ServerPacket::Salt { salt: *SALT }), server))
        .unwrap();

    let (datagram, _) = peer.sent.recv().await.unwrap();
    assert_eq!(
        client_packet(huffman, &datagram),
        ClientPacket::Password {
            hex_digest: zanrcore::password::salted_digest(SALT, password)
        }
    );

    peer.deliver
        .send((server_datagram(huffman, &ServerPacket::LoggedIn), server))
        .unwrap();
}

#[tokio::test]
async fn test_handshake_and_updates() {
    init_tracing();

    let server = FakeServer::bind().await;
    let (handle, mut events) =
        connect_server("secret", "localhost", server.port(), ClientOptions::default())
            .await
            .unwrap();

    let client = server.accept("secret").await;
    assert_eq!(next_event(&mut events).await, SessionEvent::Connect);
    assert_eq!(handle.state(), SessionState::Connected);

    let names = vec!["alice".to_string(), "bob".to_string()];
    server
        .send(&ServerPacket::Update(Update::PlayerData { names: names.clone() }), client)
        .await;
    server
        .send(&ServerPacket::Update(Update::AdminCount { count: 1 }), client)
        .await;
    server
        .send(&ServerPacket::Update(Update::Map { name: "MAP01".to_string() }), client)
        .await;
    server
        .send(&ServerPacket::Message { text: "hello".to_string() }, client)
        .await;

    assert_eq!(next_event(&mut events).await, SessionEvent::Players { names });
    assert_eq!(next_event(&mut events).await, SessionEvent::Admins { count: 1 });
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Map { name: "MAP01".to_string() }
    );
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Message { text: "hello".to_string() }
    );

    handle.shutdown().await;
}

#[tokio::test]
async fn test_command_and_disconnect() {
    init_tracing();

    let server = FakeServer::bind().await;
    let (handle, mut events) =
        connect_server("secret", "127.0.0.1", server.port(), ClientOptions::default())
            .await
            .unwrap();

    server.accept("secret").await;
    assert_eq!(next_event(&mut events).await, SessionEvent::Connect);

    handle.send_command("map MAP02").unwrap();
    let (packet, _) = server.recv().await;
    assert_eq!(packet, ClientPacket::Command { text: "map MAP02".to_string() });

    handle.disconnect().unwrap();
    let (packet, _) = server.recv().await;
    assert_eq!(packet, ClientPacket::Disconnect);

    timeout(Duration::from_secs(2), handle.wait_for_state(SessionState::Disconnected))
        .await
        .unwrap()
        .unwrap();

    handle.shutdown().await;
}

#[tokio::test]
async fn test_invalid_password() {
    init_tracing();

    let server = FakeServer::bind().await;
    let (handle, mut events) =
        connect_server("wrong", "127.0.0.1", server.port(), fast_keepalive())
            .await
            .unwrap();

    let (packet, client) = server.recv().await;
    assert!(matches!(packet, ClientPacket::BeginConnection { .. }));
    server.send(&ServerPacket::Salt { salt: *SALT }, client).await;
    let (packet, _) = server.recv().await;
    assert!(matches!(packet, ClientPacket::Password { .. }));
    server.send(&ServerPacket::InvalidPassword, client).await;

    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::error(AuthFailure::InvalidPassword)
    );
    timeout(Duration::from_secs(2), handle.wait_for_state(SessionState::Disconnected))
        .await
        .unwrap()
        .unwrap();

    // A refused session neither reacts to the server nor keeps it alive
    server
        .send(&ServerPacket::Message { text: "late".to_string() }, client)
        .await;
    assert!(server.try_recv(Duration::from_millis(400)).await.is_none());
    assert!(timeout(Duration::from_millis(100), events.recv()).await.is_err());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_foreign_sender_ignored() {
    init_tracing();

    let server = FakeServer::bind().await;
    let (handle, mut events) =
        connect_server("secret", "127.0.0.1", server.port(), ClientOptions::default())
            .await
            .unwrap();

    let client = server.accept("secret").await;
    assert_eq!(next_event(&mut events).await, SessionEvent::Connect);

    let stranger = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let spoof = server_datagram(
        &HuffmanCodec::default(),
        &ServerPacket::Message { text: "spoofed".to_string() },
    );
    stranger.send_to(&spoof, client).await.unwrap();

    server
        .send(&ServerPacket::Message { text: "real".to_string() }, client)
        .await;

    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Message { text: "real".to_string() }
    );
    assert_eq!(handle.state(), SessionState::Connected);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_keepalive_runs_only_while_connected() {
    init_tracing();

    let huffman = HuffmanCodec::default();
    let (transport, mut peer) = memory_transport();
    let (handle, mut events) = spawn(transport, ClientOptions::default());

    handle.connect("secret", 10666, "127.0.0.1").unwrap();
    let start = Instant::now();
    memory_handshake(&mut peer, &huffman, "secret").await;
    assert_eq!(next_event(&mut events).await, SessionEvent::Connect);

    for n in 1..=2u32 {
        let (datagram, to) = peer.sent.recv().await.unwrap();
        assert_eq!(client_packet(&huffman, &datagram), ClientPacket::Pong);
        assert_eq!(to, memory_server());
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(5) * n);
        assert!(elapsed < Duration::from_secs(5) * n + Duration::from_millis(100));
    }

    handle.disconnect().unwrap();
    let (datagram, _) = peer.sent.recv().await.unwrap();
    assert_eq!(client_packet(&huffman, &datagram), ClientPacket::Disconnect);

    // No pongs after leaving
    assert!(
        timeout(Duration::from_secs(30), peer.sent.recv())
            .await
            .is_err()
    );

    handle.shutdown().await;
}

#[tokio::test]
async fn test_operations_rejected_in_wrong_state() {
    init_tracing();

    let (transport, mut peer) = memory_transport();
    let (handle, mut events) = spawn(transport, ClientOptions::default());

    handle.send_command("status").unwrap();
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::error(SessionError::InvalidState {
            operation: "send a command",
            state: SessionState::Disconnected,
        })
    );

    handle.disconnect().unwrap();
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::error(SessionError::InvalidState {
            operation: "disconnect",
            state: SessionState::Disconnected,
        })
    );
    assert!(peer.sent.try_recv().is_err());

    handle.connect("secret", 10666, "127.0.0.1").unwrap();
    peer.sent.recv().await.unwrap();
    assert_eq!(handle.state(), SessionState::Connecting);

    handle.connect("secret", 10666, "127.0.0.1").unwrap();
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::error(SessionError::InvalidState {
            operation: "connect",
            state: SessionState::Connecting,
        })
    );
    assert!(peer.sent.try_recv().is_err());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_unresolvable_host() {
    init_tracing();

    let (transport, mut peer) = memory_transport();
    let (handle, mut events) = spawn(transport, ClientOptions::default());

    handle.connect("secret", 10666, "nonexistent.invalid").unwrap();

    let event = timeout(Duration::from_secs(30), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(
        event,
        SessionEvent::Error {
            cause: SessionError::Network { ref host, .. }
        } if host == "nonexistent.invalid"
    ));
    assert_eq!(handle.state(), SessionState::Disconnected);
    assert!(peer.sent.try_recv().is_err());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_malformed_salt_resets_session() {
    init_tracing();

    let huffman = HuffmanCodec::default();
    let (transport, mut peer) = memory_transport();
    let (handle, mut events) = spawn(transport, ClientOptions::default());

    handle.connect("secret", 10666, "127.0.0.1").unwrap();
    peer.sent.recv().await.unwrap();

    // Salt packet with a 10 byte salt
    let mut raw = vec![34u8];
    raw.extend_from_slice(b"abcdefghij");
    raw.push(0);
    peer.deliver
        .send((huffman.encode(&raw), memory_server()))
        .unwrap();

    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::error(ProtocolError::MalformedSalt { len: 12 })
    );
    timeout(Duration::from_secs(2), handle.wait_for_state(SessionState::Disconnected))
        .await
        .unwrap()
        .unwrap();
    assert!(peer.sent.try_recv().is_err());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_disconnects() {
    init_tracing();

    let huffman = HuffmanCodec::default();
    let (transport, mut peer) = memory_transport();
    let (handle, mut events) = spawn(transport, ClientOptions::default());

    handle.connect("secret", 10666, "127.0.0.1").unwrap();
    memory_handshake(&mut peer, &huffman, "secret").await;
    assert_eq!(next_event(&mut events).await, SessionEvent::Connect);

    handle.shutdown().await;

    let (datagram, _) = peer.sent.recv().await.unwrap();
    assert_eq!(client_packet(&huffman, &datagram), ClientPacket::Disconnect);
    assert!(matches!(
        handle.send_command("status"),
        Err(ClientError::Closed)
    ));
}
