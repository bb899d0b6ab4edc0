//! Fake server plumbing shared by the integration tests

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio::time::timeout;
use zanrcon::Transport;
use zanrcore::codec::{decode_client_packet, encode_server_packet};
use zanrcore::{ClientPacket, HuffmanCodec, ServerPacket, SessionEvent};

pub const SALT: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Compress a server packet the way a server would
pub fn server_datagram(huffman: &HuffmanCodec, packet: &ServerPacket) -> Vec<u8> {
    huffman.encode(&encode_server_packet(packet))
}

/// Decompress and parse a datagram sent by the client
pub fn client_packet(huffman: &HuffmanCodec, datagram: &[u8]) -> ClientPacket {
    let raw = huffman.decode(datagram).expect("client datagram decodes");
    decode_client_packet(&raw)
        .expect("client packet parses")
        .expect("known client packet type")
}

/// Next event, failing the test after a couple of seconds
pub async fn next_event(events: &mut broadcast::Receiver<SessionEvent>) -> SessionEvent {
    timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel open")
}

/// UDP endpoint standing in for a game server
pub struct FakeServer {
    socket: UdpSocket,
    huffman: HuffmanCodec,
}

impl FakeServer {
    pub async fn bind() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.expect("bind fake server");
        Self {
            socket,
            huffman: HuffmanCodec::default(),
        }
    }

    pub fn port(&self) -> u16 {
        self.socket.local_addr().expect("local addr").port()
    }

    pub async fn recv(&self) -> (ClientPacket, SocketAddr) {
        self.try_recv(Duration::from_secs(2))
            .await
            .expect("timed out waiting for client datagram")
    }

    pub async fn try_recv(&self, wait: Duration) -> Option<(ClientPacket, SocketAddr)> {
        let mut buf = vec![0u8; 8192];
        let (len, from) = timeout(wait, self.socket.recv_from(&mut buf))
            .await
            .ok()?
            .expect("recv_from");
        Some((client_packet(&self.huffman, &buf[..len]), from))
    }

    pub async fn send(&self, packet: &ServerPacket, to: SocketAddr) {
        self.send_raw(&server_datagram(&self.huffman, packet), to).await;
    }

    pub async fn send_raw(&self, datagram: &[u8], to: SocketAddr) {
        self.socket.send_to(datagram, to).await.expect("send_to");
    }

    /// Answer the handshake, checking the client's digest against `password`
    pub async fn accept(&self, password: &str) -> SocketAddr {
        let (packet, client) = self.recv().await;
        assert_eq!(packet, ClientPacket::BeginConnection { protocol_version: 3 });

        self.send(&ServerPacket::Salt { salt: *SALT }, client).await;

        let (packet, from) = self.recv().await;
        assert_eq!(from, client);
        assert_eq!(
            packet,
            ClientPacket::Password {
                hex_digest: zanrcore::password::salted_digest(SALT, password)
            }
        );

        self.send(&ServerPacket::LoggedIn, client).await;
        client
    }
}

/// In-memory transport whose far end is driven by the test
pub struct MemoryTransport {
    outbound: mpsc::UnboundedSender<(Vec<u8>, SocketAddr)>,
    inbound: Mutex<mpsc::UnboundedReceiver<(Vec<u8>, SocketAddr)>>,
}

/// Test side of a [`MemoryTransport`]
pub struct MemoryPeer {
    /// Datagrams the client sent, with their destination
    pub sent: mpsc::UnboundedReceiver<(Vec<u8>, SocketAddr)>,
    /// Datagrams to deliver to the client, with their source
    pub deliver: mpsc::UnboundedSender<(Vec<u8>, SocketAddr)>,
}

pub fn memory_transport() -> (MemoryTransport, MemoryPeer) {
    let (outbound, sent) = mpsc::unbounded_channel();
    let (deliver, inbound) = mpsc::unbounded_channel();
    let transport = MemoryTransport {
        outbound,
        inbound: Mutex::new(inbound),
    };
    (transport, MemoryPeer { sent, deliver })
}

impl Transport for MemoryTransport {
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        self.outbound
            .send((buf.to_vec(), target))
            .map_err(|_| io::Error::from(io::ErrorKind::BrokenPipe))?;
        Ok(buf.len())
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        let mut inbound = self.inbound.lock().await;
        match inbound.recv().await {
            Some((datagram, from)) => {
                let len = datagram.len().min(buf.len());
                buf[..len].copy_from_slice(&datagram[..len]);
                Ok((len, from))
            }
            None => std::future::pending().await,
        }
    }
}
