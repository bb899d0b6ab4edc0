//! RCON session state machine
//!
//! The session does no I/O. Each operation returns the [`Output`]s the caller
//! must carry out, in order: datagrams to send, events to deliver, and
//! keepalive timer changes.

use crate::codec::RconCodec;
use crate::error::{AuthFailure, ProtocolError, SessionError};
use crate::password::salted_digest;
use crate::protocol::{ClientPacket, PROTOCOL_VERSION, ServerPacket, Update};
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::SocketAddr;
use zeroize::Zeroizing;

/// Connection state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No connection, initial and terminal state
    Disconnected,
    /// Handshake in progress
    Connecting,
    /// Logged in, keepalive running
    Connected,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        f.write_str(name)
    }
}

/// Events delivered to session consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Handshake succeeded
    Connect,
    Error {
        #[serde(serialize_with = "serialize_display")]
        cause: SessionError,
    },
    Message {
        text: String,
    },
    Players {
        names: Vec<String>,
    },
    Admins {
        count: u8,
    },
    Map {
        name: String,
    },
}

impl SessionEvent {
    pub fn error(cause: impl Into<SessionError>) -> Self {
        Self::Error {
            cause: cause.into(),
        }
    }
}

fn serialize_display<S: Serializer>(value: &SessionError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Work the caller must perform after driving the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Encode and send a packet to the given endpoint
    Send { packet: ClientPacket, to: SocketAddr },
    /// Deliver an event to consumers
    Emit(SessionEvent),
    /// Begin sending a pong every keepalive period
    StartKeepalive,
    /// Cancel the keepalive
    StopKeepalive,
}

/// Client side of one RCON session
pub struct Session {
    /// Current connection state
    state: SessionState,

    /// Password for the current attempt, cleared on disconnect
    /// Wiped from memory when dropped
    password: Option<Zeroizing<String>>,

    /// Endpoint fixed at connect time; datagrams from anywhere else are ignored
    remote: Option<SocketAddr>,

    /// Protocol version announced in the connection request
    protocol_version: u8,

    codec: RconCodec,
}

impl Session {
    /// Create a disconnected session
    pub fn new(codec: RconCodec) -> Self {
        Self {
            state: SessionState::Disconnected,
            password: None,
            remote: None,
            protocol_version: PROTOCOL_VERSION,
            codec,
        }
    }

    /// Override the protocol version sent when connecting
    pub fn with_protocol_version(mut self, version: u8) -> Self {
        self.protocol_version = version;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Bound remote endpoint, if a session is active
    pub fn remote(&self) -> Option<SocketAddr> {
        self.remote
    }

    pub fn codec(&self) -> &RconCodec {
        &self.codec
    }

    /// Start the handshake with an already resolved endpoint
    pub fn connect(
        &mut self,
        password: impl Into<String>,
        remote: SocketAddr,
    ) -> Result<Vec<Output>, SessionError> {
        self.require(SessionState::Disconnected, "connect")?;

        self.state = SessionState::Connecting;
        self.password = Some(Zeroizing::new(password.into()));
        self.remote = Some(remote);

        tracing::info!("Connecting to {}", remote);

        Ok(vec![Output::Send {
            packet: ClientPacket::BeginConnection {
                protocol_version: self.protocol_version,
            },
            to: remote,
        }])
    }

    /// Leave a connected session
    ///
    /// The server is not waited on; it times the session out by itself if the
    /// datagram is lost.
    pub fn disconnect(&mut self) -> Result<Vec<Output>, SessionError> {
        let remote = self.connected_remote("disconnect")?;
        self.reset();

        tracing::info!("Disconnected from {}", remote);

        Ok(vec![
            Output::Send {
                packet: ClientPacket::Disconnect,
                to: remote,
            },
            Output::StopKeepalive,
        ])
    }

    /// Run a console command on the server
    pub fn send_command(&self, text: impl Into<String>) -> Result<Vec<Output>, SessionError> {
        let remote = self.connected_remote("send a command")?;

        Ok(vec![Output::Send {
            packet: ClientPacket::Command { text: text.into() },
            to: remote,
        }])
    }

    /// Keepalive packet for the bound endpoint, if connected
    pub fn pong(&self) -> Option<Output> {
        let remote = self.connected_remote("pong").ok()?;
        Some(Output::Send {
            packet: ClientPacket::Pong,
            to: remote,
        })
    }

    /// Process one inbound datagram
    pub fn handle_datagram(&mut self, datagram: &[u8], from: SocketAddr) -> Vec<Output> {
        if self.state == SessionState::Disconnected {
            tracing::trace!("Dropping datagram from {} while disconnected", from);
            return Vec::new();
        }

        if self.remote != Some(from) {
            tracing::debug!("Ignoring datagram from foreign endpoint {}", from);
            return Vec::new();
        }

        match self.codec.decode_datagram(datagram) {
            Ok(packet) => {
                tracing::debug!("Received {} packet from {}", packet.name(), from);
                self.apply(packet)
            }
            Err(err) => {
                tracing::warn!("Malformed datagram from {}: {}", from, err);
                let mut outputs = Vec::new();
                if matches!(err, ProtocolError::MalformedSalt { .. })
                    && self.state == SessionState::Connecting
                {
                    self.reset();
                }
                outputs.push(Output::Emit(SessionEvent::error(err)));
                outputs
            }
        }
    }

    fn apply(&mut self, packet: ServerPacket) -> Vec<Output> {
        match packet {
            ServerPacket::OldProtocol => self.refused(AuthFailure::OldProtocol, &packet),
            ServerPacket::Banned => self.refused(AuthFailure::Banned, &packet),
            ServerPacket::InvalidPassword => self.refused(AuthFailure::InvalidPassword, &packet),

            ServerPacket::Salt { salt } => {
                if self.state != SessionState::Connecting {
                    return self.unexpected(&packet);
                }
                let (Some(password), Some(remote)) = (self.password.as_deref(), self.remote) else {
                    return self.unexpected(&packet);
                };

                tracing::debug!("Answering salt from {}", remote);

                vec![Output::Send {
                    packet: ClientPacket::Password {
                        hex_digest: salted_digest(&salt, password),
                    },
                    to: remote,
                }]
            }

            ServerPacket::LoggedIn => {
                if self.state != SessionState::Connecting {
                    return self.unexpected(&packet);
                }
                self.state = SessionState::Connected;

                tracing::info!("Logged in to {:?}", self.remote);

                vec![Output::StartKeepalive, Output::Emit(SessionEvent::Connect)]
            }

            ServerPacket::Message { text } => {
                if self.state != SessionState::Connected {
                    return self.unexpected(&ServerPacket::Message { text });
                }
                vec![Output::Emit(SessionEvent::Message { text })]
            }

            ServerPacket::Update(update) => {
                if self.state != SessionState::Connected {
                    return self.unexpected(&ServerPacket::Update(update));
                }
                let event = match update {
                    Update::PlayerData { names } => SessionEvent::Players { names },
                    Update::AdminCount { count } => SessionEvent::Admins { count },
                    Update::Map { name } => SessionEvent::Map { name },
                    Update::Unknown(subtype) => {
                        tracing::warn!("Unrecognized update subtype {}", subtype);
                        SessionEvent::error(SessionError::UnrecognizedUpdate(subtype))
                    }
                };
                vec![Output::Emit(event)]
            }

            ServerPacket::Unknown(code) => {
                tracing::warn!("Unrecognized response type {}", code);
                vec![Output::Emit(SessionEvent::error(
                    SessionError::UnrecognizedResponse(code),
                ))]
            }
        }
    }

    /// Server refused the handshake
    fn refused(&mut self, failure: AuthFailure, packet: &ServerPacket) -> Vec<Output> {
        if self.state != SessionState::Connecting {
            return self.unexpected(packet);
        }

        tracing::warn!("Connection refused by {:?}: {}", self.remote, failure);
        self.reset();

        vec![Output::Emit(SessionEvent::error(failure))]
    }

    fn unexpected(&self, packet: &ServerPacket) -> Vec<Output> {
        tracing::warn!("Unexpected {} response while {}", packet.name(), self.state);

        vec![Output::Emit(SessionEvent::error(
            SessionError::UnexpectedResponse {
                packet: packet.name(),
                state: self.state,
            },
        ))]
    }

    fn require(&self, state: SessionState, operation: &'static str) -> Result<(), SessionError> {
        if self.state == state {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn connected_remote(&self, operation: &'static str) -> Result<SocketAddr, SessionError> {
        self.require(SessionState::Connected, operation)?;
        self.remote.ok_or(SessionError::InvalidState {
            operation,
            state: self.state,
        })
    }

    /// Back to disconnected, dropping the password and endpoint
    fn reset(&mut self) {
        self.state = SessionState::Disconnected;
        self.password = None;
        self.remote = None;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("remote", &self.remote)
            .field("protocol_version", &self.protocol_version)
            .finish_non_exhaustive()
    }
}
