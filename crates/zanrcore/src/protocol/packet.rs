//! Packet types exchanged with the server

use super::constants::SALT_LEN;
use super::types::{ClientCode, ServerCode};

/// A packet sent from the client to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientPacket {
    /// Open a session using the given protocol version
    BeginConnection { protocol_version: u8 },

    /// Lowercase hex MD5 of salt followed by password
    Password { hex_digest: String },

    /// Keepalive
    Pong,

    /// Console command to execute on the server
    Command { text: String },

    /// Close the session
    Disconnect,
}

impl ClientPacket {
    /// Type code written as the first byte
    pub const fn code(&self) -> ClientCode {
        match self {
            Self::BeginConnection { .. } => ClientCode::BeginConnection,
            Self::Password { .. } => ClientCode::Password,
            Self::Pong => ClientCode::Pong,
            Self::Command { .. } => ClientCode::Command,
            Self::Disconnect => ClientCode::Disconnect,
        }
    }
}

/// A packet sent from the server to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerPacket {
    OldProtocol,
    Banned,
    Salt { salt: [u8; SALT_LEN] },
    LoggedIn,
    InvalidPassword,
    Message { text: String },
    Update(Update),

    /// Type byte outside the known set
    Unknown(u8),
}

impl ServerPacket {
    /// Type code, or `None` for an unknown packet
    pub const fn code(&self) -> Option<ServerCode> {
        match self {
            Self::Unknown(_) => None,
            _ => ServerCode::from_u8(self.type_byte()),
        }
    }

    /// First byte on the wire
    pub const fn type_byte(&self) -> u8 {
        match self {
            Self::Unknown(code) => *code,
            Self::OldProtocol => ServerCode::OldProtocol.to_u8(),
            Self::Banned => ServerCode::Banned.to_u8(),
            Self::Salt { .. } => ServerCode::Salt.to_u8(),
            Self::LoggedIn => ServerCode::LoggedIn.to_u8(),
            Self::InvalidPassword => ServerCode::InvalidPassword.to_u8(),
            Self::Message { .. } => ServerCode::Message.to_u8(),
            Self::Update(_) => ServerCode::Update.to_u8(),
        }
    }

    /// Short name used in logs and diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::OldProtocol => "old protocol",
            Self::Banned => "banned",
            Self::Salt { .. } => "salt",
            Self::LoggedIn => "logged in",
            Self::InvalidPassword => "invalid password",
            Self::Message { .. } => "message",
            Self::Update(_) => "update",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Server state notifications carried by an update packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// Names of the players currently on the server, in server order
    PlayerData { names: Vec<String> },

    /// Number of RCON clients logged in
    AdminCount { count: u8 },

    /// Current map lump name
    Map { name: String },

    /// Subtype byte outside the known set
    Unknown(u8),
}
