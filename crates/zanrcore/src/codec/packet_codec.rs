//! Packet layouts for both directions
//!
//! Strings are null-terminated. Every read is bounds-checked and fails with a
//! [`ProtocolError`] instead of indexing past the end of the buffer.

use crate::error::{ProtocolError, Result};
use crate::protocol::{
    ClientCode, ClientPacket, SALT_LEN, SALT_PACKET_LEN, ServerCode, ServerPacket, Update,
    UpdateCode,
};
use bytes::{BufMut, BytesMut};

/// Read a null-terminated string starting at `offset`
///
/// Returns the string and the offset just past its terminator.
pub fn read_string(buf: &[u8], offset: usize) -> Result<(String, usize)> {
    let rest = buf
        .get(offset..)
        .ok_or(ProtocolError::UnterminatedString { offset })?;
    let len = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or(ProtocolError::UnterminatedString { offset })?;

    let text = String::from_utf8_lossy(&rest[..len]).into_owned();
    Ok((text, offset + len + 1))
}

/// Write a string followed by a single null terminator
pub fn write_string(buf: &mut impl BufMut, value: &str) {
    buf.put_slice(value.as_bytes());
    buf.put_u8(0);
}

fn byte_at(buf: &[u8], offset: usize) -> Result<u8> {
    buf.get(offset).copied().ok_or(ProtocolError::Truncated {
        needed: offset + 1,
        available: buf.len(),
    })
}

/// Serialize a client packet (uncompressed)
pub fn encode_client_packet(packet: &ClientPacket) -> BytesMut {
    let mut buf = BytesMut::with_capacity(16);
    buf.put_u8(packet.code().to_u8());

    match packet {
        ClientPacket::BeginConnection { protocol_version } => buf.put_u8(*protocol_version),
        ClientPacket::Password { hex_digest } => write_string(&mut buf, hex_digest),
        ClientPacket::Command { text } => write_string(&mut buf, text),
        ClientPacket::Pong | ClientPacket::Disconnect => {}
    }

    buf
}

/// Parse a client packet, `None` for an unknown type byte
pub fn decode_client_packet(buf: &[u8]) -> Result<Option<ClientPacket>> {
    let code = byte_at(buf, 0).map_err(|_| ProtocolError::EmptyDatagram)?;

    let packet = match ClientCode::from_u8(code) {
        Some(ClientCode::BeginConnection) => ClientPacket::BeginConnection {
            protocol_version: byte_at(buf, 1)?,
        },
        Some(ClientCode::Password) => ClientPacket::Password {
            hex_digest: read_string(buf, 1)?.0,
        },
        Some(ClientCode::Command) => ClientPacket::Command {
            text: read_string(buf, 1)?.0,
        },
        Some(ClientCode::Pong) => ClientPacket::Pong,
        Some(ClientCode::Disconnect) => ClientPacket::Disconnect,
        None => return Ok(None),
    };

    Ok(Some(packet))
}

/// Serialize a server packet (uncompressed)
///
/// A player list longer than 255 names is cut to the first 255.
pub fn encode_server_packet(packet: &ServerPacket) -> BytesMut {
    let mut buf = BytesMut::with_capacity(64);

    buf.put_u8(packet.type_byte());

    match packet {
        ServerPacket::Salt { salt } => {
            buf.put_slice(salt);
            buf.put_u8(0);
        }
        ServerPacket::Message { text } => write_string(&mut buf, text),
        ServerPacket::Update(update) => encode_update(update, &mut buf),
        ServerPacket::OldProtocol
        | ServerPacket::Banned
        | ServerPacket::LoggedIn
        | ServerPacket::InvalidPassword
        | ServerPacket::Unknown(_) => {}
    }

    buf
}

fn encode_update(update: &Update, buf: &mut BytesMut) {
    match update {
        Update::PlayerData { names } => {
            let count = names.len().min(u8::MAX as usize);
            buf.put_u8(UpdateCode::PlayerData.to_u8());
            buf.put_u8(count as u8);
            for name in names.iter().take(count) {
                write_string(buf, name);
            }
        }
        Update::AdminCount { count } => {
            buf.put_u8(UpdateCode::AdminCount.to_u8());
            buf.put_u8(*count);
        }
        Update::Map { name } => {
            buf.put_u8(UpdateCode::Map.to_u8());
            write_string(buf, name);
        }
        Update::Unknown(subtype) => buf.put_u8(*subtype),
    }
}

/// Parse a server packet (uncompressed)
pub fn decode_server_packet(buf: &[u8]) -> Result<ServerPacket> {
    let code = byte_at(buf, 0).map_err(|_| ProtocolError::EmptyDatagram)?;

    let packet = match ServerCode::from_u8(code) {
        Some(ServerCode::OldProtocol) => ServerPacket::OldProtocol,
        Some(ServerCode::Banned) => ServerPacket::Banned,
        Some(ServerCode::Salt) => {
            if buf.len() != SALT_PACKET_LEN {
                return Err(ProtocolError::MalformedSalt { len: buf.len() });
            }
            let mut salt = [0u8; SALT_LEN];
            salt.copy_from_slice(&buf[1..=SALT_LEN]);
            ServerPacket::Salt { salt }
        }
        // Real servers append a status block here; nothing in it is needed
        Some(ServerCode::LoggedIn) => ServerPacket::LoggedIn,
        Some(ServerCode::InvalidPassword) => ServerPacket::InvalidPassword,
        Some(ServerCode::Message) => ServerPacket::Message {
            text: read_string(buf, 1)?.0,
        },
        Some(ServerCode::Update) => ServerPacket::Update(decode_update(buf)?),
        None => ServerPacket::Unknown(code),
    };

    Ok(packet)
}

fn decode_update(buf: &[u8]) -> Result<Update> {
    let subtype = byte_at(buf, 1)?;

    let update = match UpdateCode::from_u8(subtype) {
        Some(UpdateCode::PlayerData) => {
            let count = byte_at(buf, 2)?;
            let mut names = Vec::with_capacity(count as usize);
            let mut offset = 3;
            for _ in 0..count {
                let (name, next) = read_string(buf, offset)?;
                names.push(name);
                offset = next;
            }
            Update::PlayerData { names }
        }
        Some(UpdateCode::AdminCount) => Update::AdminCount {
            count: byte_at(buf, 2)?,
        },
        Some(UpdateCode::Map) => Update::Map {
            name: read_string(buf, 2)?.0,
        },
        None => Update::Unknown(subtype),
    };

    Ok(update)
}
