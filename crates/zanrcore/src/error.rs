//! Error types

use crate::session::SessionState;
use thiserror::Error;

/// Huffman framing and bitstream errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HuffmanError {
    #[error("Invalid compression header: 0x{0:02X}")]
    InvalidHeader(u8),

    #[error("Padding of {pad} bits exceeds a {available}-bit payload")]
    InvalidPadding { pad: u8, available: usize },

    #[error("Corrupt compressed stream at bit {0}")]
    Corrupt(usize),
}

/// Protocol errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Empty datagram")]
    EmptyDatagram,

    #[error("Null-terminator not found after offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("Salt response is {len} bytes, expected a 32-byte salt")]
    MalformedSalt { len: usize },

    #[error("Truncated packet: needed {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },

    #[error("Datagram too large: {size} bytes (max: {max})")]
    DatagramTooLarge { size: usize, max: usize },

    #[error("Compression error: {0}")]
    Huffman(#[from] HuffmanError),
}

/// Frequency table loading errors
#[derive(Error, Debug)]
pub enum FrequencyError {
    #[error("Frequency table has {0} entries, expected 256")]
    WrongLength(usize),

    #[error("Frequency for byte {symbol} is not a finite non-negative number")]
    InvalidWeight { symbol: usize },

    #[error("Invalid frequency table JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reason the server refused a connection attempt
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("RCON protocol is out of date")]
    OldProtocol,

    #[error("You are banned from the server")]
    Banned,

    #[error("Invalid password")]
    InvalidPassword,
}

/// Failures reported by a session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Malformed datagram
    #[error("Malformed datagram: {0}")]
    Protocol(#[from] ProtocolError),

    /// Connection attempt refused by the server
    #[error("{0}")]
    Auth(#[from] AuthFailure),

    #[error("Unrecognized response: type {0}")]
    UnrecognizedResponse(u8),

    #[error("Unrecognized update: subtype {0}")]
    UnrecognizedUpdate(u8),

    /// A known response that makes no sense in the current state
    #[error("{packet} response while {state}")]
    UnexpectedResponse {
        packet: &'static str,
        state: SessionState,
    },

    /// Operation not permitted in the current state
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("Could not resolve {host}: {reason}")]
    Network { host: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
