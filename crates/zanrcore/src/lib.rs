//! # zanrcore
//!
//! Protocol engine for the Zandronum remote console (RCON).
//!
//! This library provides the building blocks for RCON clients, bots and
//! test servers:
//!
//! - Protocol codes and constants (message types, update subtypes)
//! - Static Huffman compression of datagrams
//! - Packet encoding/decoding for both directions
//! - A sans-IO session state machine driving the login handshake
//!
//! ## Example
//!
//! ```rust,no_run
//! use zanrcore::{RconCodec, Session, Output};
//!
//! let mut session = Session::new(RconCodec::default());
//! let server = "127.0.0.1:10666".parse().unwrap();
//! for output in session.connect("password", server).unwrap() {
//!     if let Output::Send { packet, to } = output {
//!         let datagram = session.codec().encode_packet(&packet);
//!         // hand `datagram` to a UDP socket bound for `to`
//!     }
//! }
//! ```

pub mod codec;
pub mod error;
pub mod password;
pub mod protocol;
pub mod session;

// Re-export commonly used types
pub use codec::{BitOrder, HuffmanCodec, RconCodec};
pub use error::{AuthFailure, HuffmanError, ProtocolError, Result, SessionError};
pub use protocol::{ClientPacket, FrequencyTable, ServerPacket, Update};
pub use session::{Output, Session, SessionEvent, SessionState};
