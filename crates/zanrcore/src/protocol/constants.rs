//! Protocol constants

use std::time::Duration;

/// RCON protocol version sent in the connection request
pub const PROTOCOL_VERSION: u8 = 3;

/// Default server port
pub const DEFAULT_PORT: u16 = 10666;

/// Length of the salt sent by the server
pub const SALT_LEN: usize = 32;

/// Total size of a salt response: type byte, salt, terminator
pub const SALT_PACKET_LEN: usize = SALT_LEN + 2;

/// Interval between keepalive pongs
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(5);

/// Maximum datagram size we accept from the server
pub const MAX_DATAGRAM_SIZE: usize = 8192;
