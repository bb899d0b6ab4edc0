//! Protocol definitions and structures

pub mod constants;
pub mod frequencies;
pub mod packet;
pub mod types;

pub use constants::*;
pub use frequencies::FrequencyTable;
pub use packet::{ClientPacket, ServerPacket, Update};
pub use types::{ClientCode, ServerCode, UpdateCode};
