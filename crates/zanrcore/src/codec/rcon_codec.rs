//! Datagram codec combining compression and packet layouts

use super::huffman::HuffmanCodec;
use super::packet_codec::{decode_server_packet, encode_client_packet};
use crate::error::{ProtocolError, Result};
use crate::protocol::{ClientPacket, MAX_DATAGRAM_SIZE, ServerPacket};
use std::sync::Arc;

/// Codec for client-side RCON datagrams
#[derive(Debug, Clone)]
pub struct RconCodec {
    huffman: Arc<HuffmanCodec>,
    // Maximum datagram size to prevent oversized allocations
    max_size: usize,
}

impl RconCodec {
    /// Create a codec around a shared compression tree
    pub fn new(huffman: Arc<HuffmanCodec>) -> Self {
        Self {
            huffman,
            max_size: MAX_DATAGRAM_SIZE,
        }
    }

    /// Create a codec with a custom max datagram size
    pub fn with_max_size(huffman: Arc<HuffmanCodec>, max_size: usize) -> Self {
        Self { huffman, max_size }
    }

    /// The compression tree in use
    pub fn huffman(&self) -> &HuffmanCodec {
        &self.huffman
    }

    /// Compress and serialize a client packet
    pub fn encode_packet(&self, packet: &ClientPacket) -> Vec<u8> {
        self.huffman.encode(&encode_client_packet(packet))
    }

    /// Decompress and parse a server datagram
    pub fn decode_datagram(&self, datagram: &[u8]) -> Result<ServerPacket> {
        if datagram.len() > self.max_size {
            return Err(ProtocolError::DatagramTooLarge {
                size: datagram.len(),
                max: self.max_size,
            });
        }

        let payload = self.huffman.decode(datagram)?;
        decode_server_packet(&payload)
    }
}

impl Default for RconCodec {
    fn default() -> Self {
        Self::new(Arc::new(HuffmanCodec::default()))
    }
}
