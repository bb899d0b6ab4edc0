//! Codec implementations for compressing and framing RCON datagrams

pub mod bits;
pub mod huffman;
pub mod packet_codec;
pub mod rcon_codec;

pub use bits::BitOrder;
pub use huffman::HuffmanCodec;
pub use packet_codec::{
    decode_client_packet, decode_server_packet, encode_client_packet, encode_server_packet,
    read_string, write_string,
};
pub use rcon_codec::RconCodec;
