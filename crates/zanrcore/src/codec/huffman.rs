//! Static Huffman compression for RCON datagrams
//!
//! Every datagram starts with a header byte. `0xFF` marks an uncompressed
//! payload; `0..=7` is the number of zero pad bits at the end of the final
//! payload byte of a compressed bitstream.

use super::bits::{BitOrder, BitReader, BitWriter};
use crate::error::{HuffmanError, ProtocolError, Result};
use crate::protocol::FrequencyTable;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Header byte marking an uncompressed payload
pub const RAW_MARKER: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Leaf(u8),
    Internal { left: usize, right: Option<usize> },
}

/// Min-heap entry ordered by weight, then by node creation order
struct HeapEntry {
    weight: f64,
    node: usize,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

/// Compression tree and its derived code table
#[derive(Debug, Clone)]
pub struct HuffmanCodec {
    nodes: Vec<Node>,
    root: Option<usize>,
    codes: Vec<Option<Vec<bool>>>,
    order: BitOrder,
}

impl HuffmanCodec {
    /// Build the codec with the default bit order
    pub fn new(table: &FrequencyTable) -> Self {
        Self::with_bit_order(table, BitOrder::default())
    }

    /// Build the tree from a frequency table
    ///
    /// Symbols with zero weight get no code and are only sent uncompressed.
    pub fn with_bit_order(table: &FrequencyTable, order: BitOrder) -> Self {
        let mut nodes = Vec::with_capacity(511);
        let mut heap = BinaryHeap::with_capacity(256);

        for symbol in 0..=u8::MAX {
            let weight = table.weight(symbol);
            if weight > 0.0 {
                heap.push(HeapEntry {
                    weight,
                    node: nodes.len(),
                });
                nodes.push(Node::Leaf(symbol));
            }
        }

        let root = match heap.len() {
            0 => None,
            1 => {
                // A lone symbol still needs one bit per occurrence
                let left = heap.pop().map(|entry| entry.node).unwrap_or_default();
                nodes.push(Node::Internal { left, right: None });
                Some(nodes.len() - 1)
            }
            _ => {
                while let (Some(first), Some(second)) = (heap.pop(), heap.pop()) {
                    nodes.push(Node::Internal {
                        left: first.node,
                        right: Some(second.node),
                    });
                    heap.push(HeapEntry {
                        weight: first.weight + second.weight,
                        node: nodes.len() - 1,
                    });
                    if heap.len() == 1 {
                        break;
                    }
                }
                heap.pop().map(|entry| entry.node)
            }
        };

        let codes = build_codes(&nodes, root);

        Self {
            nodes,
            root,
            codes,
            order,
        }
    }

    /// Code for a byte value, `None` if the symbol is not in the tree
    pub fn code(&self, symbol: u8) -> Option<&[bool]> {
        self.codes[symbol as usize].as_deref()
    }

    /// Bit order used on the wire
    pub fn bit_order(&self) -> BitOrder {
        self.order
    }

    /// Compress a payload into a datagram
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let mut writer = BitWriter::new(self.order);

        for &byte in data {
            let Some(code) = self.code(byte) else {
                return raw(data);
            };
            writer.extend(code);
            if writer.len() > data.len() {
                return raw(data);
            }
        }

        let (bits, pad) = writer.finish();
        if !data.is_empty() && bits.len() >= data.len() {
            return raw(data);
        }

        let mut out = Vec::with_capacity(bits.len() + 1);
        out.push(pad);
        out.extend_from_slice(&bits);
        out
    }

    /// Decompress a datagram into its payload
    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let (&header, payload) = data.split_first().ok_or(ProtocolError::EmptyDatagram)?;

        if header == RAW_MARKER {
            return Ok(payload.to_vec());
        }
        if header > 7 {
            return Err(HuffmanError::InvalidHeader(header).into());
        }

        let available = payload.len() * 8;
        let pad = header as usize;
        if pad > available {
            return Err(HuffmanError::InvalidPadding {
                pad: header,
                available,
            }
            .into());
        }
        let limit = available - pad;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let root = self.root.ok_or(HuffmanError::Corrupt(0))?;
        let reader = BitReader::new(payload, self.order);
        let mut out = Vec::with_capacity(payload.len() * 2);
        let mut node = root;

        for position in 0..limit {
            let bit = reader.bit(position).ok_or(HuffmanError::Corrupt(position))?;
            node = match self.nodes[node] {
                Node::Internal { left, right } => {
                    if bit {
                        right.ok_or(HuffmanError::Corrupt(position))?
                    } else {
                        left
                    }
                }
                Node::Leaf(_) => return Err(HuffmanError::Corrupt(position).into()),
            };
            if let Node::Leaf(symbol) = self.nodes[node] {
                out.push(symbol);
                node = root;
            }
        }

        if node != root {
            return Err(HuffmanError::Corrupt(limit).into());
        }

        Ok(out)
    }
}

impl Default for HuffmanCodec {
    fn default() -> Self {
        Self::new(&FrequencyTable::default())
    }
}

fn raw(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 1);
    out.push(RAW_MARKER);
    out.extend_from_slice(data);
    out
}

/// Walk the tree from the root, left = 0 and right = 1
fn build_codes(nodes: &[Node], root: Option<usize>) -> Vec<Option<Vec<bool>>> {
    let mut codes = vec![None; 256];
    let mut stack: Vec<(usize, Vec<bool>)> = root.map(|r| (r, Vec::new())).into_iter().collect();

    while let Some((index, path)) = stack.pop() {
        match nodes[index] {
            Node::Leaf(symbol) => codes[symbol as usize] = Some(path),
            Node::Internal { left, right } => {
                if let Some(right) = right {
                    let mut right_path = path.clone();
                    right_path.push(true);
                    stack.push((right, right_path));
                }
                let mut left_path = path;
                left_path.push(false);
                stack.push((left, left_path));
            }
        }
    }

    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_symbol_table(symbol: u8) -> FrequencyTable {
        let mut weights = [0.0; 256];
        weights[symbol as usize] = 3.0;
        FrequencyTable::new(weights).unwrap()
    }

    #[test]
    fn test_roundtrip_edge_inputs() {
        let codec = HuffmanCodec::default();
        let all_bytes: Vec<u8> = (0..=255).collect();
        let inputs: [&[u8]; 5] = [b"", b"a", b"\0", b"say hello world\0", &all_bytes];

        for input in inputs {
            let encoded = codec.encode(input);
            assert_eq!(codec.decode(&encoded).unwrap(), input);
        }
    }

    #[test]
    fn test_roundtrip_mixed_high_bytes() {
        // Mostly text with a few bytes the default table rarely sees
        let mut input = b"say \x80\xE9t\xE9 on MAP01 with the \xFFlazy\xF0 dog\0".to_vec();
        input.extend_from_slice(&[b'e'; 24]);

        for order in [BitOrder::LsbFirst, BitOrder::MsbFirst] {
            let codec = HuffmanCodec::with_bit_order(&FrequencyTable::default(), order);
            let encoded = codec.encode(&input);
            assert_ne!(encoded[0], RAW_MARKER);
            assert!(encoded.len() < input.len());
            assert_eq!(codec.decode(&encoded).unwrap(), input);
        }
    }

    #[test]
    fn test_default_table_codes() {
        let codec = HuffmanCodec::default();
        let bits = |s: &str| s.chars().map(|c| c == '1').collect::<Vec<_>>();

        assert_eq!(codec.code(b' '), Some(&bits("000")[..]));
        assert_eq!(codec.code(0x00), Some(&bits("0100")[..]));
        assert_eq!(codec.code(b'a'), Some(&bits("0010")[..]));
        assert_eq!(codec.code(b'e'), Some(&bits("1100")[..]));
        assert_eq!(codec.code(0x34), Some(&bits("1000010")[..]));
        assert_eq!(codec.code(0xFF), Some(&bits("1111001010101")[..]));

        // 0100 000 plus one pad bit
        assert_eq!(codec.encode(b"\0 "), vec![1, 0x02]);
        let msb = HuffmanCodec::with_bit_order(&FrequencyTable::default(), BitOrder::MsbFirst);
        assert_eq!(msb.encode(b"\0 "), vec![1, 0x40]);
    }

    #[test]
    fn test_roundtrip_msb_first() {
        let codec = HuffmanCodec::with_bit_order(&FrequencyTable::default(), BitOrder::MsbFirst);
        let input = b"\x36map MAP01\0";
        assert_eq!(codec.decode(&codec.encode(input)).unwrap(), input);
    }

    #[test]
    fn test_empty_input_encodes_to_header() {
        let codec = HuffmanCodec::default();
        assert_eq!(codec.encode(b""), vec![0]);
        assert_eq!(codec.decode(&[0]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_text_is_compressed() {
        let codec = HuffmanCodec::default();
        let input = b"the quick brown fox jumps over the lazy dog\0";
        let encoded = codec.encode(input);
        assert_ne!(encoded[0], RAW_MARKER);
        assert!(encoded.len() < input.len());
    }

    #[test]
    fn test_incompressible_input_is_sent_raw() {
        let codec = HuffmanCodec::default();
        let input = [0xF0, 0xF1, 0xF2];
        assert_eq!(codec.encode(&input), vec![RAW_MARKER, 0xF0, 0xF1, 0xF2]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let table = FrequencyTable::default();
        let a = HuffmanCodec::new(&table);
        let b = HuffmanCodec::new(&table);
        for symbol in 0..=255u8 {
            assert_eq!(a.code(symbol), b.code(symbol));
        }
    }

    #[test]
    fn test_equal_weights_are_deterministic() {
        let table = FrequencyTable::new([1.0; 256]).unwrap();
        let a = HuffmanCodec::new(&table);
        let b = HuffmanCodec::new(&table);
        for symbol in 0..=255u8 {
            assert_eq!(a.code(symbol).map(<[bool]>::len), Some(8));
            assert_eq!(a.code(symbol), b.code(symbol));
        }
    }

    #[test]
    fn test_codes_are_prefix_free() {
        let codec = HuffmanCodec::default();
        let codes: Vec<&[bool]> = (0..=255u8).filter_map(|s| codec.code(s)).collect();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a), "code {} is a prefix of code {}", i, j);
                }
            }
        }
    }

    #[test]
    fn test_single_symbol_table() {
        let codec = HuffmanCodec::new(&single_symbol_table(b'a'));
        assert_eq!(codec.code(b'a'), Some(&[false][..]));

        let encoded = codec.encode(b"aaa");
        assert_eq!(encoded, vec![5, 0]);
        assert_eq!(codec.decode(&encoded).unwrap(), b"aaa");

        // Symbols outside the tree fall back to raw framing
        assert_eq!(codec.decode(&codec.encode(b"ab")).unwrap(), b"ab");
    }

    #[test]
    fn test_empty_table_always_sends_raw() {
        let codec = HuffmanCodec::new(&FrequencyTable::new([0.0; 256]).unwrap());
        assert_eq!(codec.encode(b"hi"), vec![RAW_MARKER, b'h', b'i']);
        assert_eq!(codec.decode(&[RAW_MARKER, b'h', b'i']).unwrap(), b"hi");
    }

    #[test]
    fn test_padding_is_not_decoded() {
        // Every symbol of a one-leaf tree is the bit 0, so pad bits would
        // decode as extra symbols if they were not skipped.
        let codec = HuffmanCodec::new(&single_symbol_table(b'z'));
        assert_eq!(codec.decode(&[6, 0]).unwrap(), b"zz");
    }

    #[test]
    fn test_decode_errors() {
        let codec = HuffmanCodec::default();
        assert!(matches!(codec.decode(&[]), Err(ProtocolError::EmptyDatagram)));
        assert!(matches!(
            codec.decode(&[9, 1]),
            Err(ProtocolError::Huffman(HuffmanError::InvalidHeader(9)))
        ));
        assert!(matches!(
            codec.decode(&[3]),
            Err(ProtocolError::Huffman(HuffmanError::InvalidPadding { .. }))
        ));
    }

    #[test]
    fn test_truncated_stream_is_corrupt() {
        let codec = HuffmanCodec::new(&single_symbol_table(b'a'));
        // Bit 1 leads to the missing right child
        assert!(matches!(
            codec.decode(&[7, 1]),
            Err(ProtocolError::Huffman(HuffmanError::Corrupt(0)))
        ));
    }
}
