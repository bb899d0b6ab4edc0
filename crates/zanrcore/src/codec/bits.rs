//! Bit-level reading and writing

use serde::{Deserialize, Serialize};

/// Order in which bits fill a byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitOrder {
    /// First bit goes to the least significant position
    #[default]
    LsbFirst,
    /// First bit goes to the most significant position
    MsbFirst,
}

impl BitOrder {
    #[inline]
    const fn mask(self, index: u8) -> u8 {
        match self {
            Self::LsbFirst => 1 << index,
            Self::MsbFirst => 0x80 >> index,
        }
    }
}

/// Appends bits to a growing byte buffer
pub struct BitWriter {
    bytes: Vec<u8>,
    used: u8,
    order: BitOrder,
}

impl BitWriter {
    pub fn new(order: BitOrder) -> Self {
        Self {
            bytes: Vec::new(),
            used: 0,
            order,
        }
    }

    pub fn push(&mut self, bit: bool) {
        if self.used == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= self.order.mask(self.used);
            }
        }
        self.used = (self.used + 1) % 8;
    }

    pub fn extend(&mut self, bits: &[bool]) {
        for &bit in bits {
            self.push(bit);
        }
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Finish the stream, returning the bytes and the count of zero pad bits
    /// in the final byte
    pub fn finish(self) -> (Vec<u8>, u8) {
        let pad = if self.used == 0 { 0 } else { 8 - self.used };
        (self.bytes, pad)
    }
}

/// Reads individual bits from a byte slice
pub struct BitReader<'a> {
    bytes: &'a [u8],
    order: BitOrder,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8], order: BitOrder) -> Self {
        Self { bytes, order }
    }

    /// Bit at the given stream position, `None` past the end
    #[inline]
    pub fn bit(&self, position: usize) -> Option<bool> {
        let byte = self.bytes.get(position / 8)?;
        Some(byte & self.order.mask((position % 8) as u8) != 0)
    }
}
