//! Symbol frequency table used to build the compression tree
//!
//! The built-in table favours console text. A server built with a different
//! table can only be talked to after loading that table with
//! [`FrequencyTable::from_json`].

use crate::error::FrequencyError;
use std::path::Path;

/// Weight for each byte value, indexed by the byte
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    weights: [f64; 256],
}

impl FrequencyTable {
    /// Create a table from raw weights
    pub fn new(weights: [f64; 256]) -> Result<Self, FrequencyError> {
        if let Some(symbol) = weights.iter().position(|w| !w.is_finite() || *w < 0.0) {
            return Err(FrequencyError::InvalidWeight { symbol });
        }
        Ok(Self { weights })
    }

    /// Parse a JSON array of exactly 256 numbers
    pub fn from_json(json: &str) -> Result<Self, FrequencyError> {
        let values: Vec<f64> = serde_json::from_str(json)?;
        let weights: [f64; 256] = values
            .try_into()
            .map_err(|v: Vec<f64>| FrequencyError::WrongLength(v.len()))?;
        Self::new(weights)
    }

    /// Load a JSON table from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FrequencyError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Weight of a byte value
    #[inline]
    pub fn weight(&self, symbol: u8) -> f64 {
        self.weights[symbol as usize]
    }

    /// All weights in byte order
    pub fn weights(&self) -> &[f64; 256] {
        &self.weights
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS,
        }
    }
}

#[rustfmt::skip]
const DEFAULT_WEIGHTS: [f64; 256] = [
    180.0, 3.0, 3.0, 3.0, 1.0, 1.0, 1.0, 1.0, // 0x00
    1.0, 1.0, 16.0, 1.0, 1.0, 1.0, 1.0, 1.0, // 0x08
    1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, // 0x10
    1.0, 1.0, 1.0, 1.0, 40.0, 1.0, 1.0, 1.0, // 0x18
    320.0, 6.0, 9.0, 1.0, 1.0, 1.0, 1.0, 8.0, // 0x20
    4.0, 4.0, 1.0, 2.0, 14.0, 10.0, 24.0, 6.0, // 0x28
    30.0, 29.0, 28.0, 27.0, 26.0, 25.0, 24.0, 23.0, // 0x30
    22.0, 21.0, 12.0, 1.0, 1.0, 3.0, 1.0, 5.0, // 0x38
    1.0, 32.8, 6.0, 11.2, 17.2, 50.8, 8.8, 8.0, // 0x40
    24.4, 28.0, 0.6, 3.2, 16.0, 9.6, 26.8, 30.0, // 0x48
    7.6, 0.4, 24.0, 25.2, 36.4, 11.2, 4.0, 9.6, // 0x50
    0.6, 8.0, 0.3, 3.0, 2.0, 3.0, 1.0, 10.0, // 0x58
    1.0, 164.0, 30.0, 56.0, 86.0, 254.0, 44.0, 40.0, // 0x60
    122.0, 140.0, 3.0, 16.0, 80.0, 48.0, 134.0, 150.0, // 0x68
    38.0, 2.0, 120.0, 126.0, 182.0, 56.0, 20.0, 48.0, // 0x70
    3.0, 40.0, 1.4, 1.0, 1.0, 1.0, 1.0, 1.0, // 0x78
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0x80
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0x88
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0x90
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0x98
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0xA0
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0xA8
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0xB0
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0xB8
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0xC0
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0xC8
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0xD0
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0xD8
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0xE0
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0xE8
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0xF0
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, // 0xF8
];
