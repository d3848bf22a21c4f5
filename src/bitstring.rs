//! # Bit-packed Status Lists
//!
//! The in-memory representation of a status list: a fixed-length sequence of
//! status codes, each `bits_per_status` wide. The compressed byte form packs
//! codes into bytes least-significant-bits first (the Token Status List
//! layout) and applies a zlib pass; compression and decompression are exact
//! inverses.
//!
//! [Token Status List](https://datatracker.ietf.org/doc/draft-ietf-oauth-status-list/)

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::{Error, Result};

/// Allowed widths for a single status code in the packed byte array.
#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Serialize_repr, PartialEq, Eq)]
#[repr(u8)]
pub enum BitsPerStatus {
    /// 1 bit per status (2 states).
    One = 1,

    /// 2 bits per status (4 states).
    #[default]
    Two = 2,

    /// 4 bits per status (16 states).
    Four = 4,

    /// 8 bits per status (256 states).
    Eight = 8,
}

impl BitsPerStatus {
    /// Width in bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// The largest status code representable at this width.
    #[must_use]
    pub const fn max_value(self) -> u8 {
        match self {
            Self::One => 0b1,
            Self::Two => 0b11,
            Self::Four => 0b1111,
            Self::Eight => u8::MAX,
        }
    }
}

/// A fixed-length array of status codes, one per referenced credential.
///
/// Created zero-filled (all credentials valid) at list-creation time and
/// mutated in place by single-index updates. The list is never resized; the
/// compressed form is the durable artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitString {
    statuses: Vec<u8>,
    bits: BitsPerStatus,
}

impl BitString {
    /// Create a list of `length` slots, all set to zero (valid).
    #[must_use]
    pub fn new(length: usize, bits: BitsPerStatus) -> Self {
        Self {
            statuses: vec![0; length],
            bits,
        }
    }

    /// Create a list from pre-existing status codes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStatus`] if any code does not fit in `bits`.
    pub fn from_statuses(statuses: Vec<u8>, bits: BitsPerStatus) -> Result<Self> {
        if let Some(&value) = statuses.iter().find(|&&v| v > bits.max_value()) {
            return Err(Error::InvalidStatus {
                value,
                bits: bits.bits(),
            });
        }
        Ok(Self { statuses, bits })
    }

    /// Number of slots in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// `true` if the list has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Width of each status code.
    #[must_use]
    pub const fn bits_per_status(&self) -> BitsPerStatus {
        self.bits
    }

    /// Raw status codes, one per slot.
    #[must_use]
    pub fn statuses(&self) -> &[u8] {
        &self.statuses
    }

    /// The status code at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] when `index` is outside `[0, len)`.
    pub fn get(&self, index: usize) -> Result<u8> {
        self.statuses.get(index).copied().ok_or(Error::Range {
            index,
            length: self.statuses.len(),
        })
    }

    /// Set the status code at `index`. No other slot is affected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] when `index` is outside `[0, len)`, or
    /// [`Error::InvalidStatus`] when `value` does not fit in the list's bit
    /// width.
    pub fn set(&mut self, index: usize, value: u8) -> Result<()> {
        if value > self.bits.max_value() {
            return Err(Error::InvalidStatus {
                value,
                bits: self.bits.bits(),
            });
        }
        let length = self.statuses.len();
        let slot = self.statuses.get_mut(index).ok_or(Error::Range { index, length })?;
        *slot = value;
        Ok(())
    }

    /// Pack status codes into bytes. The code for slot `i` occupies the bits
    /// starting at position `i * bits % 8` (counting from the least
    /// significant bit) of byte `i * bits / 8`; the final byte is
    /// zero-padded.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let bits = self.bits.bits() as usize;
        let mut bytes = vec![0u8; (self.statuses.len() * bits).div_ceil(8)];
        for (i, &code) in self.statuses.iter().enumerate() {
            let position = i * bits;
            bytes[position / 8] |= code << (position % 8);
        }
        bytes
    }

    /// Unpack a byte array into status codes. The list length is derived
    /// from the byte count: `bytes.len() * 8 / bits`.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], bits: BitsPerStatus) -> Self {
        let width = bits.bits() as usize;
        let mask = bits.max_value();
        let statuses = (0..bytes.len() * 8 / width)
            .map(|i| {
                let position = i * width;
                (bytes[position / 8] >> (position % 8)) & mask
            })
            .collect();
        Self { statuses, bits }
    }

    /// Pack and zlib-compress the list.
    ///
    /// # Errors
    ///
    /// Returns an error if the zlib compression fails.
    pub fn compress(&self) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder
            .write_all(&self.to_bytes())
            .map_err(|e| Error::Validation(format!("failed to compress status list: {e}")))?;
        encoder
            .finish()
            .map_err(|e| Error::Validation(format!("failed to compress status list: {e}")))
    }

    /// Decompress and unpack a list previously produced by [`compress`].
    /// Inverse of [`compress`] for every valid list.
    ///
    /// [`compress`]: Self::compress
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the input is not valid zlib data.
    pub fn decompress(bytes: &[u8], bits: BitsPerStatus) -> Result<Self> {
        let mut decoder = ZlibDecoder::new(bytes);
        let mut unpacked = Vec::new();
        decoder
            .read_to_end(&mut unpacked)
            .map_err(|e| Error::Validation(format!("failed to decompress status list: {e}")))?;
        Ok(Self::from_bytes(&unpacked, bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_widths() {
        for bits in [BitsPerStatus::One, BitsPerStatus::Two, BitsPerStatus::Four, BitsPerStatus::Eight]
        {
            let mut list = BitString::new(1000, bits);
            list.set(0, 1).expect("should set");
            list.set(999, bits.max_value()).expect("should set");
            list.set(500, 1).expect("should set");

            let compressed = list.compress().expect("should compress");
            let expanded =
                BitString::decompress(&compressed, bits).expect("should decompress");
            assert_eq!(expanded, list);
        }
    }

    #[test]
    fn single_index_isolation() {
        let mut list = BitString::new(64, BitsPerStatus::Two);
        list.set(7, 2).expect("should set");

        assert_eq!(list.get(7).unwrap(), 2);
        for i in (0..64).filter(|&i| i != 7) {
            assert_eq!(list.get(i).unwrap(), 0, "slot {i} should be untouched");
        }
    }

    #[test]
    fn bounds_enforced() {
        let mut list = BitString::new(10, BitsPerStatus::One);
        assert!(matches!(list.get(10), Err(Error::Range { index: 10, length: 10 })));
        assert!(matches!(list.set(11, 1), Err(Error::Range { index: 11, length: 10 })));
        assert!(list.get(9).is_ok());
    }

    #[test]
    fn value_width_enforced() {
        let mut list = BitString::new(10, BitsPerStatus::Two);
        assert!(matches!(list.set(0, 4), Err(Error::InvalidStatus { value: 4, bits: 2 })));
        assert!(list.set(0, 3).is_ok());
    }

    #[test]
    fn packing_is_lsb_first() {
        // token status list example layout: 1-bit statuses 1,0,0,1,1,1,0,1
        // pack into 0xB9 with index 0 at the least significant bit.
        let list =
            BitString::from_statuses(vec![1, 0, 0, 1, 1, 1, 0, 1], BitsPerStatus::One).unwrap();
        assert_eq!(list.to_bytes(), vec![0xB9]);

        // 2-bit statuses 1,2,0,3 pack into 0b11_00_10_01.
        let list = BitString::from_statuses(vec![1, 2, 0, 3], BitsPerStatus::Two).unwrap();
        assert_eq!(list.to_bytes(), vec![0xC9]);
    }

    #[test]
    fn derived_length_rounds_up() {
        let list = BitString::new(3, BitsPerStatus::Two);
        let compressed = list.compress().unwrap();
        let expanded = BitString::decompress(&compressed, BitsPerStatus::Two).unwrap();
        assert_eq!(expanded.len(), 4);
    }
}
