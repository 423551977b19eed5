//! Bit-level input for LZSS-family decoders.
//!
//! This module provides [`BitReader`], a sequential bit cursor over a byte
//! slice. Archive formats disagree on how bits are packed into bytes, so the
//! order is part of the reader's configuration.
//!
//! # Bit Ordering
//!
//! - [`BitOrder::Msb`]: each byte is consumed from its high bit downward, and
//!   the first bit read becomes the most significant bit of a multi-bit value.
//! - [`BitOrder::Lsb`]: each byte is consumed from its low bit upward, and the
//!   first bit read becomes the least significant bit of a multi-bit value
//!   (DEFLATE/LZH style).
//!
//! # Example
//!
//! ```
//! use oxilz_core::bitstream::{BitOrder, BitReader};
//!
//! let data = [0b1011_0001];
//!
//! let mut msb = BitReader::new(&data, BitOrder::Msb);
//! assert_eq!(msb.read_bits(3).unwrap(), 0b101);
//!
//! let mut lsb = BitReader::new(&data, BitOrder::Lsb);
//! assert_eq!(lsb.read_bits(3).unwrap(), 0b001);
//! ```

use crate::error::{OxiLzError, Result};

/// Order in which bits are taken out of each input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BitOrder {
    /// Most significant bit first.
    #[default]
    Msb,
    /// Least significant bit first.
    Lsb,
}

impl std::fmt::Display for BitOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Msb => write!(f, "msb"),
            Self::Lsb => write!(f, "lsb"),
        }
    }
}

/// Maximum number of bits a single `read_bits` call may assemble.
pub const MAX_READ_BITS: u8 = 32;

/// A sequential bit reader over a byte slice.
///
/// The reader holds one byte at a time plus the number of bits already taken
/// from it, and loads the next byte only when a read needs it.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Input data.
    data: &'a [u8],
    /// Index of the next byte to load.
    byte_pos: usize,
    /// Byte currently being consumed.
    current: u8,
    /// Bits already taken from `current` (8 = nothing left).
    bit_offset: u8,
    /// Bit order within each byte.
    order: BitOrder,
    /// Total bits read (for error reporting).
    total_bits_read: u64,
}

impl<'a> BitReader<'a> {
    /// Create a new reader over `data` with the given bit order.
    pub fn new(data: &'a [u8], order: BitOrder) -> Self {
        Self {
            data,
            byte_pos: 0,
            current: 0,
            bit_offset: 8,
            order,
            total_bits_read: 0,
        }
    }

    /// Get the total number of bits read so far.
    pub fn bit_position(&self) -> u64 {
        self.total_bits_read
    }

    /// Number of input bytes touched so far (including a partially read one).
    pub fn byte_position(&self) -> usize {
        self.byte_pos
    }

    /// Number of unread bits left in the input.
    pub fn remaining_bits(&self) -> u64 {
        let pending = u64::from(8 - self.bit_offset);
        pending + (self.data.len() - self.byte_pos) as u64 * 8
    }

    /// Check whether every bit has been consumed.
    pub fn is_eof(&self) -> bool {
        self.remaining_bits() == 0
    }

    /// Mark the input as fully consumed.
    fn exhaust(&mut self) {
        self.byte_pos = self.data.len();
        self.bit_offset = 8;
    }

    /// Load the next byte if the current one is used up.
    #[inline]
    fn refill(&mut self) -> Result<()> {
        if self.bit_offset < 8 {
            return Ok(());
        }
        match self.data.get(self.byte_pos) {
            Some(&byte) => {
                self.current = byte;
                self.byte_pos += 1;
                self.bit_offset = 0;
                Ok(())
            }
            None => Err(OxiLzError::end_of_input(self.total_bits_read)),
        }
    }

    /// Read a single bit, returned as 0 or 1.
    #[inline]
    pub fn read_bit(&mut self) -> Result<u32> {
        self.refill()?;
        let bit = match self.order {
            BitOrder::Msb => (self.current >> (7 - self.bit_offset)) & 1,
            BitOrder::Lsb => (self.current >> self.bit_offset) & 1,
        };
        self.bit_offset += 1;
        self.total_bits_read += 1;
        Ok(u32::from(bit))
    }

    /// Read up to 32 bits in the configured order.
    ///
    /// Fails with `EndOfInput` if fewer than `count` bits remain; in that case
    /// the reader is left exhausted rather than half-advanced.
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        if count > MAX_READ_BITS {
            return Err(OxiLzError::configuration(format!(
                "cannot read {count} bits at once (max {MAX_READ_BITS})"
            )));
        }
        if count == 0 {
            return Ok(0);
        }
        if self.remaining_bits() < u64::from(count) {
            let position = self.total_bits_read;
            self.exhaust();
            return Err(OxiLzError::end_of_input(position));
        }

        let mut value: u64 = 0;
        let mut filled: u8 = 0;
        while filled < count {
            self.refill()?;
            let avail = 8 - self.bit_offset;
            let take = avail.min(count - filled);
            let mask = (1u32 << take) - 1;
            let current = u32::from(self.current);
            match self.order {
                BitOrder::Msb => {
                    let bits = (current >> (avail - take)) & mask;
                    value = (value << take) | u64::from(bits);
                }
                BitOrder::Lsb => {
                    let bits = (current >> self.bit_offset) & mask;
                    value |= u64::from(bits) << filled;
                }
            }
            self.bit_offset += take;
            filled += take;
        }

        self.total_bits_read += u64::from(count);
        Ok(value as u32)
    }

    /// Read 8 bits in the configured order.
    ///
    /// On a byte-aligned reader this is simply the next input byte.
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Look at the next input byte without consuming it.
    ///
    /// Only meaningful on a byte-aligned reader; returns `None` mid-byte or
    /// at the end of input.
    pub fn peek_byte(&self) -> Option<u8> {
        if self.bit_offset != 8 {
            return None;
        }
        self.data.get(self.byte_pos).copied()
    }

    /// Read zero bits until a one bit, returning the length of the zero run.
    ///
    /// The terminating one bit is consumed. Used by unary and Elias-gamma
    /// style length fields.
    pub fn count_zero_bits_then_one(&mut self) -> Result<u32> {
        let mut zeros = 0;
        while self.read_bit()? == 0 {
            zeros += 1;
        }
        Ok(zeros)
    }

    /// Discard the unread bits of a partially consumed byte.
    pub fn align_to_byte(&mut self) {
        if self.bit_offset != 0 && self.bit_offset != 8 {
            self.total_bits_read += u64::from(8 - self.bit_offset);
            self.bit_offset = 8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_single_bits() {
        // 0b10110101 = 0xB5
        let data = [0xB5];
        let mut reader = BitReader::new(&data, BitOrder::Msb);

        let bits: Vec<u32> = (0..8).map(|_| reader.read_bit().unwrap()).collect();
        assert_eq!(bits, vec![1, 0, 1, 1, 0, 1, 0, 1]);
        assert!(reader.is_eof());
    }

    #[test]
    fn test_lsb_single_bits() {
        let data = [0xB5];
        let mut reader = BitReader::new(&data, BitOrder::Lsb);

        let bits: Vec<u32> = (0..8).map(|_| reader.read_bit().unwrap()).collect();
        assert_eq!(bits, vec![1, 0, 1, 0, 1, 1, 0, 1]);
    }

    #[test]
    fn test_msb_cross_byte() {
        let data = [0xAB, 0xCD];
        let mut reader = BitReader::new(&data, BitOrder::Msb);

        assert_eq!(reader.read_bits(4).unwrap(), 0xA);
        assert_eq!(reader.read_bits(8).unwrap(), 0xBC); // Crosses byte boundary
        assert_eq!(reader.read_bits(4).unwrap(), 0xD);
    }

    #[test]
    fn test_lsb_cross_byte() {
        let data = [0xFF, 0x00];
        let mut reader = BitReader::new(&data, BitOrder::Lsb);

        assert_eq!(reader.read_bits(4).unwrap(), 0xF);
        assert_eq!(reader.read_bits(8).unwrap(), 0x0F);
        assert_eq!(reader.read_bits(4).unwrap(), 0x0);
    }

    #[test]
    fn test_read_32_bits() {
        let data = [0x12, 0x34, 0x56, 0x78];

        let mut msb = BitReader::new(&data, BitOrder::Msb);
        assert_eq!(msb.read_bits(32).unwrap(), 0x1234_5678);

        let mut lsb = BitReader::new(&data, BitOrder::Lsb);
        assert_eq!(lsb.read_bits(32).unwrap(), 0x7856_3412);
    }

    #[test]
    fn test_read_byte_aligned_ignores_order() {
        let data = [0x5A, 0xC3];
        let mut msb = BitReader::new(&data, BitOrder::Msb);
        let mut lsb = BitReader::new(&data, BitOrder::Lsb);

        assert_eq!(msb.read_byte().unwrap(), 0x5A);
        assert_eq!(lsb.read_byte().unwrap(), 0x5A);
        assert_eq!(msb.read_byte().unwrap(), 0xC3);
        assert_eq!(lsb.read_byte().unwrap(), 0xC3);
    }

    #[test]
    fn test_end_of_input() {
        let data = [0xFF];
        let mut reader = BitReader::new(&data, BitOrder::Msb);

        assert_eq!(reader.read_bits(5).unwrap(), 0x1F);
        let err = reader.read_bits(4).unwrap_err();
        assert!(err.is_end_of_input());
        // A failed read exhausts the reader instead of leaving stray bits
        assert!(reader.is_eof());
        assert!(reader.read_bit().unwrap_err().is_end_of_input());
    }

    #[test]
    fn test_empty_input() {
        let mut reader = BitReader::new(&[], BitOrder::Lsb);
        assert!(reader.is_eof());
        assert!(reader.read_bit().is_err());
        assert_eq!(reader.read_bits(0).unwrap(), 0);
    }

    #[test]
    fn test_too_many_bits() {
        let data = [0u8; 8];
        let mut reader = BitReader::new(&data, BitOrder::Msb);
        assert!(matches!(
            reader.read_bits(33),
            Err(OxiLzError::Configuration { .. })
        ));
    }

    #[test]
    fn test_count_zero_bits_then_one() {
        // MSB: 0001 01 1 0
        let data = [0b0001_0110];
        let mut reader = BitReader::new(&data, BitOrder::Msb);

        assert_eq!(reader.count_zero_bits_then_one().unwrap(), 3);
        assert_eq!(reader.count_zero_bits_then_one().unwrap(), 1);
        assert_eq!(reader.count_zero_bits_then_one().unwrap(), 0);
        assert!(reader.count_zero_bits_then_one().is_err());
    }

    #[test]
    fn test_align_to_byte() {
        let data = [0xFF, 0xAA];
        let mut reader = BitReader::new(&data, BitOrder::Lsb);

        reader.read_bits(3).unwrap();
        reader.align_to_byte();
        assert_eq!(reader.bit_position(), 8);
        assert_eq!(reader.read_bits(8).unwrap(), 0xAA);
    }

    #[test]
    fn test_peek_byte() {
        let data = [0x7F, 0xFF];
        let mut reader = BitReader::new(&data, BitOrder::Msb);

        assert_eq!(reader.peek_byte(), Some(0x7F));
        assert_eq!(reader.read_byte().unwrap(), 0x7F);
        assert_eq!(reader.peek_byte(), Some(0xFF));
        reader.read_bit().unwrap();
        assert_eq!(reader.peek_byte(), None);
    }

    #[test]
    fn test_positions() {
        let data = [0x00, 0x00, 0x00];
        let mut reader = BitReader::new(&data, BitOrder::Msb);

        reader.read_bits(9).unwrap();
        assert_eq!(reader.bit_position(), 9);
        assert_eq!(reader.byte_position(), 2);
        assert_eq!(reader.remaining_bits(), 15);
    }
}
