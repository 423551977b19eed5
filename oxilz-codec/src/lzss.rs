//! Bit-token LZSS decoding.
//!
//! LZSS (Lempel-Ziv-Storer-Szymanski) is a derivative of LZ77 that uses
//! a flag to distinguish between literals and matches. The flag either
//! precedes every token as a single bit, or eight flags are gathered into a
//! control byte ahead of the tokens they describe.

use crate::config::{CompressionConfig, ControlGranularity, LengthCode, MatchLayout, OffsetMode};
use crate::session::DecodeSession;
use oxilz_core::bitstream::{BitOrder, BitReader};
use oxilz_core::error::{OxiLzError, Result};
use oxilz_core::limits::DecodeLimits;
use oxilz_core::traits::{Decoded, Decompressor};
use oxilz_core::window::SlidingWindow;

/// Set in the high byte of the control register while flags remain.
const FLAG_SENTINEL: u16 = 0xFF00;

/// Source of literal/match flags.
#[derive(Debug, Clone, Copy)]
enum ControlState {
    /// One bit per token.
    Bit,
    /// Eight flags per control byte, tracked in a 16-bit shift register.
    Mask {
        /// Flags in the low byte, sentinel bits above them.
        register: u16,
        /// Bit-reverse each control byte so its high bit comes first.
        msb_first: bool,
    },
}

impl ControlState {
    fn for_config(config: &CompressionConfig) -> Self {
        match config.control {
            ControlGranularity::PerByteMask => Self::Mask {
                register: 0,
                msb_first: config.bit_order == BitOrder::Msb,
            },
            _ => Self::Bit,
        }
    }

    /// Read the next token's flag.
    ///
    /// For control masks the register is shifted once per token; when bit 8
    /// runs out the next control byte is loaded with the sentinel OR-ed in,
    /// so each control byte is used for exactly eight tokens.
    #[inline]
    fn next_flag(&mut self, reader: &mut BitReader<'_>) -> Result<bool> {
        match self {
            Self::Bit => Ok(reader.read_bit()? != 0),
            Self::Mask {
                register,
                msb_first,
            } => {
                *register >>= 1;
                if *register & 0x100 == 0 {
                    let mut ctl = reader.read_byte()?;
                    if *msb_first {
                        ctl = ctl.reverse_bits();
                    }
                    *register = u16::from(ctl) | FLAG_SENTINEL;
                }
                Ok(*register & 1 != 0)
            }
        }
    }
}

/// LZSS decoder for per-bit-flag and per-byte-mask streams.
#[derive(Debug, Clone)]
pub struct LzDecoder {
    /// Validated configuration.
    config: CompressionConfig,
}

impl LzDecoder {
    /// Create a decoder, validating the configuration once.
    pub fn new(config: CompressionConfig) -> Result<Self> {
        config.validate()?;
        if config.is_opcode_table() {
            return Err(OxiLzError::configuration(
                "opcode range tables need ThresholdByteLzDecoder",
            ));
        }
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Read a length field of `width` bits (or a gamma code), unbiased.
    fn read_length(&self, reader: &mut BitReader<'_>, width: u8) -> Result<u32> {
        match self.config.length_code {
            LengthCode::Fixed => reader.read_bits(width),
            LengthCode::EliasGamma => {
                let zeros = reader.count_zero_bits_then_one()?;
                if zeros > 24 {
                    return Err(OxiLzError::corrupt(0, format!("{zeros}-bit gamma length")));
                }
                let low = reader.read_bits(zeros as u8)?;
                Ok((1 << zeros) | low)
            }
        }
    }

    /// Read the offset and length fields of a match token.
    ///
    /// Returns the raw offset field and the biased length.
    fn read_match(&self, reader: &mut BitReader<'_>) -> Result<(u32, usize)> {
        let config = &self.config;
        let width = match config.alt_length_bits {
            Some(alt) if reader.read_bit()? != 0 => alt,
            _ => config.length_bits,
        };

        let (offset, length) = match config.match_layout {
            MatchLayout::OffsetFirst => {
                let offset = reader.read_bits(config.offset_bits)?;
                (offset, self.read_length(reader, width)?)
            }
            MatchLayout::LengthFirst => {
                let length = self.read_length(reader, width)?;
                (reader.read_bits(config.offset_bits)?, length)
            }
            MatchLayout::PackedLowHigh => {
                let lo = u32::from(reader.read_byte()?);
                let hi = u32::from(reader.read_byte()?);
                let length_mask = (1u32 << config.length_bits) - 1;
                (lo | (hi >> config.length_bits) << 8, hi & length_mask)
            }
            MatchLayout::PackedHighLow => {
                let hi = u32::from(reader.read_byte()?);
                let lo = u32::from(reader.read_byte()?);
                let word = hi << 8 | lo;
                let length_mask = (1u32 << config.length_bits) - 1;
                (word >> config.length_bits, word & length_mask)
            }
        };

        Ok((offset, length as usize + config.length_bias as usize))
    }

    /// Copy a match out of the window according to the offset mode.
    fn copy_match(&self, window: &mut SlidingWindow, offset: u32, length: usize) -> Result<usize> {
        match self.config.offset_mode {
            OffsetMode::Relative { bias } => {
                window.copy_back(offset as usize + bias as usize, length)
            }
            OffsetMode::Absolute { bias } => {
                let position = (offset as usize + bias as usize) & self.config.window_mask();
                window.copy_from(position, length)
            }
        }
    }

    /// Decode one token.
    #[inline]
    fn step(&self, session: &mut DecodeSession<'_>, control: &mut ControlState) -> Result<()> {
        let flag = control.next_flag(&mut session.reader)?;
        if flag == self.config.literal_flag {
            let byte = session.reader.read_byte()?;
            session.window.put(byte);
        } else {
            let (offset, length) = self.read_match(&mut session.reader)?;
            self.copy_match(&mut session.window, offset, length)?;
        }
        Ok(())
    }
}

impl Decompressor for LzDecoder {
    fn decompress_with_limits(
        &self,
        input: &[u8],
        uncompressed_size: usize,
        limits: &DecodeLimits,
    ) -> Result<Decoded> {
        let mut session = DecodeSession::new(&self.config, input, uncompressed_size, limits)?;
        let mut control = ControlState::for_config(&self.config);

        while !session.window.is_full() {
            session.poll()?;
            match self.step(&mut session, &mut control) {
                Ok(()) => {}
                Err(e) if e.is_end_of_input() => break,
                Err(e) => return Err(session.locate(e)),
            }
        }

        session.finish()
    }
}

/// Decompress a bit-token LZSS stream.
pub fn decode_lzss(
    input: &[u8],
    uncompressed_size: usize,
    config: &CompressionConfig,
) -> Result<Decoded> {
    LzDecoder::new(config.clone())?.decompress(input, uncompressed_size)
}
