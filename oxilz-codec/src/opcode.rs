//! Byte-opcode LZ/RLE decoding.
//!
//! Many formats frame tokens as a single control byte whose numeric range
//! selects the operation, followed by operand bytes. Rather than one
//! hand-written decoder per format, an [`OpcodeTable`] lists the ranges and
//! how each one derives its count and offset from the control byte and the
//! trailing bytes.
//!
//! ```text
//!  ctl byte ─┬─ [start..=end] lookup ──► Opcode
//!            │
//!            ├─ count  = ((ctl >> length_shift) & mask(length_bits))
//!            │           ++ length_bytes trailing bytes (big-endian)
//!            │           + length_bias
//!            │
//!            └─ offset = ((ctl >> ctl_shift) & mask(ctl_bits))
//!                        ++ trailing_bytes (big-endian)
//!                        then + bias, or (1 << bits) - raw when complemented
//! ```

use crate::config::{CompressionConfig, ControlGranularity};
use crate::session::DecodeSession;
use oxilz_core::error::{OxiLzError, Result};
use oxilz_core::limits::DecodeLimits;
use oxilz_core::traits::{Decoded, Decompressor};

/// Offset encoding of a back-reference opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OffsetField {
    /// Control-byte bits forming the high part of the offset.
    pub ctl_bits: u8,
    /// Shift applied to the control byte before taking `ctl_bits`.
    pub ctl_shift: u8,
    /// Trailing operand bytes forming the low part (big-endian, 0..=2).
    pub trailing_bytes: u8,
    /// Added to the raw offset.
    pub bias: u32,
    /// Distance is `(1 << total_bits) - raw` instead of `raw + bias`.
    pub complement: bool,
}

impl OffsetField {
    /// Offset from `trailing_bytes` operand bytes plus `bias`.
    pub const fn bytes(trailing_bytes: u8, bias: u32) -> Self {
        Self {
            ctl_bits: 0,
            ctl_shift: 0,
            trailing_bytes,
            bias,
            complement: false,
        }
    }

    /// Take the high offset bits from the low `ctl_bits` of the control byte.
    pub const fn with_ctl_bits(mut self, ctl_bits: u8) -> Self {
        self.ctl_bits = ctl_bits;
        self
    }

    /// Use `(1 << total_bits) - raw` as the distance.
    pub const fn complemented(mut self) -> Self {
        self.complement = true;
        self
    }

    /// Total width of the raw offset.
    pub fn total_bits(&self) -> u32 {
        u32::from(self.ctl_bits) + 8 * u32::from(self.trailing_bytes)
    }

    /// Largest distance this field can produce.
    pub fn max_distance(&self) -> u64 {
        let span = 1u64 << self.total_bits();
        if self.complement {
            span
        } else {
            span - 1 + u64::from(self.bias)
        }
    }

    fn distance(&self, raw: u32) -> usize {
        if self.complement {
            ((1u64 << self.total_bits()) - u64::from(raw)) as usize
        } else {
            raw as usize + self.bias as usize
        }
    }
}

/// What an opcode does with its count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OpcodeKind {
    /// Copy `count` raw bytes from the input.
    LiteralRun,
    /// Copy `count` bytes from earlier output.
    BackReference(OffsetField),
    /// Emit `count` zero bytes.
    ZeroFill,
    /// Read one fill byte, emit it `count` times.
    ByteFill,
    /// Emit `count` pairs of a zero byte followed by a raw input byte.
    ZeroPaddedLiterals,
}

impl OpcodeKind {
    /// Whether the opcode carries a fill-value operand.
    pub fn has_fill_byte(&self) -> bool {
        matches!(self, Self::ByteFill)
    }
}

/// One entry of an opcode range table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Opcode {
    /// First control byte of the range.
    pub start: u8,
    /// Last control byte of the range (inclusive).
    pub end: u8,
    /// Operation.
    pub kind: OpcodeKind,
    /// Control-byte bits holding the count.
    #[cfg_attr(feature = "serde", serde(default))]
    pub length_bits: u8,
    /// Shift applied to the control byte before taking `length_bits`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub length_shift: u8,
    /// Trailing bytes appended below the control-byte count (big-endian).
    #[cfg_attr(feature = "serde", serde(default))]
    pub length_bytes: u8,
    /// Added to the count.
    #[cfg_attr(feature = "serde", serde(default))]
    pub length_bias: u32,
}

impl Opcode {
    /// Create an entry covering `start..=end` with a zero count.
    pub const fn new(start: u8, end: u8, kind: OpcodeKind) -> Self {
        Self {
            start,
            end,
            kind,
            length_bits: 0,
            length_shift: 0,
            length_bytes: 0,
            length_bias: 0,
        }
    }

    /// Take the count from `bits` control-byte bits above `shift`, plus `bias`.
    pub const fn with_length(mut self, bits: u8, shift: u8, bias: u32) -> Self {
        self.length_bits = bits;
        self.length_shift = shift;
        self.length_bias = bias;
        self
    }

    /// Extend the count with `bytes` trailing operand bytes.
    pub const fn with_length_bytes(mut self, bytes: u8) -> Self {
        self.length_bytes = bytes;
        self
    }

    /// Check whether `ctl` falls in this entry's range.
    pub fn contains(&self, ctl: u8) -> bool {
        (self.start..=self.end).contains(&ctl)
    }
}

/// A set of non-overlapping opcode ranges.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OpcodeTable {
    /// Table entries.
    pub entries: Vec<Opcode>,
    /// Raw bytes copied before the first control byte.
    pub leading_literals: usize,
    /// Control byte followed by this byte ends the stream.
    pub end_marker: Option<[u8; 2]>,
}

impl OpcodeTable {
    /// Create a table from entries.
    pub fn new(entries: Vec<Opcode>) -> Self {
        Self {
            entries,
            leading_literals: 0,
            end_marker: None,
        }
    }

    /// Copy `count` raw bytes before the first control byte.
    pub fn with_leading_literals(mut self, count: usize) -> Self {
        self.leading_literals = count;
        self
    }

    /// Stop decoding at the two-byte sequence `marker`.
    pub fn with_end_marker(mut self, marker: [u8; 2]) -> Self {
        self.end_marker = Some(marker);
        self
    }

    /// Check ranges and field widths against a window size.
    pub fn validate(&self, window_size: usize) -> Result<()> {
        if self.entries.is_empty() {
            return Err(OxiLzError::configuration("opcode table is empty"));
        }

        let mut ranges: Vec<(u8, u8)> = Vec::with_capacity(self.entries.len());
        for op in &self.entries {
            if op.start > op.end {
                return Err(OxiLzError::configuration(format!(
                    "opcode range {:#04x}..={:#04x} is reversed",
                    op.start, op.end
                )));
            }
            if u32::from(op.length_bits) + u32::from(op.length_shift) > 8 {
                return Err(OxiLzError::configuration(format!(
                    "opcode {:#04x}: count bits exceed the control byte",
                    op.start
                )));
            }
            if op.length_bytes > 2 {
                return Err(OxiLzError::configuration(format!(
                    "opcode {:#04x}: at most 2 count bytes",
                    op.start
                )));
            }
            if let OpcodeKind::BackReference(field) = op.kind {
                if u32::from(field.ctl_bits) + u32::from(field.ctl_shift) > 8
                    || field.trailing_bytes > 2
                    || field.total_bits() == 0
                {
                    return Err(OxiLzError::configuration(format!(
                        "opcode {:#04x}: malformed offset field",
                        op.start
                    )));
                }
                if field.max_distance() > window_size as u64 {
                    return Err(OxiLzError::configuration(format!(
                        "opcode {:#04x}: distance up to {} exceeds a {:#x}-byte window",
                        op.start,
                        field.max_distance(),
                        window_size
                    )));
                }
            }
            ranges.push((op.start, op.end));
        }

        ranges.sort_unstable();
        for pair in ranges.windows(2) {
            if pair[1].0 <= pair[0].1 {
                return Err(OxiLzError::configuration(format!(
                    "opcode ranges overlap at {:#04x}",
                    pair[1].0
                )));
            }
        }

        Ok(())
    }
}

/// Decoder for opcode-range LZ/RLE streams.
#[derive(Debug, Clone)]
pub struct ThresholdByteLzDecoder {
    /// Validated configuration.
    config: CompressionConfig,
    /// Table copied out of the configuration.
    table: OpcodeTable,
    /// Control byte -> entry index.
    index: [Option<u8>; 256],
}

impl ThresholdByteLzDecoder {
    /// Create a decoder, validating the table once.
    pub fn new(config: CompressionConfig) -> Result<Self> {
        config.validate()?;
        let table = match &config.control {
            ControlGranularity::OpcodeRangeTable(table) => table.clone(),
            _ => {
                return Err(OxiLzError::configuration(
                    "bit-token configs need LzDecoder",
                ));
            }
        };
        if table.entries.len() > 256 {
            return Err(OxiLzError::configuration("more than 256 opcode entries"));
        }

        let mut index = [None; 256];
        for ctl in 0..=u8::MAX {
            index[usize::from(ctl)] = table
                .entries
                .iter()
                .position(|op| op.contains(ctl))
                .map(|i| i as u8);
        }

        Ok(Self {
            config,
            table,
            index,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Find the entry for a control byte.
    fn entry(&self, ctl: u8) -> Option<&Opcode> {
        self.index[usize::from(ctl)].map(|i| &self.table.entries[usize::from(i)])
    }

    fn read_be(session: &mut DecodeSession<'_>, bytes: u8, high: u32) -> Result<u32> {
        let mut value = high;
        for _ in 0..bytes {
            value = value << 8 | u32::from(session.reader.read_byte()?);
        }
        Ok(value)
    }

    /// Decode one opcode.
    fn step(&self, session: &mut DecodeSession<'_>) -> Result<()> {
        let ctl = session.reader.read_byte()?;

        if let Some([first, second]) = self.table.end_marker {
            if ctl == first && session.reader.peek_byte() == Some(second) {
                return Err(OxiLzError::end_of_input(session.reader.bit_position()));
            }
        }

        let op = match self.entry(ctl) {
            Some(op) => *op,
            None => {
                return Err(OxiLzError::corrupt(
                    0,
                    format!("no opcode for control byte {ctl:#04x}"),
                ));
            }
        };

        let ctl_count = (u32::from(ctl) >> op.length_shift) & ((1u32 << op.length_bits) - 1);
        let count =
            Self::read_be(session, op.length_bytes, ctl_count)? as usize + op.length_bias as usize;

        match op.kind {
            OpcodeKind::LiteralRun => {
                for _ in 0..count {
                    let byte = session.reader.read_byte()?;
                    if !session.window.put(byte) {
                        break;
                    }
                }
            }
            OpcodeKind::BackReference(field) => {
                let high = (u32::from(ctl) >> field.ctl_shift) & ((1u32 << field.ctl_bits) - 1);
                let raw = Self::read_be(session, field.trailing_bytes, high)?;
                session.window.copy_back(field.distance(raw), count)?;
            }
            OpcodeKind::ZeroFill => {
                session.window.fill(0, count);
            }
            OpcodeKind::ByteFill => {
                let value = session.reader.read_byte()?;
                session.window.fill(value, count);
            }
            OpcodeKind::ZeroPaddedLiterals => {
                for _ in 0..count {
                    let byte = session.reader.read_byte()?;
                    session.window.put(0);
                    if !session.window.put(byte) {
                        break;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Decompressor for ThresholdByteLzDecoder {
    fn decompress_with_limits(
        &self,
        input: &[u8],
        uncompressed_size: usize,
        limits: &DecodeLimits,
    ) -> Result<Decoded> {
        let mut session = DecodeSession::new(&self.config, input, uncompressed_size, limits)?;

        for _ in 0..self.table.leading_literals {
            match session.reader.read_byte() {
                Ok(byte) => {
                    session.window.put(byte);
                }
                Err(e) if e.is_end_of_input() => return session.finish(),
                Err(e) => return Err(e),
            }
        }

        while !session.window.is_full() {
            session.poll()?;
            match self.step(&mut session) {
                Ok(()) => {}
                Err(e) if e.is_end_of_input() => break,
                Err(e) => return Err(session.locate(e)),
            }
        }

        session.finish()
    }
}

/// Decompress an opcode-range LZ/RLE stream.
pub fn decode_opcodes(
    input: &[u8],
    uncompressed_size: usize,
    config: &CompressionConfig,
) -> Result<Decoded> {
    ThresholdByteLzDecoder::new(config.clone())?.decompress(input, uncompressed_size)
}
