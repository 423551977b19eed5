//! Decoder configuration.
//!
//! A [`CompressionConfig`] selects the decoder variant and every numeric
//! parameter a format needs. Supporting a new format means writing a config,
//! not a new decoder.

use crate::opcode::OpcodeTable;
use oxilz_core::bitstream::{BitOrder, MAX_READ_BITS};
use oxilz_core::error::{OxiLzError, Result};
use oxilz_core::window::{WindowFill, sizes};

/// How literal and match tokens are told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ControlGranularity {
    /// One flag bit before every token.
    PerBitFlag,
    /// One control byte carries the flags of the next 8 tokens.
    PerByteMask,
    /// The numeric range of a control byte selects the token kind.
    OpcodeRangeTable(OpcodeTable),
}

/// Encoding of the match length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LengthCode {
    /// A fixed-width field of `length_bits` bits.
    #[default]
    Fixed,
    /// Elias gamma: `n` zero bits, a one bit, then `n` more bits below it.
    EliasGamma,
}

/// How a decoded offset field addresses the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OffsetMode {
    /// Distance back from the write cursor: `raw + bias`.
    Relative {
        /// Added to the raw field.
        bias: u32,
    },
    /// Window cell index: `(raw + bias) & (window_size - 1)`.
    Absolute {
        /// Added to the raw field before masking.
        bias: u32,
    },
}

impl Default for OffsetMode {
    fn default() -> Self {
        Self::Absolute { bias: 0 }
    }
}

/// Where the offset and length fields sit within a match token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchLayout {
    /// Offset bits, then length bits, in the configured bit order.
    #[default]
    OffsetFirst,
    /// Length bits, then offset bits.
    LengthFirst,
    /// Bytes `lo, hi`: offset is `lo | (hi >> length_bits) << 8`, length is
    /// the low `length_bits` of `hi`.
    PackedLowHigh,
    /// Big-endian 16-bit word: offset in the high `offset_bits`, length in
    /// the low `length_bits`.
    PackedHighLow,
}

impl MatchLayout {
    /// Whether the layout packs both fields into one 16-bit word.
    pub fn is_packed(&self) -> bool {
        matches!(self, Self::PackedLowHigh | Self::PackedHighLow)
    }
}

/// Complete description of one compressed format.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompressionConfig {
    /// Dictionary size in bytes (power of two).
    pub window_size: usize,
    /// Write cursor at the start of decoding.
    pub initial_fill_position: usize,
    /// Window seed; `None` leaves it unseeded.
    pub initial_fill: Option<WindowFill>,
    /// Bit order of the compressed stream.
    pub bit_order: BitOrder,
    /// Token framing.
    pub control: ControlGranularity,
    /// Flag value that marks a literal token.
    pub literal_flag: bool,
    /// Width of the match offset field.
    pub offset_bits: u8,
    /// Width of the match length field.
    pub length_bits: u8,
    /// Alternate length width chosen by a selector bit before each match.
    pub alt_length_bits: Option<u8>,
    /// Encoding of the length field.
    pub length_code: LengthCode,
    /// Added to every decoded match length.
    pub length_bias: u32,
    /// Window addressing of the offset field.
    pub offset_mode: OffsetMode,
    /// Field arrangement inside a match token.
    pub match_layout: MatchLayout,
    /// Return a shorter buffer instead of failing when input runs out.
    pub allow_truncation: bool,
}

impl Default for CompressionConfig {
    /// The classic 4 KB LZSS used by most formats: zero-filled window
    /// starting at `0xFEE`, per-byte control masks with 1 = literal, and
    /// `lo, hi` packed 12-bit offsets with 4-bit lengths biased by 3.
    fn default() -> Self {
        Self {
            window_size: sizes::LZSS_4K,
            initial_fill_position: 0xFEE,
            initial_fill: Some(WindowFill::ZERO),
            bit_order: BitOrder::Lsb,
            control: ControlGranularity::PerByteMask,
            literal_flag: true,
            offset_bits: 12,
            length_bits: 4,
            alt_length_bits: None,
            length_code: LengthCode::Fixed,
            length_bias: 3,
            offset_mode: OffsetMode::Absolute { bias: 0 },
            match_layout: MatchLayout::PackedLowHigh,
            allow_truncation: true,
        }
    }
}

impl CompressionConfig {
    /// Create a bit-token configuration with the given window and field widths.
    ///
    /// Remaining parameters take their classic LZSS values.
    pub fn new(window_size: usize, offset_bits: u8, length_bits: u8, length_bias: u32) -> Self {
        Self {
            window_size,
            offset_bits,
            length_bits,
            length_bias,
            ..Self::default()
        }
    }

    /// Create a configuration for an opcode range table.
    pub fn opcode_table(window_size: usize, table: OpcodeTable) -> Self {
        Self {
            window_size,
            initial_fill_position: 0,
            initial_fill: None,
            control: ControlGranularity::OpcodeRangeTable(table),
            offset_bits: 0,
            length_bits: 0,
            length_bias: 0,
            offset_mode: OffsetMode::Relative { bias: 0 },
            match_layout: MatchLayout::OffsetFirst,
            ..Self::default()
        }
    }

    /// Set the starting write cursor.
    pub fn with_initial_fill_position(mut self, position: usize) -> Self {
        self.initial_fill_position = position;
        self
    }

    /// Set the window seed.
    pub fn with_initial_fill(mut self, fill: Option<WindowFill>) -> Self {
        self.initial_fill = fill;
        self
    }

    /// Set the bit order.
    pub fn with_bit_order(mut self, order: BitOrder) -> Self {
        self.bit_order = order;
        self
    }

    /// Set the token framing.
    pub fn with_control(mut self, control: ControlGranularity) -> Self {
        self.control = control;
        self
    }

    /// Set the flag value that marks a literal.
    pub fn with_literal_flag(mut self, literal_flag: bool) -> Self {
        self.literal_flag = literal_flag;
        self
    }

    /// Set an alternate length width picked by a selector bit.
    pub fn with_alt_length_bits(mut self, bits: u8) -> Self {
        self.alt_length_bits = Some(bits);
        self
    }

    /// Set the length field encoding.
    pub fn with_length_code(mut self, code: LengthCode) -> Self {
        self.length_code = code;
        self
    }

    /// Set the offset addressing mode.
    pub fn with_offset_mode(mut self, mode: OffsetMode) -> Self {
        self.offset_mode = mode;
        self
    }

    /// Set the match field layout.
    pub fn with_match_layout(mut self, layout: MatchLayout) -> Self {
        self.match_layout = layout;
        self
    }

    /// Allow or forbid truncated output.
    pub fn with_truncation(mut self, allow: bool) -> Self {
        self.allow_truncation = allow;
        self
    }

    /// Get the window index mask.
    pub fn window_mask(&self) -> usize {
        self.window_size.wrapping_sub(1)
    }

    /// Whether this config selects the byte-opcode decoder.
    pub fn is_opcode_table(&self) -> bool {
        matches!(self.control, ControlGranularity::OpcodeRangeTable(_))
    }

    /// Short name of the decoder variant (for logs and listings).
    pub fn variant_name(&self) -> &'static str {
        match self.control {
            ControlGranularity::PerBitFlag => "bit-flag lzss",
            ControlGranularity::PerByteMask => "byte-mask lzss",
            ControlGranularity::OpcodeRangeTable(_) => "opcode-range lz/rle",
        }
    }

    /// Largest match length a fixed-width field can produce.
    pub fn max_match_length(&self) -> Option<u64> {
        if self.length_code != LengthCode::Fixed {
            return None;
        }
        let widest = self
            .alt_length_bits
            .map_or(self.length_bits, |alt| alt.max(self.length_bits));
        Some((1u64 << widest) - 1 + u64::from(self.length_bias))
    }

    /// Check the configuration for internal consistency.
    ///
    /// Decoders call this once on construction; a failure is a defect in
    /// the format table, not in any particular stream.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 || !self.window_size.is_power_of_two() {
            return Err(OxiLzError::configuration(format!(
                "window size {} is not a power of two",
                self.window_size
            )));
        }
        if self.window_size > sizes::MAX {
            return Err(OxiLzError::configuration(format!(
                "window size {} exceeds maximum {}",
                self.window_size,
                sizes::MAX
            )));
        }
        if self.initial_fill_position >= self.window_size {
            return Err(OxiLzError::configuration(format!(
                "initial fill position {:#x} is outside a {:#x}-byte window",
                self.initial_fill_position, self.window_size
            )));
        }
        if let Some(WindowFill::Pattern(pattern)) = &self.initial_fill {
            if pattern.is_empty() {
                return Err(OxiLzError::configuration("window fill pattern is empty"));
            }
        }

        match &self.control {
            ControlGranularity::OpcodeRangeTable(table) => table.validate(self.window_size),
            ControlGranularity::PerBitFlag | ControlGranularity::PerByteMask => {
                self.validate_bit_fields()
            }
        }
    }

    fn validate_bit_fields(&self) -> Result<()> {
        let window_bits = self.window_size.trailing_zeros();

        if self.offset_bits == 0 || self.offset_bits > MAX_READ_BITS {
            return Err(OxiLzError::configuration(format!(
                "offset width {} must be 1..={MAX_READ_BITS}",
                self.offset_bits
            )));
        }

        match self.length_code {
            LengthCode::Fixed => {
                for width in std::iter::once(self.length_bits).chain(self.alt_length_bits) {
                    if width == 0 || width > 16 {
                        return Err(OxiLzError::configuration(format!(
                            "length width {width} must be 1..=16"
                        )));
                    }
                }
            }
            LengthCode::EliasGamma => {
                if self.match_layout.is_packed() || self.alt_length_bits.is_some() {
                    return Err(OxiLzError::configuration(
                        "Elias gamma lengths cannot be packed or width-selected",
                    ));
                }
                if self.length_bits != 0 {
                    return Err(OxiLzError::configuration(format!(
                        "Elias gamma lengths carry no fixed width, got {} bits",
                        self.length_bits
                    )));
                }
            }
        }

        if self.match_layout.is_packed() {
            if u32::from(self.offset_bits) + u32::from(self.length_bits) != 16 {
                return Err(OxiLzError::configuration(format!(
                    "packed match needs offset + length = 16 bits, got {} + {}",
                    self.offset_bits, self.length_bits
                )));
            }
            if self.alt_length_bits.is_some() {
                return Err(OxiLzError::configuration(
                    "packed match cannot use a selectable length width",
                ));
            }
        }

        match self.offset_mode {
            OffsetMode::Absolute { .. } => {
                if u32::from(self.offset_bits) > window_bits {
                    return Err(OxiLzError::configuration(format!(
                        "{}-bit absolute offsets overrun a {:#x}-byte window",
                        self.offset_bits, self.window_size
                    )));
                }
            }
            OffsetMode::Relative { bias } => {
                let max_distance = (1u64 << self.offset_bits) - 1 + u64::from(bias);
                if max_distance > self.window_size as u64 {
                    return Err(OxiLzError::configuration(format!(
                        "distance up to {max_distance} exceeds a {:#x}-byte window",
                        self.window_size
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_classic_lzss() {
        let config = CompressionConfig::default();
        assert_eq!(config.window_size, 0x1000);
        assert_eq!(config.initial_fill_position, 0xFEE);
        assert_eq!(config.control, ControlGranularity::PerByteMask);
        assert_eq!(config.max_match_length(), Some(18));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_power_of_two_window() {
        let config = CompressionConfig::new(3000, 12, 4, 3);
        assert!(matches!(
            config.validate(),
            Err(OxiLzError::Configuration { .. })
        ));
    }

    #[test]
    fn test_rejects_fill_position_outside_window() {
        let config = CompressionConfig::default().with_initial_fill_position(0x1000);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inconsistent_packed_widths() {
        let config = CompressionConfig::new(0x1000, 12, 5, 3);
        assert!(config.validate().is_err());

        let config = CompressionConfig::new(0x1000, 12, 4, 3)
            .with_match_layout(MatchLayout::OffsetFirst)
            .with_alt_length_bits(6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_offsets_wider_than_window() {
        let config = CompressionConfig::new(0x800, 12, 4, 3).with_initial_fill_position(0x7EE);
        assert!(config.validate().is_err());

        let config = CompressionConfig::new(0x1000, 12, 4, 3)
            .with_match_layout(MatchLayout::OffsetFirst)
            .with_offset_mode(OffsetMode::Relative { bias: 2 });
        assert!(config.validate().is_err());

        let config = config.with_offset_mode(OffsetMode::Relative { bias: 1 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_gamma_lengths() {
        let config = CompressionConfig::new(0x1000, 12, 0, 1)
            .with_match_layout(MatchLayout::OffsetFirst)
            .with_length_code(LengthCode::EliasGamma);
        assert!(config.validate().is_ok());
        assert_eq!(config.max_match_length(), None);

        let packed = config.with_match_layout(MatchLayout::PackedLowHigh);
        assert!(packed.validate().is_err());
    }

    #[test]
    fn test_gamma_rejects_fixed_length_width() {
        let config = CompressionConfig::new(0x100, 8, 32, 1)
            .with_initial_fill(None)
            .with_initial_fill_position(0)
            .with_control(ControlGranularity::PerBitFlag)
            .with_match_layout(MatchLayout::OffsetFirst)
            .with_length_code(LengthCode::EliasGamma)
            .with_offset_mode(OffsetMode::Relative { bias: 1 });
        assert!(matches!(
            config.validate(),
            Err(OxiLzError::Configuration { .. })
        ));

        let config = CompressionConfig { length_bits: 4, ..config };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_variant_names() {
        let config = CompressionConfig::default();
        assert_eq!(config.variant_name(), "byte-mask lzss");
        let config = config.with_control(ControlGranularity::PerBitFlag);
        assert_eq!(config.variant_name(), "bit-flag lzss");
        assert!(!config.is_opcode_table());
    }
}
