//! Named configurations for known formats.
//!
//! Each preset is a plain [`CompressionConfig`]; nothing here needs a
//! dedicated decoder.

use crate::config::{CompressionConfig, ControlGranularity, MatchLayout};
use crate::opcode::{Opcode, OpcodeKind, OffsetField, OpcodeTable};
use oxilz_core::bitstream::BitOrder;
use oxilz_core::error::OxiLzError;

/// A known compressed format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preset {
    /// Classic 4 KB LZSS, window cursor at `0xFEE`.
    #[default]
    Lzss,
    /// Classic LZSS with the cursor at `0xFF0`.
    LzssFf0,
    /// LSB bit stream, 0 = literal, 4- or 6-bit lengths.
    SquadraD,
    /// MSB bit stream, 1 = literal, lengths biased by 2.
    Kaguya,
    /// Opcode table with zero and byte fills.
    BlackButterfly,
    /// Opcode table with long literal runs and 2-byte distances.
    Pandora,
}

impl Preset {
    /// Every preset, in listing order.
    pub const ALL: [Preset; 6] = [
        Self::Lzss,
        Self::LzssFf0,
        Self::SquadraD,
        Self::Kaguya,
        Self::BlackButterfly,
        Self::Pandora,
    ];

    /// Get the preset name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lzss => "lzss",
            Self::LzssFf0 => "lzss-ff0",
            Self::SquadraD => "squadra-d",
            Self::Kaguya => "kaguya",
            Self::BlackButterfly => "black-butterfly",
            Self::Pandora => "pandora",
        }
    }

    /// One-line description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Lzss => "4 KB LZSS, byte masks, 12/4-bit packed matches, cursor 0xFEE",
            Self::LzssFf0 => "4 KB LZSS, byte masks, 12/4-bit packed matches, cursor 0xFF0",
            Self::SquadraD => "4 KB bit-flag LZSS, LSB first, 4/6-bit lengths, cursor 0xFC0",
            Self::Kaguya => "4 KB bit-flag LZSS, MSB first, lengths +2, cursor 1",
            Self::BlackButterfly => "byte opcodes: 10-bit back-references, zero/byte fills",
            Self::Pandora => "byte opcodes: long literal runs, 1- or 2-byte distances",
        }
    }

    /// Build the configuration.
    pub fn config(&self) -> CompressionConfig {
        match self {
            Self::Lzss => CompressionConfig::default(),
            Self::LzssFf0 => CompressionConfig::default().with_initial_fill_position(0xFF0),
            Self::SquadraD => CompressionConfig::new(0x1000, 12, 4, 3)
                .with_initial_fill_position(0xFC0)
                .with_control(ControlGranularity::PerBitFlag)
                .with_literal_flag(false)
                .with_match_layout(MatchLayout::OffsetFirst)
                .with_alt_length_bits(6),
            Self::Kaguya => CompressionConfig::new(0x1000, 12, 4, 2)
                .with_initial_fill_position(1)
                .with_bit_order(BitOrder::Msb)
                .with_control(ControlGranularity::PerBitFlag)
                .with_match_layout(MatchLayout::OffsetFirst),
            Self::BlackButterfly => {
                CompressionConfig::opcode_table(0x1000, black_butterfly_table())
            }
            Self::Pandora => CompressionConfig::opcode_table(0x20000, pandora_table()),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Preset {
    type Err = OxiLzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == wanted)
            .ok_or_else(|| OxiLzError::configuration(format!("unknown preset '{s}'")))
    }
}

fn black_butterfly_table() -> OpcodeTable {
    // 10-bit distance stored as its complement: 0x3FF means 1 byte back
    let near = OffsetField::bytes(1, 0).with_ctl_bits(2).complemented();

    OpcodeTable::new(vec![
        Opcode::new(0x00, 0x7F, OpcodeKind::BackReference(near)).with_length(5, 2, 2),
        Opcode::new(0x80, 0x9F, OpcodeKind::LiteralRun).with_length(5, 0, 1),
        Opcode::new(0xA0, 0xBF, OpcodeKind::ZeroPaddedLiterals).with_length(5, 0, 1),
        Opcode::new(0xC0, 0xDF, OpcodeKind::ByteFill).with_length(5, 0, 2),
        Opcode::new(0xE0, 0xFE, OpcodeKind::ZeroFill).with_length(5, 0, 1),
        Opcode::new(0xFF, 0xFF, OpcodeKind::ZeroFill)
            .with_length(0, 0, 32)
            .with_length_bytes(1),
    ])
    .with_end_marker([0x7F, 0xFF])
}

fn pandora_table() -> OpcodeTable {
    let short = OffsetField::bytes(1, 1);
    let long = OffsetField::bytes(2, 0x101);

    OpcodeTable::new(vec![
        Opcode::new(0x00, 0x3F, OpcodeKind::LiteralRun).with_length(6, 0, 1),
        Opcode::new(0x40, 0x5F, OpcodeKind::LiteralRun)
            .with_length(5, 0, 0x41)
            .with_length_bytes(1),
        Opcode::new(0x60, 0x7F, OpcodeKind::LiteralRun)
            .with_length(5, 0, 0x2041)
            .with_length_bytes(2),
        Opcode::new(0x80, 0x8F, OpcodeKind::BackReference(short)).with_length(4, 0, 3),
        Opcode::new(0x90, 0x9F, OpcodeKind::BackReference(long)).with_length(4, 0, 3),
        Opcode::new(0xA0, 0xA7, OpcodeKind::BackReference(short))
            .with_length(3, 0, 19)
            .with_length_bytes(1),
        Opcode::new(0xA8, 0xAF, OpcodeKind::BackReference(long))
            .with_length(3, 0, 19)
            .with_length_bytes(1),
        Opcode::new(0xB0, 0xB7, OpcodeKind::BackReference(short))
            .with_length(3, 0, 0x813)
            .with_length_bytes(2),
        Opcode::new(0xB8, 0xBF, OpcodeKind::BackReference(long))
            .with_length(3, 0, 0x813)
            .with_length_bytes(2),
        Opcode::new(
            0xC0,
            0xFF,
            OpcodeKind::BackReference(OffsetField::bytes(1, 0x101).with_ctl_bits(6)),
        )
        .with_length(0, 0, 3),
    ])
    .with_leading_literals(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompress::decompress;
    use oxilz_core::traits::DecodeStatus;

    #[test]
    fn test_all_presets_validate() {
        for preset in Preset::ALL {
            assert!(preset.config().validate().is_ok(), "{preset} is invalid");
        }
    }

    #[test]
    fn test_name_round_trip() {
        for preset in Preset::ALL {
            assert_eq!(preset.name().parse::<Preset>().unwrap(), preset);
        }
        assert_eq!("LZSS_FF0".parse::<Preset>().unwrap(), Preset::LzssFf0);
        assert!("lzh5".parse::<Preset>().is_err());
    }

    #[test]
    fn test_init_positions() {
        assert_eq!(Preset::Lzss.config().initial_fill_position, 0xFEE);
        assert_eq!(Preset::LzssFf0.config().initial_fill_position, 0xFF0);
        assert_eq!(Preset::SquadraD.config().initial_fill_position, 0xFC0);
        assert_eq!(Preset::Kaguya.config().initial_fill_position, 1);
    }

    #[test]
    fn test_ff0_match_repeats_literal() {
        // one literal at 0xFF0, then a match from 0xFF0 of length 3
        let input = [0b0000_0001, b'k', 0xF0, 0xF0];
        let decoded = decompress(&input, 4, &Preset::LzssFf0.config()).unwrap();
        assert_eq!(decoded.data, b"kkkk");
    }

    #[test]
    fn test_kaguya_msb_bit_tokens() {
        // literal 'A' (flag 1), then match offset 1 length 0+2 -> "AA"
        // bits: 1 01000001 0 000000000001 0000
        let input = [0b1010_0000, 0b1000_0000, 0b0000_0100, 0b0000_0000];
        let decoded = decompress(&input, 3, &Preset::Kaguya.config()).unwrap();
        assert_eq!(decoded.data, b"AAA");
        assert_eq!(decoded.status, DecodeStatus::Complete);
    }

    #[test]
    fn test_black_butterfly_stream() {
        let input = [
            0x81, b'o', b'k', // literal run of 2
            0xC1, 0x55, // 3 x 0x55
            0xE1, // 2 zeros
            0xA0, 0x09, // 0, 9
            0x03, 0xFD, // back 3 bytes, 2 long
            0x7F, 0xFF, // end
        ];
        let decoded = decompress(&input, 64, &Preset::BlackButterfly.config()).unwrap();
        assert_eq!(decoded.data, vec![b'o', b'k', 0x55, 0x55, 0x55, 0, 0, 0, 9, 0, 0]);
        assert_eq!(decoded.status, DecodeStatus::Truncated { missing: 53 });
    }

    #[test]
    fn test_pandora_stream() {
        let input = [
            b'P', // leading literal
            0x01, b'b', b'x', // literal run of 2
            0x80, 0x02, // back 3 bytes, 3 long
            0xC0, 0x00, // back 0x101 bytes: before the start
        ];
        let config = Preset::Pandora.config();

        let decoded = decompress(&input[..6], 6, &config).unwrap();
        assert_eq!(decoded.data, b"PbxPbx");

        let err = decompress(&input, 12, &config).unwrap_err();
        assert!(err.is_corrupt());
    }
}
