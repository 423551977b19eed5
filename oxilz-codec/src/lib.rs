//! # OxiLZ Codec
//!
//! Configurable decoders for the LZSS and LZ/RLE families used by many
//! game and archive formats. A [`CompressionConfig`] describes the format;
//! one of two decoders executes it:
//!
//! - **[`LzDecoder`]**: bit-level tokens, framed either by one flag bit per
//!   token or by a control byte covering 8 tokens
//! - **[`ThresholdByteLzDecoder`]**: byte opcodes whose numeric range selects
//!   literal runs, back-references, or fills
//!
//! Named [`Preset`]s cover the common formats.
//!
//! ## Example
//!
//! ```rust
//! use oxilz_codec::{Preset, decompress};
//!
//! // control byte 0xFF: eight literals follow
//! let input = [0xFF, b'o', b'x', b'i', b'l', b'z', b'!', b'!', b'!'];
//! let decoded = decompress(&input, 8, &Preset::Lzss.config()).unwrap();
//!
//! assert_eq!(decoded.data, b"oxilz!!!");
//! assert!(!decoded.is_truncated());
//! ```
//!
//! ## Batches
//!
//! [`decompress_batch`] decodes independent entries, on the rayon thread
//! pool when the `parallel` feature is enabled.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod decompress;
pub mod lzss;
pub mod opcode;
pub mod presets;
mod session;

// Re-exports
pub use config::{CompressionConfig, ControlGranularity, LengthCode, MatchLayout, OffsetMode};
pub use decompress::{DecodeJob, Decoder, decompress, decompress_batch, decompress_with_limits};
pub use lzss::{LzDecoder, decode_lzss};
pub use opcode::{
    OffsetField, Opcode, OpcodeKind, OpcodeTable, ThresholdByteLzDecoder, decode_opcodes,
};
pub use presets::Preset;

pub use oxilz_core::{
    BitOrder, DecodeLimits, DecodeStatus, Decoded, Decompressor, OxiLzError, Result, WindowFill,
};
