//! # OxiLZ Core
//!
//! Core components for the OxiLZ decompression engine.
//!
//! This crate provides the building blocks shared by every decoder variant:
//!
//! - [`bitstream`]: Bit-level input in MSB-first or LSB-first order
//! - [`window`]: Sliding window dictionary with back-reference copy
//! - [`limits`]: Output size bound, deadline, and cancellation
//! - [`traits`]: The `Decompressor` trait and decode results
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI                                                 │
//! │     decode regions, batch manifests, preset listing    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     bit-token LZSS, opcode-range LZ/RLE, presets        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     BitReader, SlidingWindow, DecodeLimits             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxilz_core::bitstream::{BitOrder, BitReader};
//! use oxilz_core::window::SlidingWindow;
//!
//! let mut reader = BitReader::new(&[0xAB, 0xCD], BitOrder::Msb);
//! assert_eq!(reader.read_bits(12).unwrap(), 0xABC);
//!
//! let mut window = SlidingWindow::new(4096, 0, None, 6).unwrap();
//! window.put(b'a');
//! window.put(b'b');
//! window.copy_back(2, 4).unwrap();
//! assert_eq!(window.output(), b"ababab");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod limits;
pub mod traits;
pub mod window;

// Re-exports for convenience
pub use bitstream::{BitOrder, BitReader};
pub use error::{OxiLzError, Result};
pub use limits::DecodeLimits;
pub use traits::{DecodeStatus, Decoded, Decompressor};
pub use window::{SlidingWindow, WindowFill};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitOrder, BitReader};
    pub use crate::error::{OxiLzError, Result};
    pub use crate::limits::DecodeLimits;
    pub use crate::traits::{DecodeStatus, Decoded, Decompressor};
    pub use crate::window::{SlidingWindow, WindowFill};
}
