//! Core traits and result types for decompression.
//!
//! Every decoder variant consumes a complete compressed region and produces
//! an owned buffer; there is no suspension point, so the trait is a single
//! call rather than a streaming state machine.

use crate::error::Result;
use crate::limits::DecodeLimits;

/// Completion status of a decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// The full declared size was produced.
    Complete,
    /// Input ran out early and the format tolerates a shorter buffer.
    Truncated {
        /// Bytes missing from the declared size.
        missing: usize,
    },
}

/// An owned decode result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Decoded bytes (exactly the declared size unless truncated).
    pub data: Vec<u8>,
    /// How the decode ended.
    pub status: DecodeStatus,
}

impl Decoded {
    /// A complete result.
    pub fn complete(data: Vec<u8>) -> Self {
        Self {
            data,
            status: DecodeStatus::Complete,
        }
    }

    /// A truncated result missing `missing` bytes.
    pub fn truncated(data: Vec<u8>, missing: usize) -> Self {
        Self {
            data,
            status: DecodeStatus::Truncated { missing },
        }
    }

    /// Check whether the input ran out early.
    pub fn is_truncated(&self) -> bool {
        matches!(self.status, DecodeStatus::Truncated { .. })
    }

    /// Consume the result and return the bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

/// A one-shot decompressor.
///
/// Implementations hold only validated configuration, so a single instance
/// can serve many independent calls (including from several threads).
pub trait Decompressor {
    /// Decode `input` into a buffer of `uncompressed_size` bytes.
    fn decompress_with_limits(
        &self,
        input: &[u8],
        uncompressed_size: usize,
        limits: &DecodeLimits,
    ) -> Result<Decoded>;

    /// Decode with default limits (convenience method).
    fn decompress(&self, input: &[u8], uncompressed_size: usize) -> Result<Decoded> {
        self.decompress_with_limits(input, uncompressed_size, &DecodeLimits::default())
    }
}
