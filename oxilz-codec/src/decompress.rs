//! Variant dispatch and batch decoding.

use crate::config::CompressionConfig;
use crate::lzss::LzDecoder;
use crate::opcode::ThresholdByteLzDecoder;
use log::debug;
use oxilz_core::error::Result;
use oxilz_core::limits::DecodeLimits;
use oxilz_core::traits::{Decoded, Decompressor};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A decoder for any configuration.
///
/// Built once per format and shared; decoding borrows it immutably, so one
/// `Decoder` can serve many threads.
#[derive(Debug, Clone)]
pub enum Decoder {
    /// Bit-flag or byte-mask LZSS.
    Bit(LzDecoder),
    /// Opcode-range LZ/RLE.
    Opcode(ThresholdByteLzDecoder),
}

impl Decoder {
    /// Validate a configuration and pick its decoder variant.
    pub fn new(config: CompressionConfig) -> Result<Self> {
        if config.is_opcode_table() {
            ThresholdByteLzDecoder::new(config).map(Self::Opcode)
        } else {
            LzDecoder::new(config).map(Self::Bit)
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &CompressionConfig {
        match self {
            Self::Bit(decoder) => decoder.config(),
            Self::Opcode(decoder) => decoder.config(),
        }
    }
}

impl Decompressor for Decoder {
    fn decompress_with_limits(
        &self,
        input: &[u8],
        uncompressed_size: usize,
        limits: &DecodeLimits,
    ) -> Result<Decoded> {
        match self {
            Self::Bit(decoder) => decoder.decompress_with_limits(input, uncompressed_size, limits),
            Self::Opcode(decoder) => {
                decoder.decompress_with_limits(input, uncompressed_size, limits)
            }
        }
    }
}

/// Decompress `input` into `uncompressed_size` bytes.
pub fn decompress(
    input: &[u8],
    uncompressed_size: usize,
    config: &CompressionConfig,
) -> Result<Decoded> {
    decompress_with_limits(input, uncompressed_size, config, &DecodeLimits::default())
}

/// Decompress with explicit output, time and cancellation limits.
pub fn decompress_with_limits(
    input: &[u8],
    uncompressed_size: usize,
    config: &CompressionConfig,
    limits: &DecodeLimits,
) -> Result<Decoded> {
    Decoder::new(config.clone())?.decompress_with_limits(input, uncompressed_size, limits)
}

/// One entry of a batch.
#[derive(Debug, Clone, Copy)]
pub struct DecodeJob<'a> {
    /// Compressed bytes.
    pub input: &'a [u8],
    /// Declared decompressed size.
    pub uncompressed_size: usize,
    /// Decoder for this entry's format.
    pub decoder: &'a Decoder,
}

impl<'a> DecodeJob<'a> {
    /// Create a job.
    pub fn new(input: &'a [u8], uncompressed_size: usize, decoder: &'a Decoder) -> Self {
        Self {
            input,
            uncompressed_size,
            decoder,
        }
    }

    fn run(&self, limits: &DecodeLimits) -> Result<Decoded> {
        self.decoder
            .decompress_with_limits(self.input, self.uncompressed_size, limits)
    }
}

/// Decode independent entries.
///
/// Results keep the order of `jobs`. A failing entry yields its own error
/// and does not affect the others. With the `parallel` feature the entries
/// run on the rayon thread pool.
pub fn decompress_batch(jobs: &[DecodeJob<'_>], limits: &DecodeLimits) -> Vec<Result<Decoded>> {
    debug!("decoding batch of {} entries", jobs.len());

    #[cfg(feature = "parallel")]
    let results = jobs.par_iter().map(|job| job.run(limits)).collect();

    #[cfg(not(feature = "parallel"))]
    let results = jobs.iter().map(|job| job.run(limits)).collect();

    results
}
