//! Per-call decode state shared by both decoder variants.

use crate::config::CompressionConfig;
use log::{debug, warn};
use oxilz_core::bitstream::BitReader;
use oxilz_core::error::{OxiLzError, Result};
use oxilz_core::limits::DecodeLimits;
use oxilz_core::traits::Decoded;
use oxilz_core::window::SlidingWindow;

/// Everything one decode call owns: input cursor, window, output, limits.
///
/// Created per call and dropped afterwards; nothing survives between calls.
pub(crate) struct DecodeSession<'a> {
    /// Input cursor.
    pub(crate) reader: BitReader<'a>,
    /// Dictionary and output.
    pub(crate) window: SlidingWindow,
    limits: &'a DecodeLimits,
    allow_truncation: bool,
    variant: &'static str,
}

impl<'a> DecodeSession<'a> {
    /// Validate the declared size, then set up the window and cursor.
    pub(crate) fn new(
        config: &CompressionConfig,
        input: &'a [u8],
        uncompressed_size: usize,
        limits: &'a DecodeLimits,
    ) -> Result<Self> {
        limits.check_output_size(uncompressed_size)?;

        let window = SlidingWindow::new(
            config.window_size,
            config.initial_fill_position,
            config.initial_fill.as_ref(),
            uncompressed_size,
        )?;

        debug!(
            "{}: decoding {} input bytes into {} bytes ({} window)",
            config.variant_name(),
            input.len(),
            uncompressed_size,
            if window.is_seeded() { "seeded" } else { "unseeded" }
        );

        Ok(Self {
            reader: BitReader::new(input, config.bit_order),
            window,
            limits,
            allow_truncation: config.allow_truncation,
            variant: config.variant_name(),
        })
    }

    /// Poll cancellation and deadline (once per token).
    #[inline]
    pub(crate) fn poll(&self) -> Result<()> {
        if self.limits.is_bounded() {
            self.limits.check()?;
        }
        Ok(())
    }

    /// Attach the current input position to a stream error.
    pub(crate) fn locate(&self, err: OxiLzError) -> OxiLzError {
        let offset = self.reader.byte_position() as u64;
        match err {
            OxiLzError::InvalidDistance {
                distance,
                history_size,
            } => OxiLzError::corrupt(
                offset,
                format!(
                    "back-reference distance {distance} outside {history_size} bytes of history"
                ),
            ),
            OxiLzError::CorruptStream { message, .. } => OxiLzError::corrupt(offset, message),
            other => other,
        }
    }

    /// Finish the call: a full buffer, a truncated one, or `TruncatedInput`.
    pub(crate) fn finish(self) -> Result<Decoded> {
        let produced = self.window.output_len();
        let expected = self.window.target();

        if produced == expected {
            debug!(
                "{}: done, {} bytes from {} input bytes",
                self.variant,
                produced,
                self.reader.byte_position()
            );
            return Ok(Decoded::complete(self.window.into_output()));
        }

        if !self.allow_truncation {
            return Err(OxiLzError::truncated(produced, expected));
        }

        warn!(
            "{}: input exhausted after {} of {} bytes, returning truncated output",
            self.variant, produced, expected
        );
        Ok(Decoded::truncated(
            self.window.into_output(),
            expected - produced,
        ))
    }
}
