//! Error types for OxiLZ operations.
//!
//! This module provides a single error type covering stream corruption,
//! truncated input, configuration defects, and resource limits hit while
//! decoding a compressed region.

use std::io;
use thiserror::Error;

/// The main error type for OxiLZ operations.
#[derive(Debug, Error)]
pub enum OxiLzError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed offset, length, or opcode in the compressed stream.
    #[error("Corrupt stream at input offset {offset}: {message}")]
    CorruptStream {
        /// Byte offset in the compressed input where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Input ended before the declared uncompressed size was produced.
    #[error("Truncated input: produced {produced} of {expected} bytes")]
    TruncatedInput {
        /// Number of bytes decoded before the input ran out.
        produced: usize,
        /// Declared uncompressed size.
        expected: usize,
    },

    /// Inconsistent or invalid decoder configuration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration defect.
        message: String,
    },

    /// The bit or byte source is exhausted.
    #[error("End of input at bit position {bit_position}")]
    EndOfInput {
        /// Bit position where the read failed.
        bit_position: u64,
    },

    /// Invalid distance in a back-reference.
    #[error("Invalid back-reference distance: {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Number of window bytes that hold valid history.
        history_size: usize,
    },

    /// Declared output size exceeds the configured allocation limit.
    #[error("Declared output size {requested} exceeds limit {limit}")]
    OutputTooLarge {
        /// Requested uncompressed size.
        requested: usize,
        /// Maximum allowed size.
        limit: usize,
    },

    /// Decoding was cancelled by the caller.
    #[error("Decoding cancelled")]
    Cancelled,

    /// Decoding ran past its deadline.
    #[error("Decoding deadline exceeded")]
    DeadlineExceeded,
}

/// Result type alias for OxiLZ operations.
pub type Result<T> = std::result::Result<T, OxiLzError>;

impl OxiLzError {
    /// Create a corrupt stream error.
    pub fn corrupt(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptStream {
            offset,
            message: message.into(),
        }
    }

    /// Create a truncated input error.
    pub fn truncated(produced: usize, expected: usize) -> Self {
        Self::TruncatedInput { produced, expected }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an end of input error.
    pub fn end_of_input(bit_position: u64) -> Self {
        Self::EndOfInput { bit_position }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create an output too large error.
    pub fn output_too_large(requested: usize, limit: usize) -> Self {
        Self::OutputTooLarge { requested, limit }
    }

    /// Whether this error means "stop here" rather than "the data is bad".
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Self::EndOfInput { .. })
    }

    /// Whether a caller may still use a shorter prefix of the output.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::TruncatedInput { .. })
    }

    /// Whether the stream itself is malformed.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            Self::CorruptStream { .. } | Self::InvalidDistance { .. }
        )
    }
}
