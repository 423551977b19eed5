//! Sliding window (circular dictionary) for LZSS-family decompression.
//!
//! In the formats handled here the window *is* the recent output history:
//! every byte written to the window is also appended to the decoded output,
//! and back-references copy out of the window byte by byte.
//!
//! # Initial state
//!
//! Many formats start writing mid-buffer (`0xFEE`, `0xFC0`, `0xFF0`, `0x10`)
//! over a pre-filled window, so early back-references resolve into the seed
//! content. The start position must match the reference encoder exactly or
//! the output diverges from the first byte.

use crate::error::{OxiLzError, Result};

/// Common window sizes.
pub mod sizes {
    /// Classic 4 KB LZSS window.
    pub const LZSS_4K: usize = 0x1000;
    /// Largest window accepted by [`SlidingWindow::new`](super::SlidingWindow::new).
    pub const MAX: usize = 1 << 24;
}

/// Content used to pre-load the window before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WindowFill {
    /// Every cell holds the same byte.
    Byte(u8),
    /// The pattern is repeated from cell 0 to the end of the window.
    Pattern(Vec<u8>),
}

impl WindowFill {
    /// Zero-filled window.
    pub const ZERO: Self = Self::Byte(0);
}

/// A circular dictionary that also accumulates the decoded output.
///
/// The output stops growing once it reaches the target length; writes past
/// that point are dropped, so a decoder never produces more than it was
/// asked for.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    /// The underlying dictionary.
    buffer: Vec<u8>,
    /// Current write position (next byte will be written here).
    cursor: usize,
    /// Mask for wraparound (capacity - 1).
    mask: usize,
    /// Cells written this session (up to capacity).
    written: usize,
    /// Whether the whole window was pre-loaded.
    seeded: bool,
    /// Accumulated output.
    output: Vec<u8>,
    /// Declared output length.
    target: usize,
}

impl SlidingWindow {
    /// Create a window of `window_size` bytes.
    ///
    /// # Arguments
    ///
    /// * `window_size` - Must be a power of 2
    /// * `initial_position` - Starting write cursor, must be inside the window
    /// * `fill` - Optional seed content; `None` leaves the window unseeded
    /// * `target` - Number of output bytes to produce
    pub fn new(
        window_size: usize,
        initial_position: usize,
        fill: Option<&WindowFill>,
        target: usize,
    ) -> Result<Self> {
        if window_size == 0 || !window_size.is_power_of_two() {
            return Err(OxiLzError::configuration(format!(
                "window size {window_size} is not a power of two"
            )));
        }
        if window_size > sizes::MAX {
            return Err(OxiLzError::configuration(format!(
                "window size {window_size} exceeds maximum {}",
                sizes::MAX
            )));
        }
        if initial_position >= window_size {
            return Err(OxiLzError::configuration(format!(
                "initial position {initial_position:#x} is outside a {window_size:#x}-byte window"
            )));
        }

        let mut buffer = vec![0u8; window_size];
        let seeded = match fill {
            None => false,
            Some(WindowFill::Byte(value)) => {
                buffer.fill(*value);
                true
            }
            Some(WindowFill::Pattern(pattern)) => {
                if pattern.is_empty() {
                    return Err(OxiLzError::configuration("window fill pattern is empty"));
                }
                for (cell, &value) in buffer.iter_mut().zip(pattern.iter().cycle()) {
                    *cell = value;
                }
                true
            }
        };

        Ok(Self {
            buffer,
            cursor: initial_position,
            mask: window_size - 1,
            written: 0,
            seeded,
            output: Vec::with_capacity(target),
            target,
        })
    }

    /// Get the capacity of the window.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Get the current write position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of cells written this session (saturates at capacity).
    pub fn written(&self) -> usize {
        self.written
    }

    /// Whether the window was pre-loaded with fill content.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Number of bytes that hold valid history for back-references.
    pub fn history_len(&self) -> usize {
        if self.seeded {
            self.capacity()
        } else {
            self.written
        }
    }

    /// Get the output length.
    pub fn output_len(&self) -> usize {
        self.output.len()
    }

    /// Get the declared output length.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Number of output bytes still to produce.
    pub fn remaining(&self) -> usize {
        self.target - self.output.len()
    }

    /// Check whether the output has reached the target length.
    pub fn is_full(&self) -> bool {
        self.output.len() >= self.target
    }

    /// Get the output data.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Consume the window and return the output data.
    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    #[inline]
    fn push(&mut self, byte: u8) {
        self.buffer[self.cursor] = byte;
        self.cursor = (self.cursor + 1) & self.mask;
        if self.written < self.buffer.len() {
            self.written += 1;
        }
        self.output.push(byte);
    }

    /// Write one byte to the window and the output.
    ///
    /// Returns `false` without writing once the output is full.
    #[inline]
    pub fn put(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.push(byte);
        true
    }

    /// Write a run of literal bytes, returning how many were accepted.
    pub fn put_slice(&mut self, bytes: &[u8]) -> usize {
        let count = bytes.len().min(self.remaining());
        for &byte in &bytes[..count] {
            self.push(byte);
        }
        count
    }

    /// Emit `count` copies of `byte`, returning how many were written.
    pub fn fill(&mut self, byte: u8, count: usize) -> usize {
        let count = count.min(self.remaining());
        for _ in 0..count {
            self.push(byte);
        }
        count
    }

    /// Read a byte at the given distance from the cursor.
    ///
    /// Distance 1 is the most recently written byte.
    pub fn read_at_distance(&self, distance: usize) -> Result<u8> {
        self.check_distance(distance)?;
        Ok(self.buffer[self.cursor.wrapping_sub(distance) & self.mask])
    }

    fn check_distance(&self, distance: usize) -> Result<()> {
        if distance == 0 || distance > self.history_len() {
            return Err(OxiLzError::invalid_distance(distance, self.history_len()));
        }
        Ok(())
    }

    /// Copy `length` bytes starting `distance` bytes behind the cursor.
    ///
    /// The copy runs one byte at a time, so when `length > distance` each
    /// freshly written byte feeds the next iteration and the source repeats.
    /// Stops early at the target length; returns the number of bytes written.
    pub fn copy_back(&mut self, distance: usize, length: usize) -> Result<usize> {
        self.check_distance(distance)?;

        let count = length.min(self.remaining());
        let mut src = self.cursor.wrapping_sub(distance) & self.mask;
        for _ in 0..count {
            let byte = self.buffer[src];
            self.push(byte);
            src = (src + 1) & self.mask;
        }

        Ok(count)
    }

    /// Copy `length` bytes starting at absolute window cell `position`.
    ///
    /// A position equal to the cursor names the oldest cell, a full window
    /// behind it.
    pub fn copy_from(&mut self, position: usize, length: usize) -> Result<usize> {
        let distance = match self.cursor.wrapping_sub(position) & self.mask {
            0 => self.capacity(),
            d => d,
        };
        self.copy_back(distance, length)
    }
}
