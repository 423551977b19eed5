//! Resource limits applied to a single decode call.
//!
//! Length fields in archive indexes are author-controlled, so the declared
//! output size is checked against [`DecodeLimits::max_output`] before any
//! buffer is allocated. Long-running decodes can additionally be bounded by
//! a deadline or an external cancellation flag, both polled once per token.

use crate::error::{OxiLzError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Default upper bound on a declared uncompressed size (256 MB).
pub const DEFAULT_MAX_OUTPUT: usize = 256 * 1024 * 1024;

/// Limits for one decode call.
#[derive(Debug, Clone)]
pub struct DecodeLimits {
    /// Largest uncompressed size a caller may request.
    pub max_output: usize,
    /// Abort with `DeadlineExceeded` once this instant has passed.
    pub deadline: Option<Instant>,
    /// Abort with `Cancelled` once this flag is set.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_output: DEFAULT_MAX_OUTPUT,
            deadline: None,
            cancel: None,
        }
    }
}

impl DecodeLimits {
    /// Create limits with the default output bound and no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output bound.
    pub fn with_max_output(mut self, max_output: usize) -> Self {
        self.max_output = max_output;
        self
    }

    /// Set a deadline relative to now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Set an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attach a cancellation flag shared with the caller.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Validate a declared output size before allocating for it.
    pub fn check_output_size(&self, requested: usize) -> Result<()> {
        if requested > self.max_output {
            return Err(OxiLzError::output_too_large(requested, self.max_output));
        }
        Ok(())
    }

    /// Whether any per-token check is configured.
    pub fn is_bounded(&self) -> bool {
        self.deadline.is_some() || self.cancel.is_some()
    }

    /// Poll the cancellation flag and the deadline.
    #[inline]
    pub fn check(&self) -> Result<()> {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(OxiLzError::Cancelled);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(OxiLzError::DeadlineExceeded);
            }
        }
        Ok(())
    }
}
