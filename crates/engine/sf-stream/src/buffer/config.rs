//! Buffering configuration.

use serde::{Deserialize, Serialize};
use sf_error::{Result, StreamError};

/// Default prefetch window size.
pub const DEFAULT_BUFFER_SIZE: usize = 4;

/// Configuration for the bounded-concurrency buffering engine.
///
/// Buffering overlaps up to `size` pending upstream pulls, pipelining slow
/// per-value asynchronous work instead of serializing it. The window size
/// is the only tunable: larger windows keep more work in flight at the
/// cost of memory and of delivery order drifting further from source
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Number of upstream pulls kept in flight (default: 4).
    ///
    /// Must be at least 1; a window of 1 degenerates to sequential pulling
    /// and preserves source order exactly.
    #[serde(default = "default_size")]
    pub size: usize,
}

fn default_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
        }
    }
}

impl BufferConfig {
    /// Create a new buffer configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prefetch window size.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(StreamError::Config(
                "buffer size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
