//! Error types for streamflow.
//!
//! This crate provides:
//! - [`StreamError`] - Top-level error enum for all pull-pipeline errors
//! - [`Result`] - Result alias used throughout the workspace
//!
//! Absence of a value is never an error at this layer: an exhausted source
//! reports `Ok(None)` through the pull channel. Errors are reserved for
//! stream misuse and for failures raised by user-supplied callbacks.

use thiserror::Error;

/// Top-level error type for streamflow.
#[derive(Error, Debug)]
pub enum StreamError {
    /// A terminal operation was invoked on a stream that has already been
    /// consumed by a previous terminal operation.
    #[error("stream already consumed by a terminal operation")]
    Terminated,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failures raised by user-supplied callbacks (mappers, predicates,
    /// fold steps, finishers). Never caught or retried by the core; a
    /// failed callback fails the whole in-flight pull.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StreamError {
    /// Returns true if this error reports stream misuse rather than a
    /// failure inside user code.
    pub fn is_misuse(&self) -> bool {
        matches!(self, StreamError::Terminated | StreamError::Config(_))
    }
}

/// Result type alias using StreamError.
pub type Result<T> = std::result::Result<T, StreamError>;
