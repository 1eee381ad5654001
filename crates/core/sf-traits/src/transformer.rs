//! Transformer descriptor for stateful mid-stream operators.

use sf_error::Result;

/// Outcome of folding one value into a transformer's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformStep<R> {
    /// Value to emit downstream immediately, if any.
    pub emit: Option<R>,

    /// If true, the accumulator is discarded before the next fold and a
    /// fresh one is created lazily (e.g. a completed batch).
    pub reset: bool,
}

impl<R> TransformStep<R> {
    /// Keep accumulating; emit nothing.
    pub fn hold() -> Self {
        Self {
            emit: None,
            reset: false,
        }
    }

    /// Emit a value and keep the current accumulator.
    pub fn emit(value: R) -> Self {
        Self {
            emit: Some(value),
            reset: false,
        }
    }

    /// Emit a value and discard the accumulator.
    pub fn emit_and_reset(value: R) -> Self {
        Self {
            emit: Some(value),
            reset: true,
        }
    }
}

/// Stateful mid-stream operator descriptor.
///
/// A transformer describes how to create a fresh accumulator, how to fold
/// the next value into it (optionally emitting a result and optionally
/// resetting the accumulator), and how to flush a final trailing result
/// when the upstream is exhausted. Fixed-size batching and multi-item
/// aggregation are both expressed through this one mechanism.
///
/// The accumulator is created lazily on first use and is owned by the
/// transforming combinator for the duration of one traversal.
pub trait Transformer: Send {
    /// The value type consumed from upstream.
    type Input: Send + 'static;
    /// The accumulator type.
    type State: Send;
    /// The value type emitted downstream.
    type Output: Send + 'static;

    /// Creates a fresh accumulator.
    fn create_state(&self) -> Self::State;

    /// Folds the next value into the accumulator.
    fn fold(&self, state: &mut Self::State, item: Self::Input) -> Result<TransformStep<Self::Output>>;

    /// Flushes a final trailing result from the accumulator once the
    /// upstream is exhausted. Invoked at most once per traversal, and only
    /// if an accumulator was ever created.
    fn finish(&self, state: Self::State) -> Result<Option<Self::Output>>;
}
