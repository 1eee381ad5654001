//! The asynchronous pull protocol.

use sf_error::Result;
use std::future::Future;
use std::pin::Pin;

/// A boxed future resolving to a single deferred result.
///
/// User-supplied asynchronous callbacks (mappers, predicates) are erased to
/// this shape before they enter a pipeline.
pub type Deferred<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

/// The future returned by [`AsyncIterable::next`].
///
/// Resolves to `Ok(Some(value))` for a delivered value, `Ok(None)` once the
/// iterable is exhausted or stopped, or `Err` when a pull fails.
pub type Pull<T> = Deferred<Option<T>>;

/// A pull-based asynchronous iterable with cooperative cancellation.
///
/// `next` *initiates* a pull synchronously and returns a detached future;
/// a consumer that wants overlapping pulls simply calls `next` again before
/// awaiting the previous future. Initiation order is therefore the upstream
/// pull order even when resolution overlaps.
///
/// # Contract
///
/// - An iterable is owned by exactly one downstream consumer; it is never
///   pulled from by two independent consumer chains.
/// - `stop` is one-way and idempotent. It must be forwarded to the upstream
///   iterable, and after it has been called every subsequent pull must
///   (eventually) resolve `Ok(None)`.
/// - Exhaustion is sticky: once a pull has resolved `Ok(None)` because the
///   underlying source ran out, later pulls resolve `Ok(None)` as well.
pub trait AsyncIterable<T>: Send {
    /// Starts fetching the next value.
    fn next(&mut self) -> Pull<T>;

    /// Signals that no further values will be pulled.
    ///
    /// Implementations must forward the signal upstream so no further
    /// unnecessary work is scheduled.
    fn stop(&mut self);
}

/// An owned, type-erased iterable.
pub type BoxedIterable<T> = Box<dyn AsyncIterable<T>>;

impl<T> AsyncIterable<T> for BoxedIterable<T> {
    fn next(&mut self) -> Pull<T> {
        (**self).next()
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}
