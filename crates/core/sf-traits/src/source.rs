//! Asynchronous construction sources.

use async_trait::async_trait;
use sf_error::Result;

/// Trait for asynchronous value sources.
///
/// This is the construction input for feeding a pipeline from anything that
/// produces values one at a time with latency: a paginated API, a queue
/// receiver, a file reader. The adapter that bridges a `PullSource` into a
/// pipeline serializes overlapping pulls and fuses the source after
/// exhaustion, so implementations only need to uphold the contract for
/// strictly sequential calls.
///
/// # Contract
///
/// - `Ok(Some(value))` delivers the next value.
/// - `Ok(None)` signals exhaustion; the adapter will not call `pull` again.
/// - `Err` fails the in-flight pull; the source is not retried by the core.
#[async_trait]
pub trait PullSource: Send {
    /// The value type produced by this source.
    type Item: Send + 'static;

    /// Produces the next value, or `None` when the source is exhausted.
    async fn pull(&mut self) -> Result<Option<Self::Item>>;
}

#[async_trait]
impl<S: PullSource + ?Sized> PullSource for Box<S> {
    type Item = S::Item;

    async fn pull(&mut self) -> Result<Option<Self::Item>> {
        (**self).pull().await
    }
}
