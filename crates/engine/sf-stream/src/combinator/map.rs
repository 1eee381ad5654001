//! Per-value asynchronous mapping.

use super::Mapper;
use sf_traits::{AsyncIterable, BoxedIterable, Pull};

/// Maps each upstream value through an asynchronous mapper.
///
/// The upstream pull is initiated synchronously when `next` is called, so
/// overlapping pulls observe upstream values in source order while their
/// mapper futures resolve concurrently. This is what makes a mapping stage
/// under the buffering engine pipeline instead of serialize.
pub struct MapIterable<T, U> {
    upstream: BoxedIterable<T>,
    mapper: Mapper<T, U>,
}

impl<T, U> MapIterable<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    /// Creates a mapping decorator over an upstream iterable.
    pub fn new(upstream: BoxedIterable<T>, mapper: Mapper<T, U>) -> Self {
        Self { upstream, mapper }
    }
}

impl<T, U> AsyncIterable<U> for MapIterable<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn next(&mut self) -> Pull<U> {
        let pull = self.upstream.next();
        let mapper = self.mapper.clone();
        Box::pin(async move {
            match pull.await? {
                Some(value) => Ok(Some((mapper)(value).await?)),
                None => Ok(None),
            }
        })
    }

    fn stop(&mut self) {
        self.upstream.stop();
    }
}
