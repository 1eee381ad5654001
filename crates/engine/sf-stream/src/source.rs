//! Source implementations feeding pipelines from the outside world.
//!
//! Sources sit at the bottom of every pipeline:
//!
//! - [`IteratorSource`]: bridges a synchronous pull iterator
//! - [`EmptySource`]: the always-exhausted source
//! - [`OnceSource`]: one-shot delivery of an [`AsyncOptional`] value
//! - [`SourceIterable`]: bridges a [`PullSource`] implementation

use crate::optional::AsyncOptional;
use sf_traits::{AsyncIterable, Pull, PullSource};
use std::future::ready;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Bridges a synchronous pull iterator into the asynchronous protocol.
///
/// The iterator is advanced synchronously at pull-initiation time, so even
/// overlapping pulls observe values in iterator order. The source fuses
/// itself once the iterator is exhausted.
pub struct IteratorSource<I> {
    iter: I,
    stopped: bool,
}

impl<I> IteratorSource<I>
where
    I: Iterator + Send,
    I::Item: Send + 'static,
{
    /// Creates a source over a synchronous iterator.
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            stopped: false,
        }
    }
}

impl<I> AsyncIterable<I::Item> for IteratorSource<I>
where
    I: Iterator + Send,
    I::Item: Send + 'static,
{
    fn next(&mut self) -> Pull<I::Item> {
        if self.stopped {
            return Box::pin(ready(Ok(None)));
        }
        let item = self.iter.next();
        if item.is_none() {
            self.stopped = true;
        }
        Box::pin(ready(Ok(item)))
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

/// The always-exhausted source.
pub struct EmptySource<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> EmptySource<T> {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for EmptySource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> AsyncIterable<T> for EmptySource<T> {
    fn next(&mut self) -> Pull<T> {
        Box::pin(ready(Ok(None)))
    }

    fn stop(&mut self) {}
}

/// One-shot delivery of a lazily resolved optional value.
///
/// The first pull resolves the wrapped optional; every later pull reports
/// exhaustion, so the value can never be delivered twice.
pub struct OnceSource<T> {
    value: Option<AsyncOptional<T>>,
}

impl<T: Send + 'static> OnceSource<T> {
    /// Creates a one-shot source over an optional.
    pub fn new(optional: AsyncOptional<T>) -> Self {
        Self {
            value: Some(optional),
        }
    }
}

impl<T: Send + 'static> AsyncIterable<T> for OnceSource<T> {
    fn next(&mut self) -> Pull<T> {
        match self.value.take() {
            Some(optional) => optional.into_future(),
            None => Box::pin(ready(Ok(None))),
        }
    }

    fn stop(&mut self) {
        self.value = None;
    }
}

/// Bridges a [`PullSource`] implementation into the pull protocol.
///
/// Overlapping pulls are serialized through a mutex so the source only ever
/// sees strictly sequential `pull` calls, and the source is fused after the
/// first exhaustion so post-exhaustion pulls are a non-event.
pub struct SourceIterable<S> {
    source: Arc<Mutex<S>>,
    stopped: Arc<AtomicBool>,
    fused: Arc<AtomicBool>,
}

impl<S> SourceIterable<S>
where
    S: PullSource + 'static,
{
    /// Creates an iterable over a pull source.
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(Mutex::new(source)),
            stopped: Arc::new(AtomicBool::new(false)),
            fused: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<S> AsyncIterable<S::Item> for SourceIterable<S>
where
    S: PullSource + 'static,
{
    fn next(&mut self) -> Pull<S::Item> {
        let source = self.source.clone();
        let stopped = self.stopped.clone();
        let fused = self.fused.clone();
        Box::pin(async move {
            if stopped.load(Ordering::SeqCst) || fused.load(Ordering::SeqCst) {
                return Ok(None);
            }
            let mut source = source.lock().await;
            // Re-check under the lock: a stop may have landed while this
            // pull was queued behind another one.
            if stopped.load(Ordering::SeqCst) || fused.load(Ordering::SeqCst) {
                return Ok(None);
            }
            match source.pull().await? {
                Some(value) => Ok(Some(value)),
                None => {
                    fused.store(true, Ordering::SeqCst);
                    Ok(None)
                }
            }
        })
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sf_error::Result;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_iterator_source_order() {
        let mut source = IteratorSource::new(vec![1, 2, 3].into_iter());
        assert_eq!(source.next().await.unwrap(), Some(1));
        assert_eq!(source.next().await.unwrap(), Some(2));
        assert_eq!(source.next().await.unwrap(), Some(3));
        assert_eq!(source.next().await.unwrap(), None);
        assert_eq!(source.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_iterator_source_stop() {
        let mut source = IteratorSource::new(vec![1, 2, 3].into_iter());
        assert_eq!(source.next().await.unwrap(), Some(1));
        source.stop();
        assert_eq!(source.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_iterator_source_overlapping_pulls_stay_ordered() {
        let mut source = IteratorSource::new(vec![10, 20].into_iter());
        // Initiate both pulls before awaiting either.
        let first = source.next();
        let second = source.next();
        assert_eq!(second.await.unwrap(), Some(20));
        assert_eq!(first.await.unwrap(), Some(10));
    }

    #[tokio::test]
    async fn test_empty_source() {
        let mut source = EmptySource::<i32>::new();
        assert_eq!(source.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_once_source_single_delivery() {
        let mut source = OnceSource::new(AsyncOptional::of(5));
        assert_eq!(source.next().await.unwrap(), Some(5));
        assert_eq!(source.next().await.unwrap(), None);
        assert_eq!(source.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_once_source_stop_discards_value() {
        let mut source = OnceSource::new(AsyncOptional::of(5));
        source.stop();
        assert_eq!(source.next().await.unwrap(), None);
    }

    struct ScriptedSource {
        items: VecDeque<i32>,
        pulls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PullSource for ScriptedSource {
        type Item = i32;

        async fn pull(&mut self) -> Result<Option<i32>> {
            self.pulls.fetch_add(1, Ordering::SeqCst);
            Ok(self.items.pop_front())
        }
    }

    #[tokio::test]
    async fn test_source_iterable_drains_and_fuses() {
        let pulls = Arc::new(AtomicUsize::new(0));
        let mut iterable = SourceIterable::new(ScriptedSource {
            items: VecDeque::from(vec![1, 2]),
            pulls: pulls.clone(),
        });

        assert_eq!(iterable.next().await.unwrap(), Some(1));
        assert_eq!(iterable.next().await.unwrap(), Some(2));
        assert_eq!(iterable.next().await.unwrap(), None);
        // Fused: the source itself is not pulled again after exhaustion.
        assert_eq!(iterable.next().await.unwrap(), None);
        assert_eq!(pulls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_source_iterable_stop() {
        let pulls = Arc::new(AtomicUsize::new(0));
        let mut iterable = SourceIterable::new(ScriptedSource {
            items: VecDeque::from(vec![1, 2]),
            pulls: pulls.clone(),
        });

        assert_eq!(iterable.next().await.unwrap(), Some(1));
        iterable.stop();
        assert_eq!(iterable.next().await.unwrap(), None);
        assert_eq!(pulls.load(Ordering::SeqCst), 1);
    }
}
