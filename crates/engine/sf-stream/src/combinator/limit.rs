//! Delivery bound with cancellation.

use super::lock;
use sf_traits::{AsyncIterable, BoxedIterable, Pull};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::trace;

/// Enforces an upper bound on the number of values ever delivered, safe
/// under overlapping pulls.
///
/// A committed counter is checked before the upstream pull is initiated and
/// re-checked when the pull resolves; a value that resolves after the bound
/// has been reached by other in-flight pulls is silently discarded. Under
/// strictly sequential pulls this delivers exactly the first `max` upstream
/// values in order; under overlapping pulls it delivers at most `max`
/// values in total, with no guarantee about which in-flight values win.
/// Reaching the bound stops the upstream.
pub struct LimitIterable<T> {
    upstream: Arc<Mutex<BoxedIterable<T>>>,
    committed: Arc<AtomicUsize>,
    stopped: Arc<AtomicBool>,
    max: usize,
}

impl<T: Send + 'static> LimitIterable<T> {
    /// Creates a limiting decorator over an upstream iterable.
    pub fn new(upstream: BoxedIterable<T>, max: usize) -> Self {
        Self {
            upstream: Arc::new(Mutex::new(upstream)),
            committed: Arc::new(AtomicUsize::new(0)),
            stopped: Arc::new(AtomicBool::new(false)),
            max,
        }
    }
}

impl<T: Send + 'static> AsyncIterable<T> for LimitIterable<T> {
    fn next(&mut self) -> Pull<T> {
        let upstream = self.upstream.clone();
        let committed = self.committed.clone();
        let stopped = self.stopped.clone();
        let max = self.max;
        Box::pin(async move {
            if stopped.load(Ordering::SeqCst) {
                return Ok(None);
            }
            if committed.load(Ordering::SeqCst) >= max {
                stopped.store(true, Ordering::SeqCst);
                lock(&upstream).stop();
                return Ok(None);
            }

            // Initiate the pull without holding the lock across its await;
            // other overlapping pulls may resolve while this one is pending.
            let pull = lock(&upstream).next();
            match pull.await? {
                Some(value) => {
                    let won = committed
                        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                            (count < max).then_some(count + 1)
                        })
                        .is_ok();
                    if won {
                        Ok(Some(value))
                    } else {
                        trace!(max, "discarding in-flight value past the limit");
                        stopped.store(true, Ordering::SeqCst);
                        lock(&upstream).stop();
                        Ok(None)
                    }
                }
                None => Ok(None),
            }
        })
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        lock(&self.upstream).stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::IteratorSource;
    use futures::future::join_all;

    fn counted_source(
        len: usize,
    ) -> (BoxedIterable<usize>, Arc<AtomicUsize>) {
        let pulled = Arc::new(AtomicUsize::new(0));
        let probe = pulled.clone();
        let source = IteratorSource::new((0..len).map(move |i| {
            probe.fetch_add(1, Ordering::SeqCst);
            i
        }));
        (Box::new(source), pulled)
    }

    #[tokio::test]
    async fn test_sequential_returns_first_max_in_order() {
        let (source, pulled) = counted_source(10);
        let mut limited = LimitIterable::new(source, 3);

        assert_eq!(limited.next().await.unwrap(), Some(0));
        assert_eq!(limited.next().await.unwrap(), Some(1));
        assert_eq!(limited.next().await.unwrap(), Some(2));
        // The bound is reached before a fourth upstream pull is issued.
        assert_eq!(limited.next().await.unwrap(), None);
        assert_eq!(limited.next().await.unwrap(), None);
        assert_eq!(pulled.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_limit_zero_stops_immediately() {
        let (source, pulled) = counted_source(10);
        let mut limited = LimitIterable::new(source, 0);

        assert_eq!(limited.next().await.unwrap(), None);
        assert_eq!(pulled.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_limit_beyond_source_length() {
        let (source, _) = counted_source(2);
        let mut limited = LimitIterable::new(source, 5);

        assert_eq!(limited.next().await.unwrap(), Some(0));
        assert_eq!(limited.next().await.unwrap(), Some(1));
        assert_eq!(limited.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_pulls_deliver_at_most_max() {
        let (source, _) = counted_source(32);
        let mut limited = LimitIterable::new(source, 5);

        let pulls: Vec<_> = (0..16).map(|_| limited.next()).collect();
        let delivered = join_all(pulls)
            .await
            .into_iter()
            .filter_map(|result| result.unwrap())
            .count();
        assert!(delivered <= 5);
    }

    #[tokio::test]
    async fn test_stop_forwards() {
        let (source, pulled) = counted_source(10);
        let mut limited = LimitIterable::new(source, 5);

        assert_eq!(limited.next().await.unwrap(), Some(0));
        limited.stop();
        assert_eq!(limited.next().await.unwrap(), None);
        assert_eq!(pulled.load(Ordering::SeqCst), 1);
    }
}
