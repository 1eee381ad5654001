//! Predicate filtering.

use super::{lock, Predicate};
use sf_traits::{AsyncIterable, BoxedIterable, Pull};
use std::sync::{Arc, Mutex};

struct FilterState<T> {
    upstream: BoxedIterable<T>,
    stopped: bool,
}

/// Keeps only the upstream values satisfying an asynchronous predicate.
///
/// Each pull keeps drawing from the upstream until a value passes the
/// predicate or the upstream is exhausted. The upstream handle is locked
/// only to initiate a pull, never across an await.
pub struct FilterIterable<T> {
    state: Arc<Mutex<FilterState<T>>>,
    predicate: Predicate<T>,
}

impl<T: Send + 'static> FilterIterable<T> {
    /// Creates a filtering decorator over an upstream iterable.
    pub fn new(upstream: BoxedIterable<T>, predicate: Predicate<T>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FilterState {
                upstream,
                stopped: false,
            })),
            predicate,
        }
    }
}

impl<T: Send + 'static> AsyncIterable<T> for FilterIterable<T> {
    fn next(&mut self) -> Pull<T> {
        let state = self.state.clone();
        let predicate = self.predicate.clone();
        Box::pin(async move {
            loop {
                let pull = {
                    let mut state = lock(&state);
                    if state.stopped {
                        return Ok(None);
                    }
                    state.upstream.next()
                };
                match pull.await? {
                    Some(value) => {
                        if (predicate)(&value).await? {
                            return Ok(Some(value));
                        }
                    }
                    None => return Ok(None),
                }
            }
        })
    }

    fn stop(&mut self) {
        let mut state = lock(&self.state);
        state.stopped = true;
        state.upstream.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::IteratorSource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn evens(upstream: BoxedIterable<i32>) -> FilterIterable<i32> {
        let predicate: Predicate<i32> = Arc::new(|value| {
            let keep = value % 2 == 0;
            Box::pin(async move { Ok(keep) })
        });
        FilterIterable::new(upstream, predicate)
    }

    #[tokio::test]
    async fn test_filter_skips_non_matching() {
        let source = IteratorSource::new(vec![1, 2, 3, 4, 5].into_iter());
        let mut filtered = evens(Box::new(source));

        assert_eq!(filtered.next().await.unwrap(), Some(2));
        assert_eq!(filtered.next().await.unwrap(), Some(4));
        assert_eq!(filtered.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_filter_exhaustion_without_match() {
        let source = IteratorSource::new(vec![1, 3, 5].into_iter());
        let mut filtered = evens(Box::new(source));
        assert_eq!(filtered.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_filter_predicate_failure_propagates() {
        let predicate: Predicate<i32> = Arc::new(|value| {
            let value = *value;
            Box::pin(async move {
                if value == 3 {
                    Err(anyhow::anyhow!("predicate failed").into())
                } else {
                    Ok(true)
                }
            })
        });

        let source = IteratorSource::new(vec![1, 3].into_iter());
        let mut filtered = FilterIterable::new(Box::new(source), predicate);

        assert_eq!(filtered.next().await.unwrap(), Some(1));
        assert!(filtered.next().await.is_err());
    }

    #[tokio::test]
    async fn test_stop_forwards_and_halts() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let probe = pulled.clone();
        let source = IteratorSource::new((0..100).map(move |i| {
            probe.fetch_add(1, Ordering::SeqCst);
            i
        }));

        let mut filtered = evens(Box::new(source));
        assert_eq!(filtered.next().await.unwrap(), Some(0));
        filtered.stop();
        assert_eq!(filtered.next().await.unwrap(), None);
        assert_eq!(pulled.load(Ordering::SeqCst), 1);
    }
}
