//! Stream-of-streams flattening.

use super::lock;
use crate::stream::AsyncStream;
use sf_traits::{AsyncIterable, BoxedIterable, Pull};
use std::sync::{Arc, Mutex};

/// Mapper producing the inner stream for one upstream value.
pub(crate) type StreamMapper<T, U> = Arc<dyn Fn(T) -> AsyncStream<U> + Send + Sync>;

struct FlatMapState<T, U> {
    upstream: BoxedIterable<T>,
    /// The inner stream currently being drained, if any.
    current: Option<BoxedIterable<U>>,
    stopped: bool,
}

/// Flattens a stream of streams, strictly sequentially.
///
/// One inner stream is drained to exhaustion before the next upstream
/// element is mapped, so upstream order and nested order are both
/// preserved: everything produced by mapping element `i` is emitted before
/// anything produced by mapping element `i + 1`. Empty inner streams are
/// skipped without gaps.
///
/// `stop` forwards to the upstream only; the inner stream being drained is
/// simply abandoned.
pub struct FlatMapIterable<T, U> {
    state: Arc<Mutex<FlatMapState<T, U>>>,
    mapper: StreamMapper<T, U>,
}

impl<T, U> FlatMapIterable<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    /// Creates a flattening decorator over an upstream iterable.
    pub fn new(upstream: BoxedIterable<T>, mapper: StreamMapper<T, U>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FlatMapState {
                upstream,
                current: None,
                stopped: false,
            })),
            mapper,
        }
    }
}

impl<T, U> AsyncIterable<U> for FlatMapIterable<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn next(&mut self) -> Pull<U> {
        let state = self.state.clone();
        let mapper = self.mapper.clone();
        Box::pin(async move {
            loop {
                // Drain the inner stream currently being flattened.
                let inner_pull = {
                    let mut state = lock(&state);
                    if state.stopped {
                        return Ok(None);
                    }
                    state.current.as_mut().map(|inner| inner.next())
                };
                if let Some(pull) = inner_pull {
                    if let Some(value) = pull.await? {
                        return Ok(Some(value));
                    }
                    lock(&state).current = None;
                }

                // Advance to the next upstream element.
                let upstream_pull = {
                    let mut state = lock(&state);
                    if state.stopped {
                        return Ok(None);
                    }
                    state.upstream.next()
                };
                match upstream_pull.await? {
                    Some(value) => {
                        let inner = (mapper)(value);
                        lock(&state).current = Some(inner.into_iterable());
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
