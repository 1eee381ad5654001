//! Drain, order, replay.

use super::lock;
use sf_traits::{AsyncIterable, BoxedIterable, Pull};
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Comparator deciding the replay order.
pub(crate) type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

struct SortedState<T> {
    upstream: BoxedIterable<T>,
    /// Values pulled so far, while the upstream is still being drained.
    pending: Vec<T>,
    /// Ordered values, once draining has completed.
    drained: Option<VecDeque<T>>,
    stopped: bool,
}

/// Orders an upstream iterable by a comparator.
///
/// Ordering requires the whole input, so the first pull drains the
/// upstream to exhaustion before anything is delivered; later pulls replay
/// the ordered values one at a time.
pub struct SortedIterable<T> {
    state: Arc<Mutex<SortedState<T>>>,
    comparator: Comparator<T>,
}

impl<T: Send + 'static> SortedIterable<T> {
    /// Creates an ordering decorator over an upstream iterable.
    pub fn new(upstream: BoxedIterable<T>, comparator: Comparator<T>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SortedState {
                upstream,
                pending: Vec::new(),
                drained: None,
                stopped: false,
            })),
            comparator,
        }
    }
}

impl<T: Send + 'static> AsyncIterable<T> for SortedIterable<T> {
    fn next(&mut self) -> Pull<T> {
        let state = self.state.clone();
        let comparator = self.comparator.clone();
        Box::pin(async move {
            loop {
                let pull = {
                    let mut state = lock(&state);
                    if state.stopped {
                        return Ok(None);
                    }
                    if state.drained.is_some() {
                        break;
                    }
                    state.upstream.next()
                };
                match pull.await? {
                    Some(value) => lock(&state).pending.push(value),
                    None => {
                        let mut state = lock(&state);
                        let mut values = std::mem::take(&mut state.pending);
                        values.sort_by(|a, b| (comparator)(a, b));
                        state.drained = Some(VecDeque::from(values));
                        break;
                    }
                }
            }
            let mut state = lock(&state);
            if state.stopped {
                return Ok(None);
            }
            Ok(state.drained.as_mut().and_then(|queue| queue.pop_front()))
        })
    }

    fn stop(&mut self) {
        let mut state = lock(&self.state);
        state.stopped = true;
        state.pending.clear();
        state.drained = None;
        state.upstream.stop();
    }
}
