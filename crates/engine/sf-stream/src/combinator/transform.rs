//! Generic stateful transformation.

use super::lock;
use sf_traits::{AsyncIterable, BoxedIterable, Pull, Transformer};
use std::sync::{Arc, Mutex};
use tracing::trace;

struct TransformState<X: Transformer> {
    upstream: BoxedIterable<X::Input>,
    transformer: X,
    /// Live accumulator, created lazily on first fold.
    accumulator: Option<X::State>,
    done: bool,
}

/// Applies a [`Transformer`] descriptor to an upstream iterable.
///
/// Each pull folds upstream values into the accumulator until the fold
/// step emits a result. When the step requests a reset, the accumulator is
/// discarded first and recreated lazily on the next fold. Upstream
/// exhaustion invokes the finisher exactly once to flush a trailing
/// partial result; after that every pull reports exhaustion.
pub struct TransformIterable<X: Transformer> {
    state: Arc<Mutex<TransformState<X>>>,
}

impl<X> TransformIterable<X>
where
    X: Transformer + 'static,
{
    /// Creates a transforming decorator over an upstream iterable.
    pub fn new(upstream: BoxedIterable<X::Input>, transformer: X) -> Self {
        Self {
            state: Arc::new(Mutex::new(TransformState {
                upstream,
                transformer,
                accumulator: None,
                done: false,
            })),
        }
    }
}

impl<X> AsyncIterable<X::Output> for TransformIterable<X>
where
    X: Transformer + 'static,
{
    fn next(&mut self) -> Pull<X::Output> {
        let state = self.state.clone();
        Box::pin(async move {
            loop {
                let pull = {
                    let mut state = lock(&state);
                    if state.done {
                        return Ok(None);
                    }
                    state.upstream.next()
                };
                match pull.await? {
                    Some(item) => {
                        let mut state = lock(&state);
                        if state.done {
                            return Ok(None);
                        }
                        let TransformState {
                            transformer,
                            accumulator,
                            ..
                        } = &mut *state;
                        let acc =
                            accumulator.get_or_insert_with(|| transformer.create_state());
                        let step = transformer.fold(acc, item)?;
                        if step.reset {
                            state.accumulator = None;
                        }
                        if let Some(output) = step.emit {
                            return Ok(Some(output));
                        }
                    }
                    None => {
                        let mut state = lock(&state);
                        if state.done {
                            return Ok(None);
                        }
                        state.done = true;
                        let flushed = match state.accumulator.take() {
                            Some(acc) => state.transformer.finish(acc)?,
                            None => None,
                        };
                        trace!(flushed = flushed.is_some(), "upstream exhausted");
                        return Ok(flushed);
                    }
                }
            }
        })
    }

    fn stop(&mut self) {
        let mut state = lock(&self.state);
        state.done = true;
        state.accumulator = None;
        state.upstream.stop();
    }
}
