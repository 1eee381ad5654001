//! Bounded-concurrency prefetching engine.

use crate::combinator::lock;
use futures::stream::{FuturesUnordered, StreamExt};
use sf_error::Result;
use sf_traits::{AsyncIterable, BoxedIterable, Pull};
use std::collections::VecDeque;
use std::future::{poll_fn, Future};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};
use tracing::{debug, trace};

/// An in-flight upstream pull tagged with its issue sequence.
type TaggedPull<T> = Pin<Box<dyn Future<Output = (u64, Result<Option<T>>)> + Send>>;

/// Snapshot of the engine's bookkeeping, for observability.
#[derive(Debug, Clone)]
pub struct BufferStats {
    /// Number of pulls currently in flight.
    pub in_flight: usize,

    /// Number of resolved results not yet delivered downstream.
    pub ready: usize,

    /// Sequence index the next issued pull will carry.
    pub next_sequence: u64,

    /// Whether the engine has stopped issuing new pulls.
    pub stopped: bool,
}

struct EngineState<T> {
    upstream: BoxedIterable<T>,

    /// Prefetch window size; the in-flight count never exceeds this.
    size: usize,

    /// Ever-increasing issue counter tagging each pull.
    sequence: u64,

    /// In-flight pulls, raced as one fan-in set.
    in_flight: FuturesUnordered<TaggedPull<T>>,

    /// Resolved-but-undelivered results, in completion order.
    ready: VecDeque<Result<Option<T>>>,

    /// No further pulls are issued once set.
    stopped: bool,

    /// Final exhaustion has been reported downstream.
    finished: bool,

    /// Wakers of pullers parked while another puller drained the set.
    waiters: Vec<Waker>,
}

impl<T: Send + 'static> EngineState<T> {
    /// Issues new upstream pulls until the window is full.
    fn refill(&mut self) {
        while !self.stopped && self.in_flight.len() < self.size {
            let seq = self.sequence;
            self.sequence += 1;
            let pull = self.upstream.next();
            trace!(seq, "issuing upstream fetch");
            self.in_flight
                .push(Box::pin(async move { (seq, pull.await) }));
        }
    }

    fn park(&mut self, cx: &Context<'_>) {
        let waker = cx.waker();
        if !self.waiters.iter().any(|w| w.will_wake(waker)) {
            self.waiters.push(waker.clone());
        }
    }

    fn wake_waiters(&mut self) {
        for waker in self.waiters.drain(..) {
            waker.wake();
        }
    }

    fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<T>>> {
        loop {
            if self.finished && self.ready.is_empty() {
                return Poll::Ready(Ok(None));
            }

            self.refill();

            // Move every settled fetch into the ready queue; the race
            // across the whole in-flight set happens here, with the waker
            // registered by the set itself.
            while let Poll::Ready(Some((seq, result))) = self.in_flight.poll_next_unpin(cx) {
                trace!(seq, "fetch settled");
                self.ready.push_back(result);
            }

            if let Some(result) = self.ready.pop_front() {
                match result {
                    Ok(Some(value)) => {
                        self.wake_waiters();
                        return Poll::Ready(Ok(Some(value)));
                    }
                    Ok(None) => {
                        // Exhaustion observed. Stop issuing pulls, but keep
                        // draining: values already fetched, or still in
                        // flight from before this point, are delivered.
                        if !self.stopped {
                            debug!(
                                in_flight = self.in_flight.len(),
                                ready = self.ready.len(),
                                "upstream exhausted, draining remaining fetches"
                            );
                            self.stopped = true;
                            self.upstream.stop();
                        }
                        continue;
                    }
                    Err(error) => {
                        // A failed fetch fails this pull only; bookkeeping
                        // for the independent in-flight fetches is intact.
                        self.wake_waiters();
                        return Poll::Ready(Err(error));
                    }
                }
            }

            if self.in_flight.is_empty() {
                if self.stopped {
                    self.finished = true;
                    self.wake_waiters();
                    return Poll::Ready(Ok(None));
                }
                // Window refills on the next iteration.
                continue;
            }

            self.park(cx);
            return Poll::Pending;
        }
    }
}

/// Overlaps up to `size` pending pulls against the upstream iterable.
///
/// Slow per-value asynchronous work (e.g. a mapped asynchronous function)
/// is pipelined rather than serialized. The trade-off is ordering: results
/// are delivered in completion order, not source order, so a fast fetch
/// overtakes a slow one. A window of 1 keeps source order exactly.
///
/// Every value the upstream produces before exhaustion is delivered
/// exactly once; observing exhaustion does not discard fetches that were
/// already issued. An explicit [`stop`] cancels in-flight fetches by
/// dropping them, and only already-resolved values remain drainable.
///
/// [`stop`]: AsyncIterable::stop
pub struct BufferedIterable<T> {
    state: Arc<Mutex<EngineState<T>>>,
}

impl<T: Send + 'static> BufferedIterable<T> {
    /// Creates a buffering engine over an upstream iterable.
    ///
    /// A `size` of 0 is treated as 1; use [`BufferConfig::validate`] for a
    /// checked configuration path.
    ///
    /// [`BufferConfig::validate`]: crate::buffer::BufferConfig::validate
    pub fn new(upstream: BoxedIterable<T>, size: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState {
                upstream,
                size: size.max(1),
                sequence: 0,
                in_flight: FuturesUnordered::new(),
                ready: VecDeque::new(),
                stopped: false,
                finished: false,
                waiters: Vec::new(),
            })),
        }
    }

    /// Returns a snapshot of the engine's bookkeeping.
    pub fn stats(&self) -> BufferStats {
        let state = lock(&self.state);
        BufferStats {
            in_flight: state.in_flight.len(),
            ready: state.ready.len(),
            next_sequence: state.sequence,
            stopped: state.stopped,
        }
    }
}

impl<T: Send + 'static> AsyncIterable<T> for BufferedIterable<T> {
    fn next(&mut self) -> Pull<T> {
        let state = self.state.clone();
        Box::pin(poll_fn(move |cx| lock(&state).poll_pull(cx)))
    }

    fn stop(&mut self) {
        let mut state = lock(&self.state);
        if state.stopped {
            return;
        }
        debug!(
            in_flight = state.in_flight.len(),
            ready = state.ready.len(),
            "stop requested, cancelling in-flight fetches"
        );
        state.stopped = true;
        // Dropping an in-flight pull cancels it.
        state.in_flight.clear();
        state.upstream.stop();
        state.wake_waiters();
    }
}
