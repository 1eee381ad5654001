//! Combinator layer: decorators over the pull protocol.
//!
//! Each combinator owns exactly one upstream iterable and implements the
//! protocol itself, so combinators compose freely:
//!
//! - [`MapIterable`]: per-value asynchronous mapping, overlap-friendly
//! - [`FilterIterable`]: predicate filtering
//! - [`FlatMapIterable`]: strictly sequential stream-of-streams flattening
//! - [`TransformIterable`]: generic stateful transformation
//! - [`LimitIterable`]: concurrency-safe delivery bound with cancellation
//! - [`SortedIterable`]: drain, order by comparator, replay

mod filter;
mod flat_map;
mod limit;
mod map;
mod sorted;
mod transform;

pub use filter::FilterIterable;
pub use flat_map::FlatMapIterable;
pub use limit::LimitIterable;
pub use map::MapIterable;
pub use sorted::SortedIterable;
pub use transform::TransformIterable;

pub(crate) use flat_map::StreamMapper;
pub(crate) use sorted::Comparator;

use sf_traits::Deferred;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Type-erased asynchronous mapper.
pub(crate) type Mapper<T, U> = Arc<dyn Fn(T) -> Deferred<U> + Send + Sync>;

/// Type-erased asynchronous predicate.
pub(crate) type Predicate<T> = Arc<dyn Fn(&T) -> Deferred<bool> + Send + Sync>;

/// Locks combinator state, recovering from poisoning.
///
/// A poisoned guard only means a caller panicked mid-pull; every critical
/// section leaves the state consistent, so the data is still usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
