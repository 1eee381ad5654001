//! sf-stream - Lazy, composable asynchronous pull streams for streamflow.
//!
//! This crate provides the asynchronous iteration engine: a pull-based,
//! future-driven iterator abstraction with explicit cooperative
//! cancellation, a bounded-concurrency prefetching buffer, a
//! concurrency-safe limiting gate, and a generic stateful mid-stream
//! transformation mechanism. It supports:
//!
//! - Fluent pipelines over any source: literal values, synchronous
//!   iterators, or asynchronous [`PullSource`] implementations
//! - Strict pull semantics: nothing runs until a terminal operation pulls
//! - One-way, idempotent cancellation that propagates up the whole chain
//! - Bounded overlap of slow per-value asynchronous work via `buffered`
//!
//! # Example
//!
//! ```ignore
//! use sf_stream::AsyncStream;
//!
//! let mut pipeline = AsyncStream::from_iter(work_items)
//!     .map(|item| async move { process(item).await })
//!     .buffered(4)
//!     .limit(100);
//!
//! let results = pipeline.to_vec().await?;
//! ```
//!
//! # Ordering and concurrency
//!
//! `filter`, `map`, `flat_map`, `transform` and `limit` preserve source
//! order under sequential pulls. `buffered` deliberately relaxes ordering
//! to completion order in exchange for pipelining; a window of 1 keeps
//! source order. Concurrency is overlap of pending pulls, never a second
//! consumer: every iterable in a chain has exactly one owner.

pub mod buffer;
pub mod collectors;
pub mod combinator;
pub mod optional;
pub mod source;
pub mod stream;
pub mod transformers;

pub use buffer::{BufferConfig, BufferStats, BufferedIterable, DEFAULT_BUFFER_SIZE};
pub use optional::AsyncOptional;
pub use stream::AsyncStream;

pub use sf_error::{Result, StreamError};
pub use sf_traits::{
    AsyncIterable, BoxedIterable, Collector, Deferred, Pull, PullSource, TransformStep,
    Transformer,
};
