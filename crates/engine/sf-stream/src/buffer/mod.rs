//! Bounded-concurrency prefetching.
//!
//! This module overlaps pending upstream pulls to pipeline slow per-value
//! asynchronous work, trading strict source order for completion-order
//! delivery:
//!
//! - [`BufferConfig`]: configuration for the prefetch window
//! - [`BufferedIterable`]: the engine itself
//! - [`BufferStats`]: bookkeeping snapshot
//!
//! # Usage
//!
//! ```ignore
//! use sf_stream::AsyncStream;
//!
//! let values = AsyncStream::from_values(uris)
//!     .map(|uri| async move { fetch(uri).await })
//!     .buffered(4)
//!     .to_vec()
//!     .await?;
//! ```
//!
//! # Ordering
//!
//! With a window larger than 1, results are delivered in the order their
//! fetches complete. Every value the upstream produces before exhaustion
//! or cancellation is delivered exactly once; which order they arrive in
//! depends on per-value latency. A window of 1 pulls sequentially and
//! preserves source order exactly.

mod config;
mod engine;

pub use config::{BufferConfig, DEFAULT_BUFFER_SIZE};
pub use engine::{BufferStats, BufferedIterable};
