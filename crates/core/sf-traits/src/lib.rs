//! sf-traits - Core traits for streamflow.
//!
//! This crate defines the contracts the rest of the workspace implements
//! and consumes:
//!
//! - [`AsyncIterable`]: the two-operation pull protocol (`next` / `stop`)
//! - [`PullSource`]: the asynchronous construction input for custom sources
//! - [`Collector`]: declarative accumulate/finish descriptor for terminal
//!   collection
//! - [`Transformer`]: stateful mid-stream operator descriptor
//!   (accumulate, optionally emit, optionally reset, optionally flush)

pub mod collector;
pub mod iterable;
pub mod source;
pub mod transformer;

pub use collector::Collector;
pub use iterable::{AsyncIterable, BoxedIterable, Deferred, Pull};
pub use source::PullSource;
pub use transformer::{TransformStep, Transformer};
