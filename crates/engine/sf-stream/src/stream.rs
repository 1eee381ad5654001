//! The fluent stream façade.

use crate::buffer::{BufferConfig, BufferedIterable};
use crate::combinator::{
    Comparator, FilterIterable, FlatMapIterable, LimitIterable, MapIterable, Mapper,
    Predicate, SortedIterable, StreamMapper, TransformIterable,
};
use crate::source::{EmptySource, IteratorSource, SourceIterable};
use crate::transformers::{DistinctTransformer, IndexedTransformer};
use sf_error::{Result, StreamError};
use sf_traits::{AsyncIterable, BoxedIterable, Collector, PullSource, Transformer};
use std::cmp::Ordering;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tracing::trace;

/// A single-use, lazily evaluated asynchronous stream.
///
/// Wraps one [`AsyncIterable`] chain. Intermediate operations (`map`,
/// `filter`, `flat_map`, `transform`, `buffered`, `limit`, `indexed`,
/// `sorted`, `distinct`) consume the façade and return a fresh one wrapping
/// a fresh combinator; nothing is pulled until a terminal operation drives
/// the chain.
///
/// Terminal operations (`to_vec`, `count`, `collect`, `find_first`,
/// `find_first_matching`, `any_match`, `all_match`, `none_match`) consume
/// the stream's values. At most one terminal operation may ever run on one
/// instance: a second invocation fails immediately with
/// [`StreamError::Terminated`] instead of re-executing.
pub struct AsyncStream<T> {
    iterable: BoxedIterable<T>,
    terminated: bool,
}

impl<T: Send + 'static> AsyncStream<T> {
    /// Wraps an existing iterable chain.
    pub fn from_iterable(iterable: BoxedIterable<T>) -> Self {
        Self {
            iterable,
            terminated: false,
        }
    }

    /// Creates a stream with no values.
    pub fn empty() -> Self {
        Self::from_iterable(Box::new(EmptySource::new()))
    }

    /// Creates a stream over literal values.
    pub fn from_values(values: Vec<T>) -> Self {
        Self::from_iterable(Box::new(IteratorSource::new(values.into_iter())))
    }

    /// Creates a stream over a synchronous pull iterator.
    ///
    /// The iterator is advanced lazily, one value per pull.
    pub fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self::from_iterable(Box::new(IteratorSource::new(iter.into_iter())))
    }

    /// Creates a stream over an asynchronous [`PullSource`].
    pub fn from_source<S>(source: S) -> Self
    where
        S: PullSource<Item = T> + 'static,
    {
        Self::from_iterable(Box::new(SourceIterable::new(source)))
    }

    /// Concatenates streams end to end, modeled as flattening a stream of
    /// streams.
    pub fn concat(streams: Vec<AsyncStream<T>>) -> Self {
        AsyncStream::from_values(streams).flat_map(|stream| stream)
    }

    /// Unwraps the underlying iterable chain.
    pub fn into_iterable(self) -> BoxedIterable<T> {
        self.iterable
    }

    // ------------------------------------------------------------------
    // Intermediate operations
    // ------------------------------------------------------------------

    /// Transforms each value with an asynchronous mapper.
    ///
    /// Mapper futures started by overlapping pulls (e.g. under `buffered`)
    /// resolve concurrently.
    pub fn map<U, F, Fut>(self, mapper: F) -> AsyncStream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U>> + Send + 'static,
    {
        let mapper: Mapper<T, U> = Arc::new(move |value| Box::pin(mapper(value)));
        AsyncStream::from_iterable(Box::new(MapIterable::new(self.iterable, mapper)))
    }

    /// Keeps only the values satisfying an asynchronous predicate.
    pub fn filter<F, Fut>(self, predicate: F) -> AsyncStream<T>
    where
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        let predicate: Predicate<T> = Arc::new(move |value| Box::pin(predicate(value)));
        AsyncStream::from_iterable(Box::new(FilterIterable::new(self.iterable, predicate)))
    }

    /// Maps each value to a stream and flattens the results, strictly
    /// sequentially and in order.
    pub fn flat_map<U, F>(self, mapper: F) -> AsyncStream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> AsyncStream<U> + Send + Sync + 'static,
    {
        let mapper: StreamMapper<T, U> = Arc::new(mapper);
        AsyncStream::from_iterable(Box::new(FlatMapIterable::new(self.iterable, mapper)))
    }

    /// Applies a stateful [`Transformer`] descriptor mid-stream.
    pub fn transform<X>(self, transformer: X) -> AsyncStream<X::Output>
    where
        X: Transformer<Input = T> + 'static,
    {
        AsyncStream::from_iterable(Box::new(TransformIterable::new(
            self.iterable,
            transformer,
        )))
    }

    /// Overlaps up to `size` pending pulls against the upstream.
    ///
    /// Values are delivered in completion order, not source order; see
    /// [`BufferedIterable`] for the exact contract. A `size` of 0 is
    /// treated as 1.
    pub fn buffered(self, size: usize) -> AsyncStream<T> {
        AsyncStream::from_iterable(Box::new(BufferedIterable::new(self.iterable, size)))
    }

    /// Overlapping pulls configured through a [`BufferConfig`].
    pub fn buffered_with(self, config: BufferConfig) -> AsyncStream<T> {
        self.buffered(config.size)
    }

    /// Bounds the number of values ever delivered downstream.
    pub fn limit(self, max: usize) -> AsyncStream<T> {
        AsyncStream::from_iterable(Box::new(LimitIterable::new(self.iterable, max)))
    }

    /// Pairs each value with its zero-based position.
    pub fn indexed(self) -> AsyncStream<(usize, T)> {
        self.transform(IndexedTransformer::new())
    }

    /// Drops values already delivered earlier in the stream.
    pub fn distinct(self) -> AsyncStream<T>
    where
        T: Eq + Hash + Clone,
    {
        self.transform(DistinctTransformer::new())
    }

    /// Orders the stream by a comparator.
    ///
    /// The upstream is drained on the first pull; nothing is delivered
    /// before the upstream is exhausted.
    pub fn sorted<F>(self, comparator: F) -> AsyncStream<T>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        let comparator: Comparator<T> = Arc::new(comparator);
        AsyncStream::from_iterable(Box::new(SortedIterable::new(self.iterable, comparator)))
    }

    // ------------------------------------------------------------------
    // Terminal operations
    // ------------------------------------------------------------------

    fn begin_terminal(&mut self) -> Result<()> {
        if self.terminated {
            return Err(StreamError::Terminated);
        }
        self.terminated = true;
        Ok(())
    }

    /// Drains the stream into a `Vec`, in delivery order.
    pub async fn to_vec(&mut self) -> Result<Vec<T>> {
        self.begin_terminal()?;
        let mut values = Vec::new();
        while let Some(value) = self.iterable.next().await? {
            values.push(value);
        }
        Ok(values)
    }

    /// Counts the values in the stream.
    pub async fn count(&mut self) -> Result<usize> {
        self.begin_terminal()?;
        let mut count = 0;
        while self.iterable.next().await?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    /// Drains the stream through a [`Collector`] descriptor.
    pub async fn collect<C>(&mut self, collector: C) -> Result<C::Output>
    where
        C: Collector<Input = T>,
    {
        self.begin_terminal()?;
        let mut accumulator = collector.empty_accumulator();
        while let Some(value) = self.iterable.next().await? {
            collector.fold_one(&mut accumulator, value)?;
        }
        collector.finish(accumulator)
    }

    /// Pulls exactly one value, then stops the whole upstream chain.
    ///
    /// A short-circuiting consumer halts all upstream work: no further
    /// pulls are issued, and a buffering engine upstream cancels its
    /// in-flight fetches.
    pub async fn find_first(&mut self) -> Result<Option<T>> {
        self.begin_terminal()?;
        let value = self.iterable.next().await?;
        trace!(found = value.is_some(), "first value resolved, stopping upstream");
        self.iterable.stop();
        Ok(value)
    }

    /// Pulls the first value satisfying the predicate, then stops the
    /// chain. Defined as filtering followed by [`find_first`].
    ///
    /// [`find_first`]: AsyncStream::find_first
    pub async fn find_first_matching<F, Fut>(&mut self, predicate: F) -> Result<Option<T>>
    where
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        self.begin_terminal()?;
        let upstream = std::mem::replace(
            &mut self.iterable,
            Box::new(EmptySource::new()) as BoxedIterable<T>,
        );
        let predicate: Predicate<T> = Arc::new(move |value| Box::pin(predicate(value)));
        let mut filtered = FilterIterable::new(upstream, predicate);
        let value = filtered.next().await?;
        filtered.stop();
        Ok(value)
    }

    /// True if any value satisfies the predicate. Short-circuits and stops
    /// the chain on the first match.
    pub async fn any_match<F, Fut>(&mut self, predicate: F) -> Result<bool>
    where
        F: Fn(&T) -> Fut + Send,
        Fut: Future<Output = Result<bool>> + Send,
    {
        self.begin_terminal()?;
        while let Some(value) = self.iterable.next().await? {
            if predicate(&value).await? {
                self.iterable.stop();
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// True if every value satisfies the predicate. Short-circuits and
    /// stops the chain on the first failing value.
    pub async fn all_match<F, Fut>(&mut self, predicate: F) -> Result<bool>
    where
        F: Fn(&T) -> Fut + Send,
        Fut: Future<Output = Result<bool>> + Send,
    {
        self.begin_terminal()?;
        while let Some(value) = self.iterable.next().await? {
            if !predicate(&value).await? {
                self.iterable.stop();
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// True if no value satisfies the predicate. Short-circuits and stops
    /// the chain on the first match.
    pub async fn none_match<F, Fut>(&mut self, predicate: F) -> Result<bool>
    where
        F: Fn(&T) -> Fut + Send,
        Fut: Future<Output = Result<bool>> + Send,
    {
        self.begin_terminal()?;
        while let Some(value) = self.iterable.next().await? {
            if predicate(&value).await? {
                self.iterable.stop();
                return Ok(false);
            }
        }
        Ok(true)
    }
}
