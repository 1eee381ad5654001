//! Lazily resolved zero-or-one value container.

use crate::source::OnceSource;
use crate::stream::AsyncStream;
use sf_error::Result;
use sf_traits::Pull;
use std::fmt;
use std::future::Future;

/// A lazily resolved container of zero or one values.
///
/// Wraps a pending result that is either present or absent. The wrapped
/// computation is not driven until the optional is consumed (`get`,
/// `is_present`, `is_empty`, or conversion into a stream); the monadic
/// operations (`map`, `flat_map`, `filter`) defer resolution as well and
/// return new instances, leaving the input conceptually untouched.
///
/// Failures raised by the wrapped computation or by a callback travel
/// through the same deferred channel as values and surface when the
/// optional is consumed.
pub struct AsyncOptional<T> {
    future: Pull<T>,
}

impl<T: Send + 'static> AsyncOptional<T> {
    /// Wraps a literal value into a present optional.
    pub fn of(value: T) -> Self {
        Self {
            future: Box::pin(std::future::ready(Ok(Some(value)))),
        }
    }

    /// Creates an absent optional.
    pub fn empty() -> Self {
        Self {
            future: Box::pin(std::future::ready(Ok(None))),
        }
    }

    /// Wraps a deferred computation.
    ///
    /// The future is not polled until the optional is consumed.
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = Result<Option<T>>> + Send + 'static,
    {
        Self {
            future: Box::pin(future),
        }
    }

    /// Resolves the optional into its value, if any.
    pub async fn get(self) -> Result<Option<T>> {
        self.future.await
    }

    /// Resolves the optional and reports whether a value is present.
    pub async fn is_present(self) -> Result<bool> {
        Ok(self.future.await?.is_some())
    }

    /// Resolves the optional and reports whether it is absent.
    pub async fn is_empty(self) -> Result<bool> {
        Ok(self.future.await?.is_none())
    }

    /// Transforms the contained value with an asynchronous mapper.
    ///
    /// The mapper is not invoked when the optional resolves absent. A
    /// mapper that may itself produce no value should use [`flat_map`]
    /// with [`AsyncOptional::empty`] instead.
    ///
    /// [`flat_map`]: AsyncOptional::flat_map
    pub fn map<U, F, Fut>(self, mapper: F) -> AsyncOptional<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<U>> + Send + 'static,
    {
        AsyncOptional::from_future(async move {
            match self.future.await? {
                Some(value) => Ok(Some(mapper(value).await?)),
                None => Ok(None),
            }
        })
    }

    /// Transforms the contained value with a mapper that already returns
    /// an [`AsyncOptional`], without double wrapping.
    pub fn flat_map<U, F>(self, mapper: F) -> AsyncOptional<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> AsyncOptional<U> + Send + 'static,
    {
        AsyncOptional::from_future(async move {
            match self.future.await? {
                Some(value) => mapper(value).get().await,
                None => Ok(None),
            }
        })
    }

    /// Keeps the contained value only if the predicate holds.
    ///
    /// The predicate is evaluated only when a value is present; a failing
    /// predicate yields an absent optional.
    pub fn filter<F, Fut>(self, predicate: F) -> AsyncOptional<T>
    where
        F: FnOnce(&T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        AsyncOptional::from_future(async move {
            match self.future.await? {
                Some(value) => {
                    if predicate(&value).await? {
                        Ok(Some(value))
                    } else {
                        Ok(None)
                    }
                }
                None => Ok(None),
            }
        })
    }

    /// Converts the optional into a zero-or-one element stream.
    ///
    /// The value, once delivered, is never delivered again: the backing
    /// source is one-shot.
    pub fn into_stream(self) -> AsyncStream<T> {
        AsyncStream::from_iterable(Box::new(OnceSource::new(self)))
    }

    pub(crate) fn into_future(self) -> Pull<T> {
        self.future
    }
}

impl<T> fmt::Debug for AsyncOptional<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncOptional").finish_non_exhaustive()
    }
}
