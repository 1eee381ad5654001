//! Built-in transformer descriptors.

use sf_error::Result;
use sf_traits::{TransformStep, Transformer};
use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;

/// Groups upstream values into fixed-size batches.
///
/// A full batch is emitted immediately and the accumulator reset; a
/// trailing partial batch is flushed when the upstream is exhausted. An
/// empty upstream yields no batches at all.
pub struct BatchTransformer<T> {
    size: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> BatchTransformer<T> {
    /// Creates a batching transformer. A `size` of 0 is treated as 1.
    pub fn new(size: usize) -> Self {
        Self {
            size: size.max(1),
            _marker: PhantomData,
        }
    }
}

impl<T: Send + 'static> Transformer for BatchTransformer<T> {
    type Input = T;
    type State = Vec<T>;
    type Output = Vec<T>;

    fn create_state(&self) -> Vec<T> {
        Vec::with_capacity(self.size)
    }

    fn fold(&self, state: &mut Vec<T>, item: T) -> Result<TransformStep<Vec<T>>> {
        state.push(item);
        if state.len() >= self.size {
            Ok(TransformStep::emit_and_reset(std::mem::take(state)))
        } else {
            Ok(TransformStep::hold())
        }
    }

    fn finish(&self, state: Vec<T>) -> Result<Option<Vec<T>>> {
        Ok(if state.is_empty() { None } else { Some(state) })
    }
}

/// Pairs each value with its zero-based position.
pub struct IndexedTransformer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> IndexedTransformer<T> {
    /// Creates an indexing transformer.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for IndexedTransformer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Transformer for IndexedTransformer<T> {
    type Input = T;
    type State = usize;
    type Output = (usize, T);

    fn create_state(&self) -> usize {
        0
    }

    fn fold(&self, state: &mut usize, item: T) -> Result<TransformStep<(usize, T)>> {
        let index = *state;
        *state += 1;
        Ok(TransformStep::emit((index, item)))
    }

    fn finish(&self, _state: usize) -> Result<Option<(usize, T)>> {
        Ok(None)
    }
}

/// Drops values already seen earlier in the traversal.
pub struct DistinctTransformer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> DistinctTransformer<T> {
    /// Creates a deduplicating transformer.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for DistinctTransformer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Transformer for DistinctTransformer<T>
where
    T: Eq + Hash + Clone + Send + 'static,
{
    type Input = T;
    type State = HashSet<T>;
    type Output = T;

    fn create_state(&self) -> HashSet<T> {
        HashSet::new()
    }

    fn fold(&self, state: &mut HashSet<T>, item: T) -> Result<TransformStep<T>> {
        if state.insert(item.clone()) {
            Ok(TransformStep::emit(item))
        } else {
            Ok(TransformStep::hold())
        }
    }

    fn finish(&self, _state: HashSet<T>) -> Result<Option<T>> {
        Ok(None)
    }
}

/// Emits only values strictly greater than every value emitted before.
pub struct AscendingTransformer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> AscendingTransformer<T> {
    /// Creates a strictly-ascending transformer.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for AscendingTransformer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Transformer for AscendingTransformer<T>
where
    T: PartialOrd + Clone + Send + 'static,
{
    type Input = T;
    type State = Option<T>;
    type Output = T;

    fn create_state(&self) -> Option<T> {
        None
    }

    fn fold(&self, state: &mut Option<T>, item: T) -> Result<TransformStep<T>> {
        match state {
            Some(high) if item <= *high => Ok(TransformStep::hold()),
            _ => {
                *state = Some(item.clone());
                Ok(TransformStep::emit(item))
            }
        }
    }

    fn finish(&self, _state: Option<T>) -> Result<Option<T>> {
        Ok(None)
    }
}
