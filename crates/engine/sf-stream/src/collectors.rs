//! Built-in collector descriptors.

use sf_error::Result;
use sf_traits::Collector;
use std::marker::PhantomData;

/// Collects all values into a `Vec`, in delivery order.
pub struct VecCollector<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> VecCollector<T> {
    /// Creates a vec collector.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for VecCollector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Collector for VecCollector<T> {
    type Input = T;
    type Accumulator = Vec<T>;
    type Output = Vec<T>;

    fn empty_accumulator(&self) -> Vec<T> {
        Vec::new()
    }

    fn fold_one(&self, accumulator: &mut Vec<T>, item: T) -> Result<()> {
        accumulator.push(item);
        Ok(())
    }

    fn finish(&self, accumulator: Vec<T>) -> Result<Vec<T>> {
        Ok(accumulator)
    }
}

/// Counts values without retaining them.
pub struct CountingCollector<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> CountingCollector<T> {
    /// Creates a counting collector.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for CountingCollector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Collector for CountingCollector<T> {
    type Input = T;
    type Accumulator = usize;
    type Output = usize;

    fn empty_accumulator(&self) -> usize {
        0
    }

    fn fold_one(&self, accumulator: &mut usize, _item: T) -> Result<()> {
        *accumulator += 1;
        Ok(())
    }

    fn finish(&self, accumulator: usize) -> Result<usize> {
        Ok(accumulator)
    }
}

/// Joins string values with a separator.
pub struct JoiningCollector {
    separator: String,
}

impl JoiningCollector {
    /// Creates a joining collector with the given separator.
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Collector for JoiningCollector {
    type Input = String;
    type Accumulator = Vec<String>;
    type Output = String;

    fn empty_accumulator(&self) -> Vec<String> {
        Vec::new()
    }

    fn fold_one(&self, accumulator: &mut Vec<String>, item: String) -> Result<()> {
        accumulator.push(item);
        Ok(())
    }

    fn finish(&self, accumulator: Vec<String>) -> Result<String> {
        Ok(accumulator.join(&self.separator))
    }
}
