//! Collector descriptor for terminal collection.

use sf_error::Result;

/// Declarative accumulate/finish descriptor consumed by the `collect`
/// terminal operation.
///
/// A collector owns no state of its own; the accumulator is created fresh
/// for each collection run and threaded back through `fold_one` until the
/// stream is exhausted, at which point `finish` converts it into the final
/// result exactly once.
pub trait Collector: Send {
    /// The value type folded into the accumulator.
    type Input: Send + 'static;
    /// The intermediate accumulation type.
    type Accumulator: Send;
    /// The final result type.
    type Output: Send;

    /// Creates a fresh, empty accumulator.
    fn empty_accumulator(&self) -> Self::Accumulator;

    /// Folds one value into the accumulator.
    fn fold_one(&self, accumulator: &mut Self::Accumulator, item: Self::Input) -> Result<()>;

    /// Converts the accumulator into the final result.
    fn finish(&self, accumulator: Self::Accumulator) -> Result<Self::Output>;
}
