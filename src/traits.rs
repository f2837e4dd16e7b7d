//! Core traits for per-key accumulators
//!
//! Every payload stored behind a device key implements [`Accumulator`]: it is
//! created empty, folds observations in one at a time, and is consumed exactly
//! once to produce its final summary.

use core::fmt::Debug;

/// Single-pass accumulator over a stream of observations
pub trait Accumulator: Clone + Debug + Default {
    /// The type of observation this accumulator folds in
    type Item: ?Sized;

    /// The finished, read-only result
    type Output;

    /// Fold one observation into the running state
    fn update(&mut self, item: &Self::Item);

    /// Number of observations folded in so far
    fn count(&self) -> u64;

    /// Check if nothing has been observed
    fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Consume the accumulator and produce its summary
    ///
    /// Taking `self` by value means a summary can only ever be produced once
    /// per accumulator.
    fn finalize(self) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default)]
    struct Tally(u64);

    impl Accumulator for Tally {
        type Item = ();
        type Output = u64;

        fn update(&mut self, _item: &()) {
            self.0 += 1;
        }

        fn count(&self) -> u64 {
            self.0
        }

        fn finalize(self) -> u64 {
            self.0
        }
    }

    #[test]
    fn test_default_is_empty() {
        let mut tally = Tally::default();
        assert!(tally.is_empty());

        tally.update(&());
        tally.update(&());

        assert!(!tally.is_empty());
        assert_eq!(tally.finalize(), 2);
    }
}
