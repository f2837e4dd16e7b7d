//! Running statistics (count, mean, standard deviation, min, max)
//!
//! Mean and variance are carried forward with a recursive single-pass update:
//! each new value rescales the previous estimate instead of accumulating sums.
//! The variance term is only converted to a standard deviation when the
//! accumulator is finalized.

use serde::Serialize;

use crate::traits::Accumulator;

/// Running statistics calculator using a recursive mean/variance update
///
/// After `n` values the internal variance term holds the sample variance
/// (Bessel-corrected) of those values. It is never exposed directly; call
/// [`finalize`](RecursiveStats::finalize) to obtain a [`Summary`] carrying the
/// standard deviation.
///
/// # Example
///
/// ```
/// use snrstats::statistics::RecursiveStats;
///
/// let mut stats = RecursiveStats::new();
///
/// for value in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
///     stats.add(value);
/// }
///
/// let summary = stats.finalize();
/// assert_eq!(summary.count, 8);
/// assert!((summary.mean - 5.0).abs() < 1e-12);
/// assert!((summary.stddev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
/// assert_eq!(summary.min, 2.0);
/// assert_eq!(summary.max, 9.0);
/// ```
#[derive(Clone, Debug)]
pub struct RecursiveStats {
    /// Number of values seen
    count: u64,
    /// Running mean
    mean: f64,
    /// Running sample variance; only meaningful through `finalize`
    var_acc: f64,
    /// Minimum value
    min: f64,
    /// Maximum value
    max: f64,
}

impl Default for RecursiveStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RecursiveStats {
    /// Create a new empty statistics accumulator
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            var_acc: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Add a value to the statistics
    ///
    /// With `n` the count after this value and `m` the updated mean:
    ///
    /// ```text
    /// m  = ((n - 1) * m_prev + x) / n
    /// v  = 0                                                   if n < 2
    /// v  = ((n - 2) * v_prev + n * (m - x)^2 / (n - 1)) / (n - 1) otherwise
    /// ```
    ///
    /// NaN and infinities are not filtered; they propagate through the mean
    /// and variance under IEEE-754 rules.
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        let n = self.count as f64;

        self.mean = ((n - 1.0) * self.mean + value) / n;
        self.var_acc = if self.count < 2 {
            0.0
        } else {
            ((n - 2.0) * self.var_acc
                + n * (self.mean - value) * (self.mean - value) / (n - 1.0))
                / (n - 1.0)
        };

        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Get the number of values
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get the running mean (0.0 when empty)
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Get the minimum value
    pub fn min(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.min)
        }
    }

    /// Get the maximum value
    pub fn max(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.max)
        }
    }

    /// Convert the running variance into a standard deviation
    ///
    /// Consumes the accumulator, so the square root is taken exactly once.
    /// An empty accumulator yields [`Summary::EMPTY`].
    pub fn finalize(self) -> Summary {
        if self.count == 0 {
            return Summary::EMPTY;
        }

        Summary {
            count: self.count,
            mean: self.mean,
            stddev: self.var_acc.sqrt(),
            min: self.min,
            max: self.max,
        }
    }
}

impl Accumulator for RecursiveStats {
    type Item = f64;
    type Output = Summary;

    fn update(&mut self, item: &Self::Item) {
        self.add(*item);
    }

    fn count(&self) -> u64 {
        self.count
    }

    fn finalize(self) -> Summary {
        RecursiveStats::finalize(self)
    }
}

/// Finalized, read-only view of a [`RecursiveStats`]
///
/// Non-finite extrema of an empty summary serialize as `null` in JSON.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Summary {
    /// Number of values
    pub count: u64,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation
    pub stddev: f64,
    /// Smallest value, `+inf` when empty
    pub min: f64,
    /// Largest value, `-inf` when empty
    pub max: f64,
}

impl Summary {
    /// The "no data" summary
    pub const EMPTY: Summary = Summary {
        count: 0,
        mean: 0.0,
        stddev: 0.0,
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    /// Check if the summary was produced from no values
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get the range (max - min)
    pub fn range(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.max - self.min)
        }
    }
}
