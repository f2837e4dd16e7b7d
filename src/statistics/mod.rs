//! Statistical summaries for streaming data
//!
//! This module provides a single-pass accumulator for count, mean, standard
//! deviation, and extrema.
//!
//! # Example
//!
//! ```
//! use snrstats::statistics::RecursiveStats;
//!
//! let mut stats = RecursiveStats::new();
//!
//! for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
//!     stats.add(value);
//! }
//!
//! let summary = stats.finalize();
//! println!("Mean: {}", summary.mean);
//! println!("Stddev: {}", summary.stddev);
//! println!("Min: {}", summary.min);
//! println!("Max: {}", summary.max);
//! ```

mod recursive;

pub use recursive::{RecursiveStats, Summary};
