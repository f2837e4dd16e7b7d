//! # snrstats
//!
//! Per-device signal-to-noise statistics from rtl_433 JSON logs.
//!
//! Each line of an rtl_433 log describes one received packet. `snrstats`
//! filters those packets by date, drops repeat receptions of the same
//! transmission, and keeps running statistics per device in a single pass.
//!
//! ## Features
//!
//! - **Running statistics**: count, mean, standard deviation, min, max with a
//!   recursive single-pass update
//! - **Keyed storage**: an ordered tree creating one accumulator per device
//!   key on first sight and returning devices in key order
//! - **De-duplication**: repeat receptions within a short window of the last
//!   accepted record are suppressed
//! - **Gap times**: per-device statistics of the time between transmissions
//!
//! ## Quick Start
//!
//! ```rust
//! use snrstats::prelude::*;
//! use std::io::Cursor;
//!
//! let log = concat!(
//!     r#"{"time":"2022-05-16 10:00:00","model":"Ford","id":7,"snr":10.0}"#, "\n",
//!     r#"{"time":"2022-05-16 10:00:01","model":"Ford","id":7,"snr":12.0}"#, "\n",
//!     r#"{"time":"2022-05-16 10:00:05","model":"Ford","id":7,"snr":14.0}"#, "\n",
//! );
//!
//! let mut agg = StreamAggregator::new(DateRange::unbounded());
//! ingest_reader(Cursor::new(log), &mut agg).unwrap();
//!
//! let report = agg.finish();
//! assert_eq!(report.accepted, 2);
//! assert_eq!(report.devices[0].snr.count, 2);
//! println!("{}", report.to_table());
//! ```

pub mod config;
pub mod error;
pub mod report;
pub mod statistics;
pub mod stream;
pub mod traits;
pub mod tree;

pub mod prelude {
    pub use crate::traits::*;

    pub use crate::config::{DateRange, ReportConfig};
    pub use crate::error::{ConfigError, RecordError, SnrError};
    pub use crate::report::{DeviceReport, Report};
    pub use crate::statistics::{RecursiveStats, Summary};
    pub use crate::stream::{ingest_reader, parse_line, Outcome, Record, StreamAggregator};
    pub use crate::tree::KeyedTree;
}

pub use error::{Result, SnrError};
pub use report::Report;
pub use statistics::RecursiveStats;
pub use stream::StreamAggregator;
pub use tree::KeyedTree;
