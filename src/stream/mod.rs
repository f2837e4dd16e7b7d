//! Record ingestion: decoding, filtering, de-duplication, aggregation
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use snrstats::config::DateRange;
//! use snrstats::stream::{ingest_reader, StreamAggregator};
//!
//! let log = concat!(
//!     r#"{"time":"2022-05-16 10:00:00","model":"Acurite-Tower","id":1234,"snr":12.0}"#, "\n",
//!     r#"{"time":"2022-05-16 10:00:00","model":"Acurite-Tower","id":1234,"snr":12.1}"#, "\n",
//!     r#"{"time":"2022-05-16 10:01:00","model":"Acurite-Tower","id":1234,"snr":14.0}"#, "\n",
//! );
//!
//! let mut agg = StreamAggregator::new(DateRange::unbounded());
//! ingest_reader(Cursor::new(log), &mut agg).unwrap();
//!
//! let report = agg.finish();
//! assert_eq!(report.accepted, 2);
//! assert_eq!(report.devices[0].snr.mean, 13.0);
//! ```

mod aggregator;
mod record;
mod source;

pub use aggregator::{DeviceEntry, Outcome, StreamAggregator, StreamState};
pub use record::{parse_line, parse_time, Record};
pub use source::{ingest_reader, run, LineStats};
