//! De-duplicating aggregation of a time-ordered record stream
//!
//! Receivers often log one physical transmission several times in quick
//! succession. A record is kept only if it names a different device than the
//! last kept record, or arrives more than the window after it. The comparison
//! is against the single most recently accepted record of the whole stream,
//! so the filter assumes time-ordered input where bursts from different
//! devices do not interleave within the window.

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info, trace};

use crate::config::DateRange;
use crate::report::{DeviceReport, Report};
use crate::statistics::RecursiveStats;
use crate::traits::Accumulator;
use crate::tree::KeyedTree;

use super::Record;

/// What [`StreamAggregator::ingest`] did with a record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Folded into its device's statistics
    Accepted,
    /// Timestamp outside the configured date range
    OutOfRange,
    /// Repeat reception of the last accepted transmission
    Duplicate,
}

/// Per-device payload stored in the tree
#[derive(Clone, Debug, Default)]
pub struct DeviceEntry {
    /// SNR of each accepted transmission
    pub snr: RecursiveStats,
    /// Seconds between consecutive accepted transmissions
    pub gaps: RecursiveStats,
    /// In-range packets, duplicates included
    pub packets: u64,
    last_accepted: Option<NaiveDateTime>,
}

impl DeviceEntry {
    fn accept(&mut self, record: &Record) {
        self.packets += 1;
        if let Some(previous) = self.last_accepted {
            let delta = record.time - previous;
            let gap = match delta.num_microseconds() {
                Some(us) => us as f64 / 1e6,
                None => delta.num_milliseconds() as f64 / 1e3,
            };
            self.gaps.update(&gap);
        }
        self.last_accepted = Some(record.time);
        self.snr.update(&record.snr);
    }
}

/// De-duplication context shared by the whole stream
#[derive(Clone, Debug, Default)]
pub struct StreamState {
    /// Key of the most recently accepted record
    pub last_key: Option<String>,
    /// Timestamp of the most recently accepted record
    pub last_time: Option<NaiveDateTime>,
    /// Earliest accepted timestamp
    pub earliest: Option<NaiveDateTime>,
    /// Latest accepted timestamp
    pub latest: Option<NaiveDateTime>,
}

impl StreamState {
    fn is_duplicate(&self, key: &str, time: NaiveDateTime, window: Duration) -> bool {
        match (&self.last_key, self.last_time) {
            (Some(last_key), Some(last_time)) => {
                last_key == key
                    && last_time
                        .checked_add_signed(window)
                        .map_or(true, |limit| time <= limit)
            }
            _ => false,
        }
    }

    fn record_accept(&mut self, key: String, time: NaiveDateTime) {
        self.last_key = Some(key);
        self.last_time = Some(time);
        self.earliest = Some(self.earliest.map_or(time, |t| t.min(time)));
        self.latest = Some(self.latest.map_or(time, |t| t.max(time)));
    }
}

/// Folds records into per-device statistics
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use snrstats::config::DateRange;
/// use snrstats::stream::{Outcome, Record, StreamAggregator};
///
/// let t0 = NaiveDate::from_ymd_opt(2022, 5, 16).unwrap().and_hms_opt(10, 0, 0).unwrap();
/// let mut agg = StreamAggregator::new(DateRange::unbounded());
///
/// assert_eq!(agg.ingest(&Record::new(t0, "A", Some("1"), 10.0)), Outcome::Accepted);
/// assert_eq!(agg.ingest(&Record::new(t0, "A", Some("1"), 11.0)), Outcome::Duplicate);
///
/// let report = agg.finish();
/// assert_eq!(report.accepted, 1);
/// assert_eq!(report.devices[0].device, "A 1");
/// ```
#[derive(Clone, Debug)]
pub struct StreamAggregator {
    range: DateRange,
    window: Duration,
    tree: KeyedTree<DeviceEntry>,
    state: StreamState,
    accepted: u64,
    duplicates: u64,
    out_of_range: u64,
}

impl StreamAggregator {
    /// Create an aggregator with the default two-second window
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            window: Duration::seconds(2),
            tree: KeyedTree::new(),
            state: StreamState::default(),
            accepted: 0,
            duplicates: 0,
            out_of_range: 0,
        }
    }

    /// Set the de-duplication window
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Apply the date filter and de-duplication policy to one record
    pub fn ingest(&mut self, record: &Record) -> Outcome {
        if !self.range.contains(record.time) {
            self.out_of_range += 1;
            return Outcome::OutOfRange;
        }

        let key = record.key();

        if self.state.is_duplicate(&key, record.time, self.window) {
            debug!(device = %key, time = %record.time, "suppressing duplicate reception");
            // The last accepted record created this node
            if let Some(node) = self.tree.get_mut(&key) {
                node.value_mut().packets += 1;
            }
            self.duplicates += 1;
            return Outcome::Duplicate;
        }

        trace!(device = %key, time = %record.time, snr = record.snr, "accepting record");
        self.tree.find_or_insert(&key).value_mut().accept(record);
        self.state.record_accept(key, record.time);
        self.accepted += 1;
        Outcome::Accepted
    }

    /// Number of accepted records
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Number of suppressed duplicates
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    /// Number of records outside the date range
    pub fn out_of_range(&self) -> u64 {
        self.out_of_range
    }

    /// Earliest accepted timestamp
    pub fn earliest(&self) -> Option<NaiveDateTime> {
        self.state.earliest
    }

    /// Latest accepted timestamp
    pub fn latest(&self) -> Option<NaiveDateTime> {
        self.state.latest
    }

    /// De-duplication state
    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Per-device entries, in key order
    pub fn devices(&self) -> &KeyedTree<DeviceEntry> {
        &self.tree
    }

    /// Finalize every device's statistics into a report
    pub fn finish(self) -> Report {
        let devices: Vec<DeviceReport> = self
            .tree
            .into_iter()
            .map(|(device, entry)| DeviceReport {
                device,
                packets: entry.packets,
                snr: entry.snr.finalize(),
                gaps: entry.gaps.finalize(),
            })
            .collect();

        info!(
            accepted = self.accepted,
            duplicates = self.duplicates,
            out_of_range = self.out_of_range,
            devices = devices.len(),
            "aggregation finished"
        );

        Report {
            accepted: self.accepted,
            duplicates: self.duplicates,
            out_of_range: self.out_of_range,
            earliest: self.state.earliest,
            latest: self.state.latest,
            devices,
            ..Report::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(secs: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 5, 16)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::seconds(secs)
    }

    fn rec(secs: i64, model: &str, id: &str, snr: f64) -> Record {
        Record::new(t(secs), model, Some(id), snr)
    }

    #[test]
    fn test_dedup_window() {
        let mut agg = StreamAggregator::new(DateRange::unbounded());

        assert_eq!(agg.ingest(&rec(0, "A", "1", 10.0)), Outcome::Accepted);
        assert_eq!(agg.ingest(&rec(1, "A", "1", 12.0)), Outcome::Duplicate);
        assert_eq!(agg.ingest(&rec(5, "A", "1", 14.0)), Outcome::Accepted);

        assert_eq!(agg.accepted(), 2);
        assert_eq!(agg.duplicates(), 1);

        let entry = agg.devices().get("A 1").unwrap().value();
        assert_eq!(entry.snr.len(), 2);
        assert_eq!(entry.snr.min(), Some(10.0));
        assert_eq!(entry.snr.max(), Some(14.0));
        assert_eq!(entry.packets, 3);
    }

    #[test]
    fn test_window_boundary() {
        let mut agg = StreamAggregator::new(DateRange::unbounded());

        agg.ingest(&rec(0, "A", "1", 1.0));
        // Exactly two seconds later is still inside the window
        assert_eq!(agg.ingest(&rec(2, "A", "1", 1.0)), Outcome::Duplicate);

        let just_after = Record::new(t(2) + Duration::milliseconds(1), "A", Some("1"), 1.0);
        assert_eq!(agg.ingest(&just_after), Outcome::Accepted);
    }

    #[test]
    fn test_window_measured_from_last_accepted() {
        let mut agg = StreamAggregator::new(DateRange::unbounded());

        agg.ingest(&rec(0, "A", "1", 1.0));
        assert_eq!(agg.ingest(&rec(2, "A", "1", 1.0)), Outcome::Duplicate);
        // 2s after the duplicate but 3s after the last accepted record
        assert_eq!(agg.ingest(&rec(3, "A", "1", 1.0)), Outcome::Accepted);
    }

    #[test]
    fn test_different_device_always_accepted() {
        let mut agg = StreamAggregator::new(DateRange::unbounded());

        assert_eq!(agg.ingest(&rec(0, "A", "1", 1.0)), Outcome::Accepted);
        assert_eq!(agg.ingest(&rec(0, "A", "2", 1.0)), Outcome::Accepted);
        assert_eq!(agg.ingest(&rec(0, "B", "1", 1.0)), Outcome::Accepted);
        // Interleaved burst: the last accepted key is "B 1", so this passes
        assert_eq!(agg.ingest(&rec(1, "A", "1", 1.0)), Outcome::Accepted);

        assert_eq!(agg.devices().len(), 3);
        assert_eq!(agg.state().last_key.as_deref(), Some("A 1"));
    }

    #[test]
    fn test_out_of_range_leaves_state_untouched() {
        let range = DateRange::new(Some(t(10)), Some(t(20))).unwrap();
        let mut agg = StreamAggregator::new(range);

        assert_eq!(agg.ingest(&rec(5, "A", "1", 99.0)), Outcome::OutOfRange);
        assert_eq!(agg.ingest(&rec(25, "A", "1", 99.0)), Outcome::OutOfRange);
        assert!(agg.devices().is_empty());
        assert!(agg.state().last_key.is_none());
        assert_eq!(agg.earliest(), None);

        assert_eq!(agg.ingest(&rec(10, "A", "1", 1.0)), Outcome::Accepted);
        assert_eq!(agg.ingest(&rec(20, "A", "1", 2.0)), Outcome::Accepted);

        assert_eq!(agg.earliest(), Some(t(10)));
        assert_eq!(agg.latest(), Some(t(20)));
        assert_eq!(agg.out_of_range(), 2);
        assert_eq!(agg.devices().get("A 1").unwrap().value().packets, 2);
    }

    #[test]
    fn test_gap_times() {
        let mut agg = StreamAggregator::new(DateRange::unbounded());

        agg.ingest(&rec(0, "A", "1", 1.0));
        agg.ingest(&rec(30, "A", "1", 1.0));
        agg.ingest(&rec(31, "B", "1", 1.0));
        agg.ingest(&rec(90, "A", "1", 1.0));

        let report = agg.finish();
        let a = &report.devices[0];
        assert_eq!(a.device, "A 1");
        assert_eq!(a.gaps.count, 2);
        assert_eq!(a.gaps.mean, 45.0);
        assert_eq!(a.gaps.min, 30.0);
        assert_eq!(a.gaps.max, 60.0);

        let b = &report.devices[1];
        assert!(b.gaps.is_empty());
    }

    #[test]
    fn test_gap_times_keep_microseconds() {
        let mut agg = StreamAggregator::new(DateRange::unbounded());
        let first = Record::new(t(0), "A", Some("1"), 1.0);
        let second = Record::new(t(3) + Duration::microseconds(250), "A", Some("1"), 1.0);

        agg.ingest(&first);
        agg.ingest(&second);

        let gaps = &agg.finish().devices[0].gaps;
        assert_eq!(gaps.count, 1);
        assert_eq!(gaps.mean, 3.00025);
        assert_eq!(gaps.min, 3.00025);
    }

    #[test]
    fn test_zero_window_keeps_distinct_seconds() {
        let mut agg = StreamAggregator::new(DateRange::unbounded()).with_window(Duration::zero());

        assert_eq!(agg.ingest(&rec(0, "A", "1", 1.0)), Outcome::Accepted);
        assert_eq!(agg.ingest(&rec(0, "A", "1", 1.0)), Outcome::Duplicate);
        assert_eq!(agg.ingest(&rec(1, "A", "1", 1.0)), Outcome::Accepted);
    }

    #[test]
    fn test_finish_orders_devices() {
        let mut agg = StreamAggregator::new(DateRange::unbounded());
        for (i, model) in ["Oregon", "Acurite", "LaCrosse"].iter().enumerate() {
            agg.ingest(&rec(i as i64 * 10, model, "1", 5.0));
        }

        let report = agg.finish();
        let names: Vec<&str> = report.devices.iter().map(|d| d.device.as_str()).collect();
        assert_eq!(names, ["Acurite 1", "LaCrosse 1", "Oregon 1"]);
        assert_eq!(report.accepted, 3);
        assert_eq!(report.earliest, Some(t(0)));
        assert_eq!(report.latest, Some(t(20)));
    }
}
