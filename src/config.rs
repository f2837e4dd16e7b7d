//! Report settings: input path, date-range filter, de-duplication window

use std::path::PathBuf;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::error::ConfigError;
use crate::stream::{parse_time, StreamAggregator};

/// Default de-duplication window in seconds
pub const DEFAULT_WINDOW_SECS: f64 = 2.0;

/// Inclusive time filter; a missing bound is unbounded on that side
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// Earliest accepted timestamp
    pub start: Option<NaiveDateTime>,
    /// Latest accepted timestamp
    pub end: Option<NaiveDateTime>,
}

impl DateRange {
    /// A range that admits every timestamp
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Create a range, rejecting `start > end`
    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Result<Self, ConfigError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ConfigError::InvertedRange { start, end });
            }
        }
        Ok(Self { start, end })
    }

    /// Create a range from user-supplied date strings
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, ConfigError> {
        let bound = |text: Option<&str>| -> Result<Option<NaiveDateTime>, ConfigError> {
            text.map(|t| {
                parse_time(t).ok_or_else(|| ConfigError::InvalidTimestamp {
                    value: t.to_owned(),
                })
            })
            .transpose()
        };
        Self::new(bound(start)?, bound(end)?)
    }

    /// Check if a timestamp falls inside the range (bounds inclusive)
    pub fn contains(&self, time: NaiveDateTime) -> bool {
        self.start.map_or(true, |start| time >= start) && self.end.map_or(true, |end| time <= end)
    }
}

/// Everything needed to produce one report
#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// Log file to read
    pub input: PathBuf,
    /// Records outside this range are ignored
    pub range: DateRange,
    /// Repeat receptions of the same device within this window are dropped
    pub window: Duration,
}

impl ReportConfig {
    /// Create a config with no date filter and the default window
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            range: DateRange::unbounded(),
            window: Duration::milliseconds((DEFAULT_WINDOW_SECS * 1000.0) as i64),
        }
    }

    /// Set the date-range filter
    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    /// Set the de-duplication window in (possibly fractional) seconds
    pub fn with_window_secs(mut self, secs: f64) -> Result<Self, ConfigError> {
        // Upper bound keeps the millisecond count well inside i64
        if !secs.is_finite() || secs < 0.0 || secs > 1e12 {
            return Err(ConfigError::InvalidWindow(secs));
        }
        self.window = Duration::milliseconds((secs * 1000.0).round() as i64);
        Ok(self)
    }

    /// Build an empty aggregator for this configuration
    pub fn aggregator(&self) -> StreamAggregator {
        StreamAggregator::new(self.range).with_window(self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{Outcome, Record};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 5, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_unbounded_contains_everything() {
        let range = DateRange::unbounded();
        assert!(range.contains(day(1)));
        assert!(range.contains(NaiveDateTime::MIN));
        assert!(range.contains(NaiveDateTime::MAX));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let range = DateRange::new(Some(day(10)), Some(day(20))).unwrap();

        assert!(!range.contains(day(9)));
        assert!(range.contains(day(10)));
        assert!(range.contains(day(15)));
        assert!(range.contains(day(20)));
        assert!(!range.contains(day(21)));
    }

    #[test]
    fn test_half_open() {
        let from = DateRange::new(Some(day(10)), None).unwrap();
        assert!(!from.contains(day(9)));
        assert!(from.contains(NaiveDateTime::MAX));

        let until = DateRange::new(None, Some(day(10))).unwrap();
        assert!(until.contains(NaiveDateTime::MIN));
        assert!(!until.contains(day(11)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = DateRange::new(Some(day(20)), Some(day(10))).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvertedRange {
                start: day(20),
                end: day(10)
            }
        );
    }

    #[test]
    fn test_parse() {
        let range = DateRange::parse(Some("2022-05-10 00:00:00"), None).unwrap();
        assert_eq!(range.start, Some(day(10)));
        assert_eq!(range.end, None);

        let err = DateRange::parse(None, Some("tomorrow")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidTimestamp {
                value: "tomorrow".into()
            }
        );
    }

    #[test]
    fn test_window() {
        let config = ReportConfig::new("log.json");
        assert_eq!(config.window, Duration::seconds(2));

        let config = config.with_window_secs(0.5).unwrap();
        assert_eq!(config.window, Duration::milliseconds(500));

        assert!(ReportConfig::new("log.json").with_window_secs(-1.0).is_err());
        assert!(ReportConfig::new("log.json").with_window_secs(f64::NAN).is_err());
    }

    #[test]
    fn test_aggregator_uses_window() {
        let first = Record::new(day(1), "A", Some("1"), 1.0);
        let repeat = Record::new(day(1) + Duration::seconds(1), "A", Some("1"), 1.0);

        let mut agg = ReportConfig::new("log.json").aggregator();
        assert_eq!(agg.ingest(&first), Outcome::Accepted);
        assert_eq!(agg.ingest(&repeat), Outcome::Duplicate);

        let mut agg = ReportConfig::new("log.json")
            .with_window_secs(0.0)
            .unwrap()
            .aggregator();
        assert_eq!(agg.ingest(&first), Outcome::Accepted);
        assert_eq!(agg.ingest(&repeat), Outcome::Accepted);
        assert_eq!(agg.accepted(), 2);
    }

    #[test]
    fn test_aggregator_uses_range() {
        let range = DateRange::new(Some(day(2)), None).unwrap();
        let mut agg = ReportConfig::new("log.json").with_range(range).aggregator();

        assert_eq!(
            agg.ingest(&Record::new(day(1), "A", Some("1"), 1.0)),
            Outcome::OutOfRange
        );
        assert_eq!(
            agg.ingest(&Record::new(day(3), "A", Some("1"), 1.0)),
            Outcome::Accepted
        );
    }
}
