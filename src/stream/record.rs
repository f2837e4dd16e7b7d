//! Decoding rtl_433 JSON log lines into records
//!
//! Only four fields matter: `time`, `model`, `id`, and `snr`. Everything else
//! on the line is ignored.

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;

use crate::error::RecordError;

/// Text layouts accepted for wall-clock timestamps, tried in order
const TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// The same layouts with a trailing UTC offset, colon optional (`+0200`, `+02:00`)
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// One received packet, reduced to what the aggregator needs
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Reception time
    pub time: NaiveDateTime,
    /// Device model name
    pub model: String,
    /// Device id, if the decoder reported one
    pub id: Option<String>,
    /// Signal-to-noise ratio in dB
    pub snr: f64,
}

impl Record {
    /// Create a record
    pub fn new(time: NaiveDateTime, model: impl Into<String>, id: Option<&str>, snr: f64) -> Self {
        Self {
            time,
            model: model.into(),
            id: id.map(str::to_owned),
            snr,
        }
    }

    /// Composite grouping key: model and id separated by one space, or the
    /// bare model when there is no id
    pub fn key(&self) -> String {
        match &self.id {
            Some(id) => format!("{} {}", self.model, id),
            None => self.model.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimeField {
    Text(String),
    Epoch(f64),
}

#[derive(Deserialize)]
struct RawRecord {
    time: Option<TimeField>,
    model: Option<String>,
    #[serde(default)]
    id: Value,
    snr: Option<f64>,
}

/// Decode one JSON log line
///
/// # Example
///
/// ```
/// use snrstats::stream::parse_line;
///
/// let line = r#"{"time":"2022-05-16 10:00:00","model":"Acurite-Tower","id":1234,"snr":14.2}"#;
/// let record = parse_line(line).unwrap();
/// assert_eq!(record.key(), "Acurite-Tower 1234");
/// assert_eq!(record.snr, 14.2);
/// ```
pub fn parse_line(line: &str) -> Result<Record, RecordError> {
    let raw: RawRecord = serde_json::from_str(line)?;

    let time = match raw.time.ok_or(RecordError::MissingField("time"))? {
        TimeField::Text(text) => match parse_time(&text) {
            Some(time) => time,
            None => return Err(RecordError::InvalidTimestamp { value: text }),
        },
        TimeField::Epoch(secs) => from_epoch(secs).ok_or_else(|| RecordError::InvalidTimestamp {
            value: secs.to_string(),
        })?,
    };
    let model = raw.model.ok_or(RecordError::MissingField("model"))?;
    let snr = raw.snr.ok_or(RecordError::MissingField("snr"))?;

    let id = match raw.id {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    };

    Ok(Record {
        time,
        model,
        id,
        snr,
    })
}

/// Interpret a timestamp string
///
/// Accepts `YYYY-MM-DD HH:MM:SS` with optional fractional seconds, the same
/// with a `T` separator, either of those followed by a UTC offset such as
/// `+0200` or `+02:00`, RFC 3339 (offsets keep their local wall-clock time),
/// or Unix epoch seconds (read as UTC).
pub fn parse_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    for format in TIME_FORMATS {
        if let Ok(time) = NaiveDateTime::parse_from_str(text, format) {
            return Some(time);
        }
    }

    for format in OFFSET_FORMATS {
        if let Ok(time) = DateTime::parse_from_str(text, format) {
            return Some(time.naive_local());
        }
    }

    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.naive_local());
    }

    if text.contains('-') && !text.starts_with('-') {
        return None;
    }

    text.parse::<f64>().ok().and_then(from_epoch)
}

fn from_epoch(secs: f64) -> Option<NaiveDateTime> {
    if !secs.is_finite() {
        return None;
    }

    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos).map(|t| t.naive_utc())
}
