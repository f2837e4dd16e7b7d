//! Error types for log ingestion and report configuration
//!
//! Record-level errors are recoverable: the offending line is skipped and the
//! run continues. Everything wrapped by [`SnrError`] ends the run.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Result alias for run-level operations
pub type Result<T> = std::result::Result<T, SnrError>;

/// Run-fatal errors
#[derive(Error, Debug)]
pub enum SnrError {
    /// Input could not be opened
    #[error("cannot open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading failed partway through the input
    #[error("error reading at line {line}; not at end of input: {source}")]
    Read {
        line: u64,
        #[source]
        source: std::io::Error,
    },

    /// Configuration was rejected before the run started
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors decoding a single log line into a record
#[derive(Error, Debug)]
pub enum RecordError {
    /// The line is not a JSON object of the expected shape
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field is absent or null
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// The `time` field could not be interpreted
    #[error("invalid timestamp `{value}`")]
    InvalidTimestamp { value: String },
}

/// Errors in user-supplied report settings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A date-range bound could not be parsed
    #[error("invalid date `{value}`, expected YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp { value: String },

    /// Start bound lies after end bound
    #[error("start {start} is after end {end}")]
    InvertedRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// De-duplication window is negative or not finite
    #[error("invalid de-duplication window {0}s, must be a finite number >= 0")]
    InvalidWindow(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = RecordError::MissingField("snr");
        assert_eq!(err.to_string(), "missing field `snr`");

        let err = ConfigError::InvalidWindow(-1.0);
        assert!(err.to_string().contains("-1"));

        let err: SnrError = ConfigError::InvalidTimestamp {
            value: "yesterday".into(),
        }
        .into();
        assert!(err.to_string().starts_with("configuration error"));
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn test_io_display_includes_path() {
        let err = SnrError::Io {
            path: PathBuf::from("/nonexistent/log.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("/nonexistent/log.json"));
    }
}
