//! Line-oriented driver feeding a log file through the aggregator

use std::fs::File;
use std::io::{BufRead, BufReader};

use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::error::{Result, SnrError};
use crate::report::Report;

use super::{parse_line, StreamAggregator};

/// Counters for the raw input lines
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineStats {
    /// Lines read, including blank and malformed ones
    pub lines: u64,
    /// Lines holding only whitespace or NUL padding
    pub blank: u64,
    /// Lines that failed to decode and were skipped
    pub malformed: u64,
}

/// Feed every line of `reader` through `aggregator`
///
/// Undecodable lines are logged and skipped. Bytes that are not UTF-8 are
/// replaced rather than treated as a read failure, and NUL padding left by
/// interrupted writers is stripped. Only an I/O error ends ingestion early.
pub fn ingest_reader<R: BufRead>(mut reader: R, aggregator: &mut StreamAggregator) -> Result<LineStats> {
    let mut stats = LineStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).map_err(|source| SnrError::Read {
            line: stats.lines + 1,
            source,
        })?;
        if read == 0 {
            break;
        }
        stats.lines += 1;

        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
        if line.is_empty() {
            stats.blank += 1;
            continue;
        }

        match parse_line(line) {
            Ok(record) => {
                aggregator.ingest(&record);
            }
            Err(error) => {
                warn!(line = stats.lines, %error, "skipping malformed record");
                stats.malformed += 1;
            }
        }
    }

    Ok(stats)
}

/// Produce the report for one configured input file
pub fn run(config: &ReportConfig) -> Result<Report> {
    let file = File::open(&config.input).map_err(|source| SnrError::Io {
        path: config.input.clone(),
        source,
    })?;
    info!(path = %config.input.display(), "processing log");

    let mut aggregator = config.aggregator();
    let stats = ingest_reader(BufReader::new(file), &mut aggregator)?;

    let mut report = aggregator.finish();
    report.lines = stats.lines;
    report.malformed = stats.malformed;
    Ok(report)
}
