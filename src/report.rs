//! Finished per-device summaries and their text/JSON renderings

use std::fmt;
use std::io::{self, Write};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::statistics::Summary;

const TIME_FORMAT: &str = "%a %Y-%m-%d %H:%M:%S";

/// Summary for one device key
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceReport {
    /// Composite device key
    pub device: String,
    /// In-range packets, duplicates included
    pub packets: u64,
    /// SNR over accepted transmissions
    pub snr: Summary,
    /// Inter-transmission gap time in seconds
    pub gaps: Summary,
}

/// Outcome of a whole run
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Report {
    /// Input lines read
    pub lines: u64,
    /// Lines skipped as undecodable
    pub malformed: u64,
    /// De-duplicated transmissions folded into the statistics
    pub accepted: u64,
    /// Repeat receptions suppressed
    pub duplicates: u64,
    /// Records outside the date range
    pub out_of_range: u64,
    /// Earliest accepted timestamp
    pub earliest: Option<NaiveDateTime>,
    /// Latest accepted timestamp
    pub latest: Option<NaiveDateTime>,
    /// One entry per device, in key order
    pub devices: Vec<DeviceReport>,
}

impl Report {
    /// Write the human-readable table
    pub fn write_table<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self)
    }

    /// Render the table into a string
    pub fn to_table(&self) -> String {
        self.to_string()
    }

    /// Render as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Processed {} packets as {} de-duplicated transmissions",
            self.accepted + self.duplicates,
            self.accepted
        )?;
        if self.malformed > 0 || self.out_of_range > 0 {
            writeln!(
                f,
                "Skipped {} malformed lines and {} records outside the date range",
                self.malformed, self.out_of_range
            )?;
        }

        let (earliest, latest) = match (self.earliest, self.latest) {
            (Some(earliest), Some(latest)) => (earliest, latest),
            _ => return writeln!(f, "No records accepted"),
        };
        writeln!(
            f,
            "Dated from {} to {}",
            earliest.format(TIME_FORMAT),
            latest.format(TIME_FORMAT)
        )?;
        writeln!(f)?;

        writeln!(
            f,
            "{:<27} {:>6} {:>7}  {:>13} {:>6} {:>6}   {:>6} {:>16} {:>8} {:>8}",
            "Device", "#Pkts", "#Xmits", "Mean SNR ± σ", "Min", "Max", "#Gaps", "Mean gap ± σ", "Min", "Max"
        )?;
        for device in &self.devices {
            write_row(f, device)?;
        }
        Ok(())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, device: &DeviceReport) -> fmt::Result {
    let snr = &device.snr;
    write!(
        f,
        "{:<27} {:>6} {:>7}  {:>6.1} ± {:>4.1} {:>6.1} {:>6.1}",
        device.device, device.packets, snr.count, snr.mean, snr.stddev, snr.min, snr.max
    )?;

    let gaps = &device.gaps;
    if gaps.is_empty() {
        return writeln!(f);
    }
    writeln!(
        f,
        "   {:>6} {:>7.1}s ± {:>5.1} {:>8.1} {:>8.1}",
        gaps.count, gaps.mean, gaps.stddev, gaps.min, gaps.max
    )
}
