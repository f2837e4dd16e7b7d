//! snr: analyze rtl_433 JSON logs for signal-to-noise performance

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use snrstats::config::{DateRange, ReportConfig, DEFAULT_WINDOW_SECS};
use snrstats::stream;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "snr",
    version,
    about = "Analyze rtl_433 packet logs for SNR performance",
    long_about = "Summarize rtl_433 JSON logs per device.\n\n\
                  Repeat receptions of one transmission are de-duplicated, then\n\
                  each device gets packet and transmission counts, mean SNR ± σ,\n\
                  min, max, and the same statistics for the gap between\n\
                  transmissions."
)]
struct Cli {
    /// Source data file to process
    #[arg(short, long, env = "SNR_FILE", value_name = "PATH")]
    file: PathBuf,

    /// Date-time of first record to process
    #[arg(short, long, env = "SNR_START", value_name = "YYYY-MM-DD HH:MM:SS")]
    start: Option<String>,

    /// Date-time of last record to process
    #[arg(short, long, env = "SNR_END", value_name = "YYYY-MM-DD HH:MM:SS")]
    end: Option<String>,

    /// Seconds within which repeat receptions count as one transmission
    #[arg(short, long, env = "SNR_WINDOW", value_name = "SECONDS", default_value_t = DEFAULT_WINDOW_SECS)]
    window: f64,

    /// Report format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let range = DateRange::parse(cli.start.as_deref(), cli.end.as_deref())?;
    let config = ReportConfig::new(cli.file.clone())
        .with_range(range)
        .with_window_secs(cli.window)?;

    let report = stream::run(&config)
        .with_context(|| format!("failed to process {}", cli.file.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Table => report.write_table(&mut out)?,
        OutputFormat::Json => writeln!(out, "{}", report.to_json()?)?,
    }
    out.flush()?;

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("snrstats=debug,snr=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "snr",
            "-f",
            "log.json",
            "-s",
            "2022-05-16 00:00:00",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.file, PathBuf::from("log.json"));
        assert_eq!(cli.start.as_deref(), Some("2022-05-16 00:00:00"));
        assert_eq!(cli.end, None);
        assert_eq!(cli.window, 2.0);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_file_is_required() {
        assert!(Cli::try_parse_from(["snr"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
