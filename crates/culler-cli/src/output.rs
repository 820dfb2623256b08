//! Terminal output: progress messages and the final report.

use std::io::{self, Write};

use clap::ValueEnum;

use culler_core::domain::RetentionReport;
use culler_core::ports::ProgressSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Prints each progress message on its own stdout line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutProgress;

impl ProgressSink for StdoutProgress {
    fn message(&self, message: &str) {
        println!("{message}");
    }
}

pub fn print_report(report: &RetentionReport, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, report, format)
}

pub fn write_report(
    out: &mut impl Write,
    report: &RetentionReport,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)
        }
        OutputFormat::Text => {
            let verb = if report.dry_run { "Would delete" } else { "Deleted" };
            writeln!(
                out,
                "{verb} {} image(s) and {} snapshot(s); kept {} image(s).",
                report.deleted.len(),
                report.deleted_snapshots.len(),
                report.retained.len()
            )
        }
    }
}
