//! Output formatting module.
//!
//! Renders a finished `ScanReport` as plain text, JSON, or CSV. The scan
//! engine never prints; everything user-facing goes through here.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use plain::write_plain;

use crate::cli::OutputFormat;
use crate::scanner::ScanReport;
use std::io::{self, Write};

/// What to include in a rendered report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Include closed and filtered ports, not just open ones.
    pub show_closed: bool,
    /// Banners were requested; adds the version column.
    pub banners: bool,
}

/// Format and write scan results according to the specified format.
pub fn write_report<W: Write>(
    report: &ScanReport,
    format: OutputFormat,
    options: RenderOptions,
    out: &mut W,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => write_plain(report, options, out),
        OutputFormat::Json => write_json(report, out),
        OutputFormat::Csv => write_csv(report, options, out),
    }
}

/// Write scan results to stdout.
pub fn print_report(report: &ScanReport, format: OutputFormat, options: RenderOptions) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(report, format, options, &mut out)?;
    out.flush()
}
