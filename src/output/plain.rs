//! Plain text output formatting.
//!
//! An nmap-style report: summary lines, then a `PORT STATE SERVICE`
//! table with a `VERSION` column when banners were grabbed.

use super::RenderOptions;
use crate::scanner::{PortResult, PortState, ScanReport};
use console::{style, Style};
use std::io::{self, Write};

/// Write the plain text report.
pub fn write_plain<W: Write>(report: &ScanReport, options: RenderOptions, out: &mut W) -> io::Result<()> {
    let seconds = report.duration_ms as f64 / 1000.0;

    writeln!(
        out,
        "{} scan report for {}",
        style("nscan").cyan().bold(),
        style(&report.target).bold()
    )?;
    writeln!(
        out,
        "Scanned {} ports in {:.2}s: {} open, {} closed, {} filtered",
        report.len(),
        seconds,
        style(report.open).green().bold(),
        style(report.closed).red(),
        style(report.filtered).yellow()
    )?;

    let rows: Vec<&PortResult> = if options.show_closed {
        report.ordered().collect()
    } else {
        if report.not_open() > 0 {
            writeln!(
                out,
                "Not shown: {} closed tcp ports (conn-refused), {} filtered tcp ports (no-response)",
                report.closed, report.filtered
            )?;
        }
        report.open_ports().collect()
    };
    writeln!(out)?;

    if rows.is_empty() {
        writeln!(out, "{}", style("No ports to display.").dim())?;
    } else {
        let header = format!("{:<12}{:<10}{:<16}", "PORT", "STATE", "SERVICE");
        if options.banners {
            writeln!(out, "{}", style(format!("{header}VERSION")).bold())?;
        } else {
            writeln!(out, "{}", style(header.trim_end()).bold())?;
        }

        for result in rows {
            write_row(out, result, options.banners)?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Scan done: 1 IP address scanned in {:.2} seconds",
        seconds
    )?;

    Ok(())
}

fn write_row<W: Write>(out: &mut W, result: &PortResult, banners: bool) -> io::Result<()> {
    let state_style = match result.state() {
        PortState::Open => Style::new().green().bold(),
        PortState::Closed => Style::new().red(),
        PortState::Filtered => Style::new().yellow(),
    };

    let port = format!("{}/tcp", result.port());
    let state = state_style.apply_to(format!("{:<10}", result.state()));
    let service = result.service().unwrap_or("");

    if banners {
        let version = result.banner().map(|b| b.text()).unwrap_or("");
        writeln!(out, "{port:<12}{state}{service:<16}{}", style(version).dim())
    } else {
        writeln!(out, "{port:<12}{state}{service}")
    }
}
