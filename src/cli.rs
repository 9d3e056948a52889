//! Command-line interface definitions for nscan.
//!
//! Uses `clap` derive macros for declarative argument parsing. Everything
//! here is validated before a scan is scheduled.

use crate::config::AppSettings;
use crate::scanner::ScanOptions;
use crate::types::{PortError, PortSpec};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// TCP port scanner with optional banner grabbing.
#[derive(Parser, Debug)]
#[command(name = "nscan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Simple network scanner with optional banner grab", long_about = None)]
pub struct Args {
    /// Target IP address or hostname
    #[arg(value_name = "HOST")]
    pub target: String,

    /// Ports to scan (e.g. "22", "22,80,443", "1-1000", "22,80,8000-8010")
    #[arg(short, long, conflicts_with = "all")]
    pub ports: Option<String>,

    /// Scan all ports (1-65535) instead of the well-known range
    #[arg(short, long)]
    pub all: bool,

    /// Grab banners to identify service versions
    #[arg(short, long)]
    pub service: bool,

    /// Connect timeout in milliseconds
    #[arg(short = 't', long, value_name = "MS", env = "NSCAN_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Banner read timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub read_timeout: Option<u64>,

    /// Maximum number of ports probed at once
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub concurrency: Option<u32>,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// List closed and filtered ports too
    #[arg(long)]
    pub show_closed: bool,

    /// Show a progress bar and log debug events to stderr (RUST_LOG overrides the log level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a settings file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Ports requested on the command line.
    pub fn port_spec(&self) -> Result<PortSpec, PortError> {
        match (&self.ports, self.all) {
            (Some(list), _) => list.parse(),
            (None, true) => Ok(PortSpec::full()),
            (None, false) => Ok(PortSpec::well_known()),
        }
    }

    /// Scan options: flags override `settings`.
    pub fn scan_options(&self, settings: &AppSettings) -> ScanOptions {
        let mut options = settings.scan_options();
        if let Some(ms) = self.timeout {
            options = options.with_connect_timeout(Duration::from_millis(ms.max(1)));
        }
        if let Some(ms) = self.read_timeout {
            options = options.with_read_timeout(Duration::from_millis(ms.max(1)));
        }
        if let Some(n) = self.concurrency {
            options = options.with_concurrency(n as usize);
        }
        if self.service {
            options = options.with_banners();
        }
        options
    }

    pub fn output_format(&self, settings: &AppSettings) -> OutputFormat {
        self.output.unwrap_or(settings.output)
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}
