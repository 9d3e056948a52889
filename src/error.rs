//! Error types for nscan.
//!
//! Uses `thiserror` for ergonomic error definitions.
//!
//! `ScanError` is never surfaced to callers of the scan engine: every
//! variant is downgraded to a coarse port state or an absent banner inside
//! the component that hit it. The input-side errors (`PortError`,
//! `TargetError`, `ConfigError`) are the only fatal ones, and they are
//! raised before any work is scheduled.

use crate::scanner::PortState;
use crate::types::{PortError, TargetError};
use std::path::PathBuf;
use thiserror::Error;

/// Per-port failure taxonomy.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Connection refused")]
    ConnectionRefused,

    #[error("Connection timed out")]
    ConnectionTimeout,

    #[error("Host unreachable: {0}")]
    HostUnreachable(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("DNS resolution failed: {0}")]
    DnsResolution(String),

    #[error("Failed to send banner probe: {0}")]
    BannerSendFailure(String),

    #[error("Failed to read banner: {0}")]
    BannerReadFailure(String),

    #[error("Failed to decode banner: {0}")]
    BannerDecodeFailure(String),

    #[error("No service mapping for port {0}")]
    UnknownServiceMapping(u16),
}

impl ScanError {
    /// Coarse port state a connect-path error downgrades to.
    ///
    /// Only an active refusal means `Closed`; silence, unreachability and
    /// anything else the transport reports means `Filtered`.
    pub fn port_state(&self) -> PortState {
        match self {
            Self::ConnectionRefused => PortState::Closed,
            _ => PortState::Filtered,
        }
    }
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors loading or locating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error("invalid setting: {0}")]
    InvalidValue(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that abort a command-line invocation.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
