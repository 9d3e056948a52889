//! # nscan - A Concurrent TCP Connect Scanner
//!
//! nscan checks which TCP ports on a host accept connections, maps each
//! port to its conventional service name, and can fingerprint open ports
//! by reading (or soliciting) a short protocol banner.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use nscan::scanner::{scan, ScanOptions};
//! use nscan::types::{Port, ScanTarget};
//!
//! #[tokio::main]
//! async fn main() {
//!     let target = ScanTarget::new("127.0.0.1", [22, 80].map(Port::new)).unwrap();
//!     let report = scan(&target, &ScanOptions::default().with_banners()).await;
//!
//!     for result in report.open_ports() {
//!         println!("{} {}", result.port(), result.service().unwrap_or("?"));
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Validated ports, port lists and targets
//! - [`services`] - Static port to service-name table
//! - [`scanner`] - Connect probing, the worker pool and result aggregation
//! - [`banner`] - Banner acquisition on open connections
//! - [`config`] - Settings file and defaults
//! - [`cli`] / [`output`] - Argument parsing and report rendering for the binary
//! - [`error`] - Error types

pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use banner::Banner;
pub use error::{CliError, ScanError};
pub use scanner::{scan, PortResult, PortState, ScanOptions, ScanReport, Scanner};
pub use types::{Port, PortSpec, ScanTarget};
