//! Core type definitions using newtype patterns for type safety.
//!
//! Port lists and targets are validated here, before a scan is scheduled.

mod port;
mod target;

pub use port::{Port, PortError, PortRange, PortSpec};
pub use target::{ScanTarget, TargetError};
