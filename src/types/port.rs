//! Port types with validation and parsing.
//!
//! `Port` covers the whole TCP port space (0-65535). `PortRange` and
//! `PortSpec` handle the textual port lists callers hand in, rejecting
//! anything outside that space before a scan is scheduled.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A TCP port number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Lowest port number.
    pub const MIN: u16 = 0;
    /// Highest port number.
    pub const MAX: u16 = 65535;
    /// Upper bound (inclusive) of the well-known range.
    pub const WELL_KNOWN_MAX: u16 = 1023;

    #[inline]
    pub const fn new(port: u16) -> Self {
        Self(port)
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Check if this is a well-known port (0-1023).
    #[inline]
    pub const fn is_well_known(self) -> bool {
        self.0 <= Self::WELL_KNOWN_MAX
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for Port {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl TryFrom<u32> for Port {
    type Error = PortError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        u16::try_from(value)
            .map(Self)
            .map_err(|_| PortError::OutOfRange(value))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

impl FromStr for Port {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value: u32 = s
            .parse()
            .map_err(|_| PortError::InvalidFormat(s.to_string()))?;
        Self::try_from(value)
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (0-65535)")]
    OutOfRange(u32),
    #[error("invalid port number: {0}")]
    InvalidFormat(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port specification")]
    Empty,
}

/// A range of ports (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    pub fn new(start: Port, end: Port) -> Result<Self, PortError> {
        if start > end {
            Err(PortError::InvalidRange(start.0, end.0))
        } else {
            Ok(Self { start, end })
        }
    }

    /// Create a range containing a single port.
    pub const fn single(port: Port) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    /// Number of ports in this range.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// A valid range always holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A complete port specification that can contain multiple ranges.
///
/// Supports formats like:
/// - Single port: "80"
/// - Comma-separated: "80,443,8080"
/// - Range: "1-1000"
/// - Mixed: "22,80,443,8000-9000"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortSpec {
    ranges: Vec<PortRange>,
}

impl PortSpec {
    pub const fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    pub fn add_range(&mut self, range: PortRange) {
        self.ranges.push(range);
    }

    pub fn add_port(&mut self, port: Port) {
        self.ranges.push(PortRange::single(port));
    }

    /// Get all ports as a sorted, deduplicated vector.
    pub fn to_ports(&self) -> Vec<Port> {
        let mut ports: Vec<Port> = self.ranges.iter().flat_map(|r| r.iter()).collect();
        ports.sort_unstable();
        ports.dedup();
        ports
    }

    /// Get the total number of unique ports.
    pub fn count(&self) -> usize {
        self.to_ports().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The well-known ports, 1-1023.
    ///
    /// Port 0 is reserved and never accepts connections, so sweeps leave it
    /// out. Ask for it explicitly ("0") to probe it anyway.
    pub fn well_known() -> Self {
        Self {
            ranges: vec![PortRange {
                start: Port(1),
                end: Port(Port::WELL_KNOWN_MAX),
            }],
        }
    }

    /// Every port, 1-65535. Port 0 is excluded for the same reason as in
    /// [`PortSpec::well_known`].
    pub fn full() -> Self {
        Self {
            ranges: vec![PortRange {
                start: Port(1),
                end: Port(Port::MAX),
            }],
        }
    }
}

impl FromStr for PortSpec {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        let mut spec = Self::new();

        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.split_once('-') {
                Some((start, end)) => {
                    if end.contains('-') {
                        return Err(PortError::InvalidFormat(part.to_string()));
                    }
                    let range = PortRange::new(start.parse()?, end.parse()?)?;
                    spec.add_range(range);
                }
                None => spec.add_port(part.parse()?),
            }
        }

        if spec.is_empty() {
            return Err(PortError::Empty);
        }

        Ok(spec)
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ranges.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}
