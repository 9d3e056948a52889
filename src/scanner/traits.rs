//! Scanner trait abstraction and per-port result types.
//!
//! The scheduler only needs something that turns one port into one
//! `PortResult`; the `Scanner` trait is that seam.

use crate::banner::Banner;
use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Liveness of a scanned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    /// Connection established.
    Open,
    /// Connection actively refused or reset.
    Closed,
    /// No answer before the timeout, or the host was unreachable.
    Filtered,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Filtered => write!(f, "filtered"),
        }
    }
}

/// Result of scanning a single port.
///
/// Built once by a scan unit and never modified afterwards. Only open
/// results carry a service name, banner or response time; the
/// constructors make any other combination unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortResult {
    port: Port,
    state: PortState,
    #[serde(skip_serializing_if = "Option::is_none")]
    service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    banner: Option<Banner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_time_ms: Option<u64>,
}

impl PortResult {
    /// An open port with its resolved service name.
    pub fn open(port: Port, service: impl Into<String>) -> Self {
        Self {
            port,
            state: PortState::Open,
            service: Some(service.into()),
            banner: None,
            response_time_ms: None,
        }
    }

    pub fn closed(port: Port) -> Self {
        Self::not_open(port, PortState::Closed)
    }

    pub fn filtered(port: Port) -> Self {
        Self::not_open(port, PortState::Filtered)
    }

    /// A non-open result in the given state. `Open` is coerced to `Filtered`.
    pub fn not_open(port: Port, state: PortState) -> Self {
        let state = match state {
            PortState::Open => PortState::Filtered,
            other => other,
        };
        Self {
            port,
            state,
            service: None,
            banner: None,
            response_time_ms: None,
        }
    }

    /// Attach a banner. Ignored unless the port is open.
    pub fn with_banner(mut self, banner: Option<Banner>) -> Self {
        if self.is_open() {
            self.banner = banner;
        }
        self
    }

    /// Attach the connect latency. Ignored unless the port is open.
    pub fn with_response_time(mut self, time_ms: u64) -> Self {
        if self.is_open() {
            self.response_time_ms = Some(time_ms);
        }
        self
    }

    pub fn port(&self) -> Port {
        self.port
    }

    pub fn state(&self) -> PortState {
        self.state
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn response_time_ms(&self) -> Option<u64> {
        self.response_time_ms
    }

    pub fn is_open(&self) -> bool {
        self.state == PortState::Open
    }
}

/// Trait for per-port scan units.
///
/// Implementations must never fail: every error is folded into the
/// returned `PortResult`.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Scan a single port.
    async fn scan_port(&self, port: Port) -> PortResult;
}
