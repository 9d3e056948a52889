//! Result aggregation.
//!
//! Collects per-port results in whatever order they complete and produces
//! a port-ordered `ScanReport` with summary counters.

use crate::scanner::traits::{PortResult, PortState};
use crate::types::Port;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::warn;

/// Completed scan of one target.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Host as supplied by the caller.
    pub target: String,
    /// When the first unit was dispatched.
    pub started_at: DateTime<Utc>,
    /// Wall-clock time from first dispatch to last completion.
    pub duration_ms: u64,
    pub open: usize,
    pub closed: usize,
    pub filtered: usize,
    /// One entry per requested port, keyed and ordered by port.
    pub results: BTreeMap<Port, PortResult>,
}

impl ScanReport {
    /// All results in ascending port order.
    pub fn ordered(&self) -> impl Iterator<Item = &PortResult> {
        self.results.values()
    }

    /// Open results in ascending port order.
    pub fn open_ports(&self) -> impl Iterator<Item = &PortResult> {
        self.ordered().filter(|r| r.is_open())
    }

    /// Number of closed plus filtered ports.
    pub fn not_open(&self) -> usize {
        self.closed + self.filtered
    }

    pub fn get(&self, port: Port) -> Option<&PortResult> {
        self.results.get(&port)
    }

    /// Number of ports scanned.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Accumulates results for a single scan.
#[derive(Debug)]
pub struct ResultAggregator {
    target: String,
    started_at: DateTime<Utc>,
    start: Instant,
    results: BTreeMap<Port, PortResult>,
}

impl ResultAggregator {
    /// Start aggregating; the clock starts now.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            started_at: Utc::now(),
            start: Instant::now(),
            results: BTreeMap::new(),
        }
    }

    /// Record one completed result. The first result for a port wins.
    pub fn record(&mut self, result: PortResult) {
        let port = result.port();
        if self.results.contains_key(&port) {
            warn!(port = port.as_u16(), "duplicate result ignored");
            return;
        }
        self.results.insert(port, result);
    }

    /// Number of results recorded so far.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Close the scan and build the report.
    ///
    /// Any requested port with no recorded result (its unit was lost) is
    /// filled in as `Filtered`, so the report always covers every port.
    pub fn finish(mut self, requested: &[Port]) -> ScanReport {
        for &port in requested {
            self.results.entry(port).or_insert_with(|| {
                warn!(port = port.as_u16(), "no result recorded, reporting filtered");
                PortResult::filtered(port)
            });
        }

        let (mut open, mut closed, mut filtered) = (0, 0, 0);
        for result in self.results.values() {
            match result.state() {
                PortState::Open => open += 1,
                PortState::Closed => closed += 1,
                PortState::Filtered => filtered += 1,
            }
        }

        ScanReport {
            target: self.target,
            started_at: self.started_at,
            duration_ms: self.start.elapsed().as_millis() as u64,
            open,
            closed,
            filtered,
            results: self.results,
        }
    }
}
