//! Scanner module - schedules per-port scan units.
//!
//! A scan runs one unit of work per requested port, each on its own tokio
//! task, with a semaphore bounding how many are in flight. Results are
//! aggregated as they complete and the finished report is ordered by port.
//! The tasks live only as long as one `scan` call.

pub mod aggregator;
pub mod tcp;
pub mod traits;

use crate::error::ScanError;
use crate::types::{Port, ScanTarget};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

pub use aggregator::{ResultAggregator, ScanReport};
pub use tcp::TcpConnectScanner;
pub use traits::{PortResult, PortState, Scanner};

/// Default number of in-flight scan units.
pub const DEFAULT_CONCURRENCY: usize = 100;
/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
/// Default banner read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(1000);

/// Tunables for a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Bound on each connect attempt.
    pub connect_timeout: Duration,
    /// Bound on the banner probe and read.
    pub read_timeout: Duration,
    /// Maximum scan units in flight.
    pub concurrency: usize,
    /// Whether to grab banners from open ports.
    pub grab_banners: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            grab_banners: false,
        }
    }
}

impl ScanOptions {
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the pool size. Zero is raised to one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Enable banner grabbing.
    pub fn with_banners(mut self) -> Self {
        self.grab_banners = true;
        self
    }
}

/// Scan every port of `target` over TCP.
pub async fn scan(target: &ScanTarget, options: &ScanOptions) -> ScanReport {
    scan_with_progress(target, options, |_| {}).await
}

/// Like [`scan`], calling `on_result` as each port completes.
///
/// Callbacks arrive in completion order, not port order.
pub async fn scan_with_progress<F>(target: &ScanTarget, options: &ScanOptions, mut on_result: F) -> ScanReport
where
    F: FnMut(&PortResult),
{
    info!(
        host = target.host(),
        ports = target.ports().len(),
        concurrency = options.concurrency,
        banners = options.grab_banners,
        "scan started"
    );

    let resolved = target.resolve().await;
    // The clock starts at first dispatch, after resolution.
    let mut aggregator = ResultAggregator::new(target.host());
    match resolved {
        Ok(ip) => {
            let scanner = Arc::new(TcpConnectScanner::new(target.host(), ip, options));
            run_pool(
                scanner,
                target.ports(),
                options.concurrency,
                &mut aggregator,
                &mut on_result,
            )
            .await;
        }
        Err(e) => {
            let error = ScanError::DnsResolution(e.to_string());
            warn!(host = target.host(), error = %error, "every port reported filtered");
            for &port in target.ports() {
                let result = PortResult::not_open(port, error.port_state());
                on_result(&result);
                aggregator.record(result);
            }
        }
    }

    let report = aggregator.finish(target.ports());
    info!(
        host = %report.target,
        open = report.open,
        closed = report.closed,
        filtered = report.filtered,
        duration_ms = report.duration_ms,
        "scan finished"
    );
    report
}

/// Run `scanner` over `ports` with at most `concurrency` units in flight.
///
/// This is the scheduling core behind [`scan`], usable with any
/// [`Scanner`].
pub async fn scan_ports<S, F>(
    scanner: Arc<S>,
    host: &str,
    ports: &[Port],
    concurrency: usize,
    mut on_result: F,
) -> ScanReport
where
    S: Scanner + 'static,
    F: FnMut(&PortResult),
{
    let mut aggregator = ResultAggregator::new(host);
    run_pool(scanner, ports, concurrency, &mut aggregator, &mut on_result).await;
    aggregator.finish(ports)
}

async fn run_pool<S, F>(
    scanner: Arc<S>,
    ports: &[Port],
    concurrency: usize,
    aggregator: &mut ResultAggregator,
    on_result: &mut F,
) where
    S: Scanner + 'static,
    F: FnMut(&PortResult),
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut units = JoinSet::new();

    for &port in ports {
        let semaphore = Arc::clone(&semaphore);
        let scanner = Arc::clone(&scanner);
        units.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return PortResult::filtered(port);
            };
            run_unit(scanner, port).await
        });
    }

    while let Some(joined) = units.join_next().await {
        match joined {
            Ok(result) => {
                on_result(&result);
                aggregator.record(result);
            }
            Err(e) => warn!(error = %e, "scan unit lost"),
        }
    }
}

/// Run one unit on its own task so a panic costs only its own port.
async fn run_unit<S>(scanner: Arc<S>, port: Port) -> PortResult
where
    S: Scanner + 'static,
{
    match tokio::spawn(async move { scanner.scan_port(port).await }).await {
        Ok(result) => result,
        Err(e) => {
            warn!(port = port.as_u16(), error = %e, "scan unit failed");
            PortResult::filtered(port)
        }
    }
}
