//! TCP connect probing.
//!
//! Performs standard TCP connect scans using the operating system's
//! socket API. No special privileges are needed, but the full handshake
//! is completed and visible to the target.

use crate::banner::grab_banner;
use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::{PortResult, Scanner};
use crate::scanner::ScanOptions;
use crate::services;
use crate::types::Port;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Attempt one TCP connection under a timeout.
///
/// On success the stream is handed to the caller, who owns it from then
/// on; dropping it closes the socket.
pub async fn connect(addr: SocketAddr, connect_timeout: Duration) -> ScanResult<TcpStream> {
    match timeout(connect_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(classify_connect_error(&e)),
        Err(_) => Err(ScanError::ConnectionTimeout),
    }
}

fn classify_connect_error(e: &io::Error) -> ScanError {
    match e.kind() {
        io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset => {
            ScanError::ConnectionRefused
        }
        io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
            ScanError::HostUnreachable(e.to_string())
        }
        io::ErrorKind::TimedOut => ScanError::ConnectionTimeout,
        _ => ScanError::ConnectionFailed(e.to_string()),
    }
}

/// TCP connect scan unit: connect, resolve the service, optionally grab a
/// banner.
pub struct TcpConnectScanner {
    host: String,
    ip: IpAddr,
    connect_timeout: Duration,
    read_timeout: Duration,
    grab_banners: bool,
}

impl TcpConnectScanner {
    /// Create a scanner for `host`, already resolved to `ip`.
    ///
    /// `host` is kept as given and used in protocol probes (the HTTP
    /// `Host:` header).
    pub fn new(host: impl Into<String>, ip: IpAddr, options: &ScanOptions) -> Self {
        Self {
            host: host.into(),
            ip,
            connect_timeout: options.connect_timeout,
            read_timeout: options.read_timeout,
            grab_banners: options.grab_banners,
        }
    }

    pub fn target(&self) -> IpAddr {
        self.ip
    }
}

#[async_trait]
impl Scanner for TcpConnectScanner {
    async fn scan_port(&self, port: Port) -> PortResult {
        let port_num = port.as_u16();
        let addr = SocketAddr::new(self.ip, port_num);
        debug!(%addr, "connecting");
        let start = Instant::now();

        match connect(addr, self.connect_timeout).await {
            Ok(stream) => {
                let response_time = start.elapsed().as_millis() as u64;
                let service = services::resolve(port_num);
                debug!(port = port_num, service, response_time, "open");

                let banner = if self.grab_banners {
                    grab_banner(&self.host, port_num, stream, self.read_timeout).await
                } else {
                    drop(stream);
                    None
                };

                PortResult::open(port, service)
                    .with_banner(banner)
                    .with_response_time(response_time)
            }
            Err(e) => {
                let state = e.port_state();
                debug!(port = port_num, %state, error = %e, "not open");
                PortResult::not_open(port, state)
            }
        }
    }
}
