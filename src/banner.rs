//! Banner grabbing on open TCP connections.
//!
//! Given a live connection, optionally writes a protocol probe, performs a
//! single bounded read and condenses the response into a short descriptor.
//! Every failure along the way (send, read, timeout, unusable data) yields
//! no banner; nothing here ever fails the scan.

use crate::error::{ScanError, ScanResult};
use serde::Serialize;
use std::fmt;
use std::net::Ipv6Addr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::debug;

/// Maximum bytes read for a banner.
const MAX_READ_SIZE: usize = 2048;

/// Maximum descriptor length, in characters, ellipsis included.
pub const MAX_BANNER_LEN: usize = 200;

const ELLIPSIS: &str = "...";

/// Ports that get an HTTP request before reading.
pub const HTTP_PORTS: [u16; 5] = [80, 8080, 8000, 8008, 8888];

/// A service's self-identification, condensed to one short line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    text: String,
    from_header: bool,
}

impl Banner {
    /// Build a banner, truncating the descriptor to [`MAX_BANNER_LEN`].
    pub fn new(text: &str, from_header: bool) -> Self {
        Self {
            text: truncate(text),
            from_header,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the descriptor came from a protocol header (HTTP `Server:`)
    /// rather than the first line of the response.
    pub fn from_header(&self) -> bool {
        self.from_header
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Grab a banner from an open connection.
///
/// The stream is consumed and closed when this returns, whatever the
/// outcome. Probe, send and read together are bounded by `read_timeout`.
pub async fn grab_banner<S>(host: &str, port: u16, mut stream: S, read_timeout: Duration) -> Option<Banner>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match timeout(read_timeout, solicit(host, port, &mut stream)).await {
        Ok(Ok(banner)) => {
            debug!(port, banner = %banner, from_header = banner.from_header, "banner acquired");
            Some(banner)
        }
        Ok(Err(e)) => {
            debug!(port, error = %e, "banner absent");
            None
        }
        Err(_) => {
            debug!(port, timeout_ms = read_timeout.as_millis() as u64, "banner read timed out");
            None
        }
    }
}

async fn solicit<S>(host: &str, port: u16, stream: &mut S) -> ScanResult<Banner>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if is_http_port(port) {
        // Some servers answer without a request; keep going and read anyway.
        if let Err(e) = send_http_probe(host, stream).await {
            debug!(port, error = %e, "ignoring probe send failure");
        }
    }

    let mut buffer = vec![0u8; MAX_READ_SIZE];
    let n = stream
        .read(&mut buffer)
        .await
        .map_err(|e| ScanError::BannerReadFailure(e.to_string()))?;
    if n == 0 {
        return Err(ScanError::BannerReadFailure(
            "connection closed before any data".to_string(),
        ));
    }

    parse_banner(&buffer[..n])
}

async fn send_http_probe<S>(host: &str, stream: &mut S) -> ScanResult<()>
where
    S: AsyncWrite + Unpin,
{
    let request = http_request(host);
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|e| ScanError::BannerSendFailure(e.to_string()))?;
    stream
        .flush()
        .await
        .map_err(|e| ScanError::BannerSendFailure(e.to_string()))
}

fn http_request(host: &str) -> String {
    if host.parse::<Ipv6Addr>().is_ok() {
        format!("GET / HTTP/1.0\r\nHost: [{host}]\r\n\r\n")
    } else {
        format!("GET / HTTP/1.0\r\nHost: {host}\r\n\r\n")
    }
}

/// Check if a port gets the HTTP probe.
pub fn is_http_port(port: u16) -> bool {
    HTTP_PORTS.contains(&port)
}

/// Condense raw response bytes into a banner.
///
/// Invalid UTF-8 is replaced rather than rejected. The first `Server:`
/// header anywhere in the response wins over the first line, even when its
/// value is empty.
pub fn parse_banner(data: &[u8]) -> ScanResult<Banner> {
    let text = String::from_utf8_lossy(data);
    let lines: Vec<&str> = text
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if let Some(server) = lines.iter().find_map(|line| server_header(line)) {
        return Ok(Banner::new(server, true));
    }

    lines
        .first()
        .map(|line| Banner::new(line, false))
        .ok_or_else(|| ScanError::BannerDecodeFailure("no non-empty lines in response".to_string()))
}

/// Trimmed value of a `Server:` header line, if `line` is one.
fn server_header(line: &str) -> Option<&str> {
    const PREFIX: &str = "server:";
    let head = line.get(..PREFIX.len())?;
    if !head.eq_ignore_ascii_case(PREFIX) {
        return None;
    }
    Some(line[PREFIX.len()..].trim())
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_BANNER_LEN {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_BANNER_LEN - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[test]
    fn test_first_line_descriptor() {
        let banner = parse_banner(b"SSH-2.0-OpenSSH_8.9\r\n").unwrap();
        assert_eq!(banner.text(), "SSH-2.0-OpenSSH_8.9");
        assert!(!banner.from_header());
    }

    #[test]
    fn test_server_header_wins_regardless_of_position() {
        let data = b"HTTP/1.1 200 OK\r\nDate: Mon, 01 Jan 2024\r\nContent-Type: text/html\r\nserver:   nginx/1.18.0  \r\n\r\n<html>";
        let banner = parse_banner(data).unwrap();
        assert_eq!(banner.text(), "nginx/1.18.0");
        assert!(banner.from_header());
    }

    #[test]
    fn test_server_value_keeps_later_colons() {
        let banner = parse_banner(b"SERVER: Apache: custom\r\n").unwrap();
        assert_eq!(banner.text(), "Apache: custom");
    }

    #[test]
    fn test_empty_server_value_still_wins() {
        let banner = parse_banner(b"HTTP/1.0 404 Not Found\r\nServer:\r\n").unwrap();
        assert_eq!(banner.text(), "");
        assert!(banner.from_header());
    }

    #[test]
    fn test_first_server_line_wins() {
        let banner = parse_banner(b"HTTP/1.1 200 OK\r\nServer:   \r\nServer: nginx\r\n").unwrap();
        assert_eq!(banner.text(), "");
        assert!(banner.from_header());
    }

    #[test]
    fn test_leading_blank_lines_skipped() {
        let banner = parse_banner(b"\r\n\r\n   \n220 mail.example.com ESMTP\r\n").unwrap();
        assert_eq!(banner.text(), "220 mail.example.com ESMTP");
    }

    #[test]
    fn test_whitespace_only_is_decode_failure() {
        assert!(matches!(
            parse_banner(b" \r\n\t\n"),
            Err(ScanError::BannerDecodeFailure(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let banner = parse_banner(b"\xff\xfeHello\r\n").unwrap();
        assert_eq!(banner.text(), "\u{FFFD}\u{FFFD}Hello");
    }

    #[test]
    fn test_truncation() {
        let long = "A".repeat(500);
        let banner = parse_banner(long.as_bytes()).unwrap();
        assert_eq!(banner.text().chars().count(), MAX_BANNER_LEN);
        assert!(banner.text().ends_with("..."));
        assert!(banner.text().starts_with(&"A".repeat(197)));

        let exact = "B".repeat(MAX_BANNER_LEN);
        assert_eq!(parse_banner(exact.as_bytes()).unwrap().text(), exact);
    }

    #[test]
    fn test_truncation_counts_characters() {
        let long = "é".repeat(250);
        let banner = Banner::new(&long, false);
        assert_eq!(banner.text().chars().count(), MAX_BANNER_LEN);
        assert!(banner.text().ends_with("..."));
    }

    #[test]
    fn test_server_header_truncated() {
        let line = format!("Server: {}\r\n", "x".repeat(300));
        let banner = parse_banner(line.as_bytes()).unwrap();
        assert!(banner.from_header());
        assert_eq!(banner.text().chars().count(), MAX_BANNER_LEN);
    }

    #[test]
    fn test_is_http_port() {
        assert!(is_http_port(80));
        assert!(is_http_port(8080));
        assert!(is_http_port(8888));
        assert!(!is_http_port(443));
        assert!(!is_http_port(22));
    }

    #[test]
    fn test_http_request_host_header() {
        assert_eq!(
            http_request("10.0.0.1"),
            "GET / HTTP/1.0\r\nHost: 10.0.0.1\r\n\r\n"
        );
        assert_eq!(http_request("::1"), "GET / HTTP/1.0\r\nHost: [::1]\r\n\r\n");
    }

    #[tokio::test]
    async fn test_grab_sends_http_probe() {
        let (client, mut server) = duplex(4096);
        let peer = tokio::spawn(async move {
            let mut request = vec![0u8; 256];
            let n = server.read(&mut request).await.unwrap();
            server
                .write_all(b"HTTP/1.1 200 OK\r\nServer: nginx/1.18.0\r\n\r\n<html>")
                .await
                .unwrap();
            String::from_utf8_lossy(&request[..n]).into_owned()
        });

        let banner = grab_banner("example.com", 80, client, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(banner, Banner::new("nginx/1.18.0", true));

        let request = peer.await.unwrap();
        assert!(request.starts_with("GET / HTTP/1.0\r\n"));
        assert!(request.contains("Host: example.com\r\n"));
    }

    #[tokio::test]
    async fn test_grab_reads_without_probe_on_other_ports() {
        let (client, mut server) = duplex(4096);
        server.write_all(b"220 ProFTPD Server ready.\r\n").await.unwrap();

        let banner = grab_banner("10.0.0.1", 21, client, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(banner.text(), "220 ProFTPD Server ready.");
        assert!(!banner.from_header());
    }

    #[tokio::test]
    async fn test_grab_absent_when_peer_closes_silently() {
        let (client, server) = duplex(4096);
        drop(server);
        assert!(grab_banner("10.0.0.1", 22, client, Duration::from_secs(1)).await.is_none());
    }

    #[tokio::test]
    async fn test_grab_absent_when_probe_send_fails_and_nothing_read() {
        let (client, server) = duplex(4096);
        drop(server);
        assert!(grab_banner("10.0.0.1", 80, client, Duration::from_secs(1)).await.is_none());
    }

    #[tokio::test]
    async fn test_grab_times_out() {
        let (client, _server) = duplex(4096);
        let start = std::time::Instant::now();
        let banner = grab_banner("10.0.0.1", 22, client, Duration::from_millis(100)).await;
        assert!(banner.is_none());
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
