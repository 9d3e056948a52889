use nscan::banner::grab_banner;
use nscan::scanner::{scan, scan_with_progress, tcp, PortState, ScanOptions};
use nscan::types::{Port, ScanTarget};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn options() -> ScanOptions {
    ScanOptions::default()
        .with_connect_timeout(Duration::from_millis(500))
        .with_read_timeout(Duration::from_millis(500))
}

async fn listener() -> (TcpListener, Port) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = Port::new(listener.local_addr().expect("addr").port());
    (listener, port)
}

/// A loopback port with nothing listening on it.
async fn closed_port() -> Port {
    let (listener, port) = listener().await;
    drop(listener);
    port
}

#[tokio::test]
async fn open_port_without_banner_request() {
    let (_listener, port) = listener().await;
    let target = ScanTarget::new("127.0.0.1", [port]).unwrap();

    let report = scan(&target, &options()).await;
    let result = report.get(port).unwrap();

    assert_eq!(result.state(), PortState::Open);
    assert_eq!(result.service(), Some(nscan::services::resolve(port.as_u16())));
    assert!(result.banner().is_none());
    assert_eq!(report.open, 1);
}

#[tokio::test]
async fn refused_port_is_closed_and_not_listed_open() {
    let port = closed_port().await;
    let target = ScanTarget::new("127.0.0.1", [port]).unwrap();

    let report = scan(&target, &options()).await;
    let result = report.get(port).unwrap();

    assert_eq!(result.state(), PortState::Closed);
    assert!(result.service().is_none());
    assert!(result.banner().is_none());
    assert_eq!(report.not_open(), 1);
    assert_eq!(report.open_ports().count(), 0);
}

#[tokio::test]
async fn closed_port_is_stable_across_scans() {
    let port = closed_port().await;
    let target = ScanTarget::new("127.0.0.1", [port]).unwrap();

    let first = scan(&target, &options()).await;
    let second = scan(&target, &options()).await;

    assert_eq!(first.get(port).map(|r| r.state()), Some(PortState::Closed));
    assert_eq!(second.get(port).map(|r| r.state()), Some(PortState::Closed));
}

#[tokio::test]
async fn http_server_header_becomes_banner() {
    let (listener, port) = listener().await;
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 512];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nServer: nginx/1.18.0\r\n\r\n<html>...")
            .await
            .unwrap();
    });

    // Grab as if the connection were on port 80 so the HTTP probe is sent.
    let addr = SocketAddr::from(([127, 0, 0, 1], port.as_u16()));
    let stream = tcp::connect(addr, Duration::from_millis(500)).await.unwrap();
    let banner = grab_banner("127.0.0.1", 80, stream, Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(banner.text(), "nginx/1.18.0");
    assert!(banner.from_header());
}

#[tokio::test]
async fn silent_close_gives_open_without_banner() {
    let (listener, port) = listener().await;
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        drop(socket);
    });
    let target = ScanTarget::new("127.0.0.1", [port]).unwrap();

    let report = scan(&target, &options().with_banners()).await;
    let result = report.get(port).unwrap();

    assert_eq!(result.state(), PortState::Open);
    assert!(result.banner().is_none());
}

#[tokio::test]
async fn banner_grabbed_during_scan() {
    let (listener, port) = listener().await;
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket.write_all(b"\r\n220 mail.example.com ESMTP Postfix\r\n").await.unwrap();
    });
    let target = ScanTarget::new("127.0.0.1", [port]).unwrap();

    let report = scan(&target, &options().with_banners()).await;
    let banner = report.get(port).and_then(|r| r.banner()).unwrap();

    assert_eq!(banner.text(), "220 mail.example.com ESMTP Postfix");
    assert!(!banner.from_header());
}

#[tokio::test]
async fn silent_service_bounded_by_timeouts() {
    let (listener, port) = listener().await;
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });
    let target = ScanTarget::new("127.0.0.1", [port]).unwrap();
    let options = ScanOptions::default()
        .with_connect_timeout(Duration::from_millis(200))
        .with_read_timeout(Duration::from_millis(300))
        .with_banners();

    let start = Instant::now();
    let report = scan(&target, &options).await;

    assert!(start.elapsed() < Duration::from_millis(200 + 300 + 1000));
    let result = report.get(port).unwrap();
    assert_eq!(result.state(), PortState::Open);
    assert!(result.banner().is_none());
}

#[tokio::test]
async fn mixed_ports_fully_reported_in_order() {
    let (_a, open_a) = listener().await;
    let (_b, open_b) = listener().await;
    let closed = closed_port().await;

    let requested = [open_b, closed, open_a];
    let target = ScanTarget::new("127.0.0.1", requested).unwrap();

    let mut seen = 0;
    let report = scan_with_progress(&target, &options().with_concurrency(2), |_| seen += 1).await;

    assert_eq!(seen, 3);
    assert_eq!(report.len(), 3);
    assert_eq!(report.open, 2);
    assert_eq!(report.closed, 1);

    let mut expected: Vec<Port> = requested.to_vec();
    expected.sort();
    let order: Vec<Port> = report.ordered().map(|r| r.port()).collect();
    assert_eq!(order, expected);

    for result in report.ordered().filter(|r| !r.is_open()) {
        assert!(result.service().is_none());
        assert!(result.banner().is_none());
    }
}

#[tokio::test]
async fn unresolvable_host_reports_filtered() {
    let target = ScanTarget::new("nonexistent.invalid", [Port::new(22), Port::new(80)]).unwrap();

    let report = scan(&target, &options()).await;

    assert_eq!(report.len(), 2);
    assert_eq!(report.filtered, 2);
    assert!(report.ordered().all(|r| r.state() == PortState::Filtered));
    // Resolution time is not part of the scan duration.
    assert!(report.duration_ms < 50, "duration was {}ms", report.duration_ms);
}

#[tokio::test]
async fn unanswered_port_is_filtered_within_connect_timeout() {
    let target = ScanTarget::new("192.0.2.1", [Port::new(81)]).unwrap();
    let options = options().with_connect_timeout(Duration::from_millis(100));

    let start = Instant::now();
    let report = scan(&target, &options).await;

    assert!(start.elapsed() < Duration::from_millis(100 + 1000));
    assert_eq!(report.filtered, 1);
    assert_eq!(report.get(Port::new(81)).map(|r| r.state()), Some(PortState::Filtered));
}
