//! Scan target: a host plus the ports to probe on it.
//!
//! Hosts may be IP literals (IPv4 or IPv6) or names that resolve through
//! DNS. Resolution happens once per scan via [`ScanTarget::resolve`].

use super::Port;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// A host and the ordered set of candidate ports to scan on it.
///
/// Immutable once built; duplicate ports are dropped, keeping the first
/// occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTarget {
    host: String,
    ports: Vec<Port>,
}

impl ScanTarget {
    /// Build a target, validating the host string.
    pub fn new(host: impl Into<String>, ports: impl IntoIterator<Item = Port>) -> Result<Self, TargetError> {
        let host = host.into().trim().to_string();
        if host.is_empty() {
            return Err(TargetError::EmptyHost);
        }
        if host.parse::<IpAddr>().is_err() && !is_valid_hostname(&host) {
            return Err(TargetError::InvalidFormat(host));
        }

        let mut seen = HashSet::new();
        let ports = ports.into_iter().filter(|p| seen.insert(*p)).collect();

        Ok(Self { host, ports })
    }

    /// The host as the caller supplied it.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Resolve the host to a single address.
    ///
    /// IP literals short-circuit without touching DNS.
    pub async fn resolve(&self) -> Result<IpAddr, TargetError> {
        if let Ok(ip) = self.host.parse::<IpAddr>() {
            return Ok(ip);
        }

        let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

        let response = resolver
            .lookup_ip(self.host.as_str())
            .await
            .map_err(|e| TargetError::DnsResolutionFailed(self.host.clone(), e.to_string()))?;

        response
            .iter()
            .next()
            .ok_or_else(|| TargetError::NoAddressesFound(self.host.clone()))
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} ports)", self.host, self.ports.len())
    }
}

/// Error type for target parsing and resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("target host is empty")]
    EmptyHost,
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
    #[error("failed to resolve hostname '{0}': {1}")]
    DnsResolutionFailed(String, String),
    #[error("no IP addresses found for hostname '{0}'")]
    NoAddressesFound(String),
}

/// Check if a string is a valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    // Each label must be 1-63 characters
    for label in s.trim_end_matches('.').split('.') {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        // Must start and end with alphanumeric
        if !label.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        if !label.chars().last().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports(list: &[u16]) -> Vec<Port> {
        list.iter().copied().map(Port::new).collect()
    }

    #[test]
    fn test_accepts_ip_literals_and_names() {
        assert!(ScanTarget::new("192.168.1.1", ports(&[80])).is_ok());
        assert!(ScanTarget::new("::1", ports(&[80])).is_ok());
        assert!(ScanTarget::new("scanme.example.com", ports(&[80])).is_ok());
        assert!(ScanTarget::new("localhost", ports(&[80])).is_ok());
    }

    #[test]
    fn test_rejects_bad_hosts() {
        assert_eq!(ScanTarget::new("  ", ports(&[80])), Err(TargetError::EmptyHost));
        assert!(matches!(
            ScanTarget::new("-bad.com", ports(&[80])),
            Err(TargetError::InvalidFormat(_))
        ));
        assert!(matches!(
            ScanTarget::new("a b", ports(&[80])),
            Err(TargetError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_ports_deduplicated_in_order() {
        let target = ScanTarget::new("10.0.0.1", ports(&[443, 22, 443, 80, 22])).unwrap();
        assert_eq!(target.ports(), ports(&[443, 22, 80]).as_slice());
    }

    #[tokio::test]
    async fn test_resolve_ip_literal() {
        let target = ScanTarget::new("127.0.0.1", ports(&[22])).unwrap();
        assert_eq!(target.resolve().await.unwrap(), IpAddr::from([127, 0, 0, 1]));
    }
}
