//! Service names for well-known TCP ports.
//!
//! A process-wide, read-only table sorted by port. Lookups are a binary
//! search over static data, so they never allocate, never block, and need
//! no synchronization.

use crate::error::{ScanError, ScanResult};

/// Service name reported when a port has no conventional assignment.
pub const UNKNOWN_SERVICE: &str = "unknown";

/// Conventional TCP port assignments, sorted by port.
static PORT_SERVICES: &[(u16, &str)] = &[
    (1, "tcpmux"),
    (7, "echo"),
    (9, "discard"),
    (11, "systat"),
    (13, "daytime"),
    (15, "netstat"),
    (17, "qotd"),
    (19, "chargen"),
    (20, "ftp-data"),
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (37, "time"),
    (43, "whois"),
    (49, "tacacs"),
    (53, "domain"),
    (70, "gopher"),
    (79, "finger"),
    (80, "http"),
    (88, "kerberos"),
    (102, "iso-tsap"),
    (104, "acr-nema"),
    (110, "pop3"),
    (111, "sunrpc"),
    (113, "auth"),
    (119, "nntp"),
    (123, "ntp"),
    (135, "epmap"),
    (137, "netbios-ns"),
    (138, "netbios-dgm"),
    (139, "netbios-ssn"),
    (143, "imap2"),
    (161, "snmp"),
    (162, "snmp-trap"),
    (163, "cmip-man"),
    (164, "cmip-agent"),
    (174, "mailq"),
    (179, "bgp"),
    (199, "smux"),
    (209, "qmtp"),
    (210, "z3950"),
    (213, "ipx"),
    (319, "ptp-event"),
    (320, "ptp-general"),
    (345, "pawserv"),
    (346, "zserv"),
    (369, "rpc2portmap"),
    (370, "codaauth2"),
    (371, "clearcase"),
    (389, "ldap"),
    (427, "svrloc"),
    (443, "https"),
    (444, "snpp"),
    (445, "microsoft-ds"),
    (464, "kpasswd"),
    (465, "submissions"),
    (487, "saft"),
    (500, "isakmp"),
    (512, "exec"),
    (513, "login"),
    (514, "shell"),
    (515, "printer"),
    (526, "tempo"),
    (530, "courier"),
    (531, "conference"),
    (532, "netnews"),
    (540, "uucp"),
    (543, "klogin"),
    (544, "kshell"),
    (548, "afpovertcp"),
    (554, "rtsp"),
    (587, "submission"),
    (607, "nqs"),
    (631, "ipp"),
    (636, "ldaps"),
    (646, "ldp"),
    (655, "tinc"),
    (706, "silc"),
    (749, "kerberos-adm"),
    (853, "domain-s"),
    (873, "rsync"),
    (989, "ftps-data"),
    (990, "ftps"),
    (992, "telnets"),
    (993, "imaps"),
    (995, "pop3s"),
    (1080, "socks"),
    (1194, "openvpn"),
    (1433, "ms-sql-s"),
    (1434, "ms-sql-m"),
    (1521, "oracle"),
    (1524, "ingreslock"),
    (1701, "l2f"),
    (1723, "pptp"),
    (1812, "radius"),
    (1813, "radius-acct"),
    (1883, "mqtt"),
    (2049, "nfs"),
    (2181, "zookeeper"),
    (2375, "docker"),
    (2376, "docker-s"),
    (3128, "squid-http"),
    (3260, "iscsi-target"),
    (3306, "mysql"),
    (3389, "ms-wbt-server"),
    (3690, "svn"),
    (4369, "epmd"),
    (5060, "sip"),
    (5061, "sip-tls"),
    (5222, "xmpp-client"),
    (5269, "xmpp-server"),
    (5432, "postgresql"),
    (5672, "amqp"),
    (5900, "vnc"),
    (5984, "couchdb"),
    (6379, "redis"),
    (6443, "kubernetes-api"),
    (6667, "ircd"),
    (8000, "http-alt"),
    (8008, "http"),
    (8080, "http-alt"),
    (8443, "https-alt"),
    (8888, "http-alt"),
    (9000, "cslistener"),
    (9042, "cassandra"),
    (9090, "prometheus"),
    (9092, "kafka"),
    (9200, "elasticsearch"),
    (9418, "git"),
    (10000, "webmin"),
    (11211, "memcache"),
    (27017, "mongodb"),
];

/// Look up the conventional service name for a port.
///
/// Fails with [`ScanError::UnknownServiceMapping`] when the table has no
/// entry; callers that only need a display name should use [`resolve`].
pub fn lookup(port: u16) -> ScanResult<&'static str> {
    PORT_SERVICES
        .binary_search_by_key(&port, |&(p, _)| p)
        .map(|idx| PORT_SERVICES[idx].1)
        .map_err(|_| ScanError::UnknownServiceMapping(port))
}

/// Resolve a port to its service name, or `"unknown"`.
pub fn resolve(port: u16) -> &'static str {
    lookup(port).unwrap_or(UNKNOWN_SERVICE)
}
