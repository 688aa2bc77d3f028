//! Well-known TCP service names.
//!
//! A static table of IANA service names for common ports. It answers "what
//! usually listens here", nothing more; no traffic is exchanged to check.

use crate::types::Port;

/// Name reported for ports with no known service.
pub const UNKNOWN_SERVICE: &str = "unknown";

/// Sorted by port so lookups can binary search.
const WELL_KNOWN: &[(u16, &str)] = &[
    (7, "echo"),
    (9, "discard"),
    (13, "daytime"),
    (20, "ftp-data"),
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (37, "time"),
    (43, "whois"),
    (53, "domain"),
    (67, "bootps"),
    (69, "tftp"),
    (70, "gopher"),
    (79, "finger"),
    (80, "http"),
    (88, "kerberos"),
    (110, "pop3"),
    (111, "sunrpc"),
    (113, "auth"),
    (119, "nntp"),
    (123, "ntp"),
    (135, "epmap"),
    (137, "netbios-ns"),
    (139, "netbios-ssn"),
    (143, "imap"),
    (161, "snmp"),
    (179, "bgp"),
    (194, "irc"),
    (389, "ldap"),
    (443, "https"),
    (445, "microsoft-ds"),
    (465, "submissions"),
    (513, "login"),
    (514, "shell"),
    (515, "printer"),
    (543, "klogin"),
    (544, "kshell"),
    (548, "afpovertcp"),
    (554, "rtsp"),
    (587, "submission"),
    (631, "ipp"),
    (636, "ldaps"),
    (873, "rsync"),
    (989, "ftps-data"),
    (990, "ftps"),
    (993, "imaps"),
    (995, "pop3s"),
    (1080, "socks"),
    (1194, "openvpn"),
    (1433, "ms-sql-s"),
    (1434, "ms-sql-m"),
    (1521, "ncube-lm"),
    (1723, "pptp"),
    (1883, "mqtt"),
    (2049, "nfs"),
    (2181, "eforward"),
    (2375, "docker"),
    (2376, "docker-s"),
    (3128, "ndl-aas"),
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
    (5900, "rfb"),
    (5984, "couchdb"),
    (6379, "redis"),
    (6443, "sun-sr-https"),
    (6667, "ircu"),
    (8000, "irdmi"),
    (8008, "http-alt"),
    (8080, "http-alt"),
    (8443, "pcsync-https"),
    (8883, "secure-mqtt"),
    (9000, "cslistener"),
    (9042, "cassandra"),
    (9092, "XmlIpcRegSvc"),
    (9200, "wap-wsp"),
    (9418, "git"),
    (11211, "memcache"),
    (27017, "mongodb"),
];

/// Look up the well-known service name for a port.
pub fn service_name(port: u16) -> Option<&'static str> {
    WELL_KNOWN
        .binary_search_by_key(&port, |&(p, _)| p)
        .ok()
        .map(|i| WELL_KNOWN[i].1)
}

/// Source of service names for the report.
pub trait ServiceLookup {
    /// Name of the service usually found on `port`, if any.
    fn lookup(&self, port: Port) -> Option<&str>;

    /// Like [`lookup`](Self::lookup), falling back to `"unknown"`.
    fn describe(&self, port: Port) -> &str {
        self.lookup(port).unwrap_or(UNKNOWN_SERVICE)
    }
}

/// The built-in table above.
#[derive(Debug, Clone, Copy, Default)]
pub struct WellKnownServices;

impl ServiceLookup for WellKnownServices {
    fn lookup(&self, port: Port) -> Option<&str> {
        service_name(port.as_u16())
    }
}

impl<F> ServiceLookup for F
where
    F: Fn(Port) -> Option<&'static str>,
{
    fn lookup(&self, port: Port) -> Option<&str> {
        self(port)
    }
}
