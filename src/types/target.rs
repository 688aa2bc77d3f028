//! Validated scan target.
//!
//! Only IPv4 and IPv6 literals are accepted; hostnames are never resolved.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// A host address that has passed address-family validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanTarget(IpAddr);

impl ScanTarget {
    /// Validate a target string as an IPv4 or IPv6 literal.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let trimmed = s.trim();
        trimmed
            .parse::<IpAddr>()
            .map(Self)
            .map_err(|_| TargetError::InvalidAddress(trimmed.to_string()))
    }

    /// The validated address.
    pub const fn ip(&self) -> IpAddr {
        self.0
    }

    pub fn is_ipv6(&self) -> bool {
        self.0.is_ipv6()
    }
}

impl From<IpAddr> for ScanTarget {
    fn from(ip: IpAddr) -> Self {
        Self(ip)
    }
}

impl FromStr for ScanTarget {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for target validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("invalid IP address: {0:?} (expected an IPv4 or IPv6 literal, e.g. 192.168.1.1)")]
    InvalidAddress(String),
}
