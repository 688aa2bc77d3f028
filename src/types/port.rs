//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortSpec` describes what the user asked for (a range, a list, or the full
//! space) and `PortSet` is the resolved, duplicate-free set that gets scanned.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Delegate so width and alignment flags apply.
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(u32::from(value)))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

impl FromStr for Port {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }
        // Parse wider than u16 so "70000" reports out-of-range rather than a format error.
        let value: u32 = s
            .parse()
            .map_err(|_| PortError::InvalidFormat(s.to_string()))?;
        u16::try_from(value)
            .ok()
            .and_then(Port::new)
            .ok_or(PortError::OutOfRange(value))
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u32),
    #[error("invalid port number: {0:?}")]
    InvalidFormat(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port specification")]
    Empty,
}

/// An inclusive range of ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    /// Create a new port range. Reversed bounds are rejected, never swapped.
    pub fn new(start: Port, end: Port) -> Result<Self, PortError> {
        if start > end {
            Err(PortError::InvalidRange(start.0, end.0))
        } else {
            Ok(Self { start, end })
        }
    }

    /// The whole port space, 1-65535.
    pub const fn full() -> Self {
        Self {
            start: Port(Port::MIN),
            end: Port(Port::MAX),
        }
    }

    pub const fn start(&self) -> Port {
        self.start
    }

    pub const fn end(&self) -> Port {
        self.end
    }

    /// Number of ports in this range.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// A valid range always holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over all ports in this range, ascending.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl FromStr for PortRange {
    type Err = PortError;

    /// Parses `start-end`, or a lone `port` meaning `port-port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        match s.split_once('-') {
            Some((start, end)) => {
                if end.contains('-') {
                    return Err(PortError::InvalidFormat(s.to_string()));
                }
                Self::new(start.parse()?, end.parse()?)
            }
            None => {
                let port: Port = s.parse()?;
                Self::new(port, port)
            }
        }
    }
}

/// What the caller asked to scan, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PortSpec {
    /// An inclusive range.
    Range(PortRange),
    /// An explicit list, in the order given (duplicates allowed here).
    List(Vec<Port>),
    /// Every port, 1-65535.
    #[default]
    Full,
}

impl PortSpec {
    /// Parse an inclusive range such as `"80-443"`.
    pub fn parse_range(s: &str) -> Result<Self, PortError> {
        s.parse().map(Self::Range)
    }

    /// Parse a comma-separated list such as `"80,443,8080"`.
    pub fn parse_list(s: &str) -> Result<Self, PortError> {
        if s.trim().is_empty() {
            return Err(PortError::Empty);
        }
        s.split(',')
            .map(str::parse)
            .collect::<Result<Vec<Port>, _>>()
            .map(Self::List)
    }

    /// Build a spec from the mutually exclusive range/list options.
    ///
    /// Neither given means a full sweep. If both are given the range wins;
    /// the CLI layer rejects that combination before it gets here.
    pub fn from_options(range: Option<&str>, list: Option<&str>) -> Result<Self, PortError> {
        match (range, list) {
            (Some(range), _) => Self::parse_range(range),
            (None, Some(list)) => Self::parse_list(list),
            (None, None) => Ok(Self::Full),
        }
    }

    /// Resolve into the concrete, sorted, duplicate-free set of ports.
    pub fn resolve(&self) -> PortSet {
        match self {
            Self::Range(range) => PortSet {
                ports: range.iter().collect(),
            },
            Self::List(ports) => PortSet::from_ports(ports.iter().copied()),
            Self::Full => PortSet {
                ports: PortRange::full().iter().collect(),
            },
        }
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range(range) => write!(f, "{}", range),
            Self::List(ports) => {
                let parts: Vec<String> = ports.iter().map(Port::to_string).collect();
                write!(f, "{}", parts.join(","))
            }
            Self::Full => write!(f, "{}", PortRange::full()),
        }
    }
}

/// A resolved, ascending, duplicate-free set of ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSet {
    ports: Vec<Port>,
}

impl PortSet {
    /// Collect ports into a set, sorting and dropping duplicates.
    pub fn from_ports(ports: impl IntoIterator<Item = Port>) -> Self {
        let mut ports: Vec<Port> = ports.into_iter().collect();
        ports.sort_unstable();
        ports.dedup();
        Self { ports }
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn contains(&self, port: Port) -> bool {
        self.ports.binary_search(&port).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Port> + '_ {
        self.ports.iter().copied()
    }

    pub fn as_slice(&self) -> &[Port] {
        &self.ports
    }
}

impl<'a> IntoIterator for &'a PortSet {
    type Item = &'a Port;
    type IntoIter = std::slice::Iter<'a, Port>;

    fn into_iter(self) -> Self::IntoIter {
        self.ports.iter()
    }
}
