//! Core type definitions using newtype patterns for type safety.
//!
//! A `ScanTarget` is always a valid address and a `PortSet` only ever holds
//! valid, distinct ports, so the scanner never has to re-check either.

mod port;
mod target;

pub use port::{Port, PortError, PortRange, PortSet, PortSpec};
pub use target::{ScanTarget, TargetError};
