//! # portsweep - a TCP connect port scanner
//!
//! Probes a set of TCP ports on one IPv4 or IPv6 host by attempting a full
//! connection to each, with a bounded number of attempts in flight.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portsweep::config::ScanConfig;
//! use portsweep::scanner::ScanJob;
//! use portsweep::types::{PortSpec, ScanTarget};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let target = ScanTarget::parse("192.168.1.1")?;
//!     let ports = PortSpec::parse_range("1-1024")?.resolve();
//!     let scan = ScanJob::new(target, ports, ScanConfig::default()).run().await?;
//!
//!     for port in &scan.snapshot.open_ports {
//!         println!("{} open", port);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - validated ports, port sets and targets
//! - [`scanner`] - probing, the worker pool, shared scan state and progress
//! - [`report`] - the final report built from a scan
//! - [`services`] - well-known service names
//! - [`config`] - scan parameters and the settings file
//! - [`output`] - plain, quiet, JSON and CSV rendering
//! - [`error`] - error types

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod report;
pub mod scanner;
pub mod services;
pub mod types;

pub use config::ScanConfig;
pub use error::{ProbeError, ScanError};
pub use report::ScanReport;
pub use scanner::{CompletedScan, ScanJob, ScanStatus};
pub use types::{Port, PortSet, PortSpec, ScanTarget};
