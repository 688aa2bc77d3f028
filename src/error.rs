//! Error types for portsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-port failures live in
//! [`ProbeError`] and never escape the dispatcher; everything in [`ScanError`]
//! stops the scan (or prevents it from starting).

use crate::scanner::Snapshot;
use crate::types::{PortError, TargetError};
use std::path::PathBuf;
use thiserror::Error;

/// Why a single probe did not produce an open or closed verdict.
///
/// Recorded inside the probe outcome; never retried, never propagated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("connection timed out")]
    Timeout,

    #[error("host unreachable")]
    HostUnreachable,

    #[error("network unreachable")]
    NetworkUnreachable,

    #[error("I/O error: {0}")]
    Io(String),
}

/// Failure of the worker pool itself, as opposed to a single probe.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("probe worker failed: {0}")]
    WorkerFailed(String),
}

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidValue(String),
}

/// Main error type for scan operations.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    InvalidTarget(#[from] TargetError),

    #[error(transparent)]
    InvalidPortSpec(#[from] PortError),

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// The pool could not keep scheduling work. `partial` holds whatever had
    /// been recorded before the failure.
    #[error("scan aborted")]
    DispatchFatal {
        #[source]
        source: DispatchError,
        partial: Box<Snapshot>,
    },
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
