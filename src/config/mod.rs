//! Configuration for a scan.
//!
//! [`ScanConfig`] is the validated, immutable set of knobs a scan runs with.
//! [`AppSettings`] is the optional settings file that feeds its defaults.

mod settings;

pub use settings::{default_settings_file, AppSettings};

use crate::error::{ConfigError, ConfigResult};
use std::time::Duration;

/// Default number of concurrent probes.
pub const DEFAULT_CONCURRENCY: usize = 100;
/// Upper bound on concurrent probes; each one holds a socket.
pub const MAX_CONCURRENCY: usize = 5_000;
/// Default per-probe connect timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
/// Default progress sampling interval.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Validated scan configuration.
///
/// `concurrency` is the hard ceiling on simultaneously open connection
/// attempts, and therefore on sockets and file descriptors in use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanConfig {
    concurrency: usize,
    timeout: Duration,
    progress_interval: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl ScanConfig {
    /// Create a configuration, rejecting a concurrency outside
    /// `1..=MAX_CONCURRENCY` or a zero timeout.
    pub fn new(concurrency: usize, timeout: Duration) -> ConfigResult<Self> {
        if !(1..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(ConfigError::InvalidValue(format!(
                "concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY, concurrency
            )));
        }
        if timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "timeout must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            concurrency,
            timeout,
            ..Self::default()
        })
    }

    /// Create a configuration from a timeout expressed in (fractional) seconds.
    pub fn from_secs_f64(concurrency: usize, timeout_secs: f64) -> ConfigResult<Self> {
        if !timeout_secs.is_finite() || timeout_secs <= 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "timeout must be a positive number of seconds, got {}",
                timeout_secs
            )));
        }
        let timeout = Duration::try_from_secs_f64(timeout_secs)
            .map_err(|e| ConfigError::InvalidValue(format!("timeout {}: {}", timeout_secs, e)))?;
        Self::new(concurrency, timeout)
    }

    /// Set how often the progress monitor may redraw.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn progress_interval(&self) -> Duration {
        self.progress_interval
    }
}
