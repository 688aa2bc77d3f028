//! Scan command execution.
//!
//! Turns parsed arguments into a [`ScanJob`], runs it, and prints the report.

use super::{Cli, OutputFormat};
use crate::config::{AppSettings, ScanConfig};
use crate::error::ScanError;
use crate::output;
use crate::report::ScanReport;
use crate::scanner::{scan_progress_bar, ScanJob, ScanPhase, ScanStatus};
use crate::services::{ServiceLookup, WellKnownServices};
use crate::types::{PortSpec, ScanTarget};
use anyhow::Context;
use chrono::Utc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

impl Cli {
    /// Run the scan described by these arguments.
    ///
    /// An interrupted scan still prints what it found and counts as success.
    pub async fn execute(&self) -> anyhow::Result<()> {
        debug!(phase = %ScanPhase::Idle);
        debug!(phase = %ScanPhase::ValidatingTarget);
        let target = ScanTarget::parse(&self.target).map_err(ScanError::from)?;

        debug!(phase = %ScanPhase::ResolvingPorts);
        let spec = PortSpec::from_options(self.port_range.as_deref(), self.port_list.as_deref())
            .map_err(ScanError::from)?;
        let ports = spec.resolve();
        debug!(%spec, count = ports.len(), "resolved ports");

        let settings = AppSettings::load(self.config.as_deref())
            .map_err(ScanError::from)
            .context("failed to load settings")?;
        let config = self.scan_config(&settings)?;

        let interactive = !self.quiet && self.output == OutputFormat::Plain;
        if interactive {
            output::print_scan_header(
                &target.to_string(),
                ports.len(),
                config.concurrency(),
                config.timeout().as_secs_f64(),
            );
        }

        let cancel = CancellationToken::new();
        let interrupt = spawn_interrupt_handler(cancel.clone(), self.quiet);

        let total = ports.len();
        let mut job = ScanJob::new(target, ports, config).with_cancel(cancel);
        if interactive {
            job = job.with_progress(scan_progress_bar(total));
        }

        let started_at = Utc::now();
        let start = Instant::now();
        let outcome = job.run().await;
        interrupt.abort();

        let services = (!self.no_service && settings.show_services).then_some(WellKnownServices);
        let lookup = services.as_ref().map(|s| s as &dyn ServiceLookup);

        debug!(phase = %ScanPhase::Reporting);
        match outcome {
            Ok(scan) => {
                let report = ScanReport::from_scan(&scan, lookup);
                output::print_report(&report, self.output, self.quiet)
                    .context("failed to write report")?;
                if scan.status == ScanStatus::Aborted && !self.quiet {
                    output::print_warning(&format!(
                        "scan interrupted after {} of {} ports",
                        report.ports_scanned, report.total_ports
                    ));
                }
                debug!(phase = %scan.status.phase());
                Ok(())
            }
            Err(ScanError::DispatchFatal { source, partial }) => {
                // Show what was recorded before the pool failed, then fail.
                let report = ScanReport::build(
                    target,
                    ScanStatus::Aborted,
                    &partial,
                    started_at,
                    start.elapsed(),
                    lookup,
                );
                output::print_report(&report, self.output, self.quiet)
                    .context("failed to write report")?;
                debug!(phase = %ScanPhase::Aborted);
                Err(ScanError::DispatchFatal { source, partial }.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Merge command-line flags over the settings file.
    fn scan_config(&self, settings: &AppSettings) -> anyhow::Result<ScanConfig> {
        let concurrency = self.concurrency.unwrap_or(settings.default_concurrency);
        let timeout = self.timeout.unwrap_or(settings.default_timeout_secs);
        let config = ScanConfig::from_secs_f64(concurrency, timeout)
            .map_err(ScanError::from)?
            .with_progress_interval(Duration::from_millis(settings.progress_interval_ms));
        Ok(config)
    }
}

/// Cancel `cancel` on the first Ctrl-C. Abort the returned handle once the
/// scan is over.
fn spawn_interrupt_handler(cancel: CancellationToken, quiet: bool) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            signal = tokio::signal::ctrl_c() => {
                if signal.is_ok() {
                    interrupt(&cancel, quiet);
                }
            }
        }
    })
}

/// Stop the scan. The warning goes to stderr and is skipped in quiet mode.
/// Returns whether a warning was printed.
fn interrupt(cancel: &CancellationToken, quiet: bool) -> bool {
    info!("interrupt received, stopping scan");
    cancel.cancel();
    if !quiet {
        output::print_warning("interrupted, finishing in-flight probes...");
    }
    !quiet
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["portsweep", "127.0.0.1"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_override_settings() {
        let settings = AppSettings {
            default_concurrency: 7,
            default_timeout_secs: 3.0,
            progress_interval_ms: 50,
            show_services: true,
        };

        let config = cli(&[]).scan_config(&settings).unwrap();
        assert_eq!(config.concurrency(), 7);
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.progress_interval(), Duration::from_millis(50));

        let config = cli(&["-c", "20", "-t", "0.25"]).scan_config(&settings).unwrap();
        assert_eq!(config.concurrency(), 20);
        assert_eq!(config.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let settings = AppSettings::default();
        assert!(cli(&["-c", "0"]).scan_config(&settings).is_err());
        assert!(cli(&["-t", "0"]).scan_config(&settings).is_err());
    }

    #[tokio::test]
    async fn test_invalid_target_fails_before_scanning() {
        // A broken settings file must not mask the bad target.
        let mut settings = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut settings, b"{ not json").unwrap();
        let path = settings.path().to_str().unwrap();

        let err = Cli::try_parse_from(["portsweep", "not-an-ip", "-l", "1", "--config", path])
            .unwrap()
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScanError>(),
            Some(ScanError::InvalidTarget(_))
        ));
    }

    #[tokio::test]
    async fn test_reversed_range_fails() {
        let err = cli(&["-p", "100-1", "-q"]).execute().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScanError>(),
            Some(ScanError::InvalidPortSpec(_))
        ));
    }

    #[tokio::test]
    async fn test_broken_settings_file_is_a_config_error() {
        let mut settings = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut settings, b"{ not json").unwrap();
        let path = settings.path().to_str().unwrap();

        let err = cli(&["-l", "1", "-q", "--config", path]).execute().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScanError>(),
            Some(ScanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_interrupt_cancels_and_respects_quiet() {
        let cancel = CancellationToken::new();
        assert!(!interrupt(&cancel, true));
        assert!(cancel.is_cancelled());

        let cancel = CancellationToken::new();
        assert!(interrupt(&cancel, false));
        assert!(cancel.is_cancelled());
    }
}
