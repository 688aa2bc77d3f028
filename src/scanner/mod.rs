//! Scanner module - runs a connect scan against one target.
//!
//! A [`ScanJob`] wires the pieces together: the dispatcher feeds probe
//! results to the aggregator task that owns the [`ScanState`], while an
//! optional progress monitor watches from the side. The job finishes when
//! every submitted probe has been recorded.

pub mod dispatch;
pub mod monitor;
pub mod probe;
pub mod state;

pub use monitor::{monitor_progress, scan_progress_bar};
pub use probe::{ProbeOutcome, ProbeResult, Prober, TcpConnectProber};
pub use state::{Progress, ScanState, Snapshot};

use crate::config::ScanConfig;
use crate::error::{DispatchError, ScanError, ScanResult};
use crate::types::{PortSet, ScanTarget};
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Lifecycle of a scan, logged as it moves along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    ValidatingTarget,
    ResolvingPorts,
    Scanning,
    Reporting,
    Complete,
    Aborted,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ValidatingTarget => "validating-target",
            Self::ResolvingPorts => "resolving-ports",
            Self::Scanning => "scanning",
            Self::Reporting => "reporting",
            Self::Complete => "complete",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// How a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// Every port was probed.
    Complete,
    /// Stopped early; results cover only the ports recorded before the stop.
    Aborted,
}

impl ScanStatus {
    /// The phase a scan with this status ends in.
    pub fn phase(self) -> ScanPhase {
        match self {
            Self::Complete => ScanPhase::Complete,
            Self::Aborted => ScanPhase::Aborted,
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Final state of a finished (or interrupted) scan, ready for reporting.
#[derive(Debug, Clone)]
pub struct CompletedScan {
    pub target: ScanTarget,
    pub status: ScanStatus,
    pub snapshot: Snapshot,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// A scan of one target over one port set.
pub struct ScanJob<P = TcpConnectProber> {
    target: ScanTarget,
    ports: PortSet,
    config: ScanConfig,
    prober: Arc<P>,
    cancel: CancellationToken,
    progress: Option<ProgressBar>,
}

impl ScanJob<TcpConnectProber> {
    /// Create a TCP connect scan job.
    pub fn new(target: ScanTarget, ports: PortSet, config: ScanConfig) -> Self {
        Self {
            target,
            ports,
            config,
            prober: Arc::new(TcpConnectProber::new()),
            cancel: CancellationToken::new(),
            progress: None,
        }
    }
}

impl<P: Prober + 'static> ScanJob<P> {
    /// Swap in a different prober.
    pub fn with_prober<Q: Prober + 'static>(self, prober: Q) -> ScanJob<Q> {
        ScanJob {
            target: self.target,
            ports: self.ports,
            config: self.config,
            prober: Arc::new(prober),
            cancel: self.cancel,
            progress: self.progress,
        }
    }

    /// Use `cancel` to interrupt the scan from outside.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Render progress on `bar` while scanning.
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// Token that interrupts this job when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the scan to completion or until cancelled.
    ///
    /// Interruption is not an error: the result is `Aborted` and carries
    /// whatever was recorded. Only a failure of the worker pool is returned as
    /// an error, with the partial snapshot attached.
    pub async fn run(self) -> ScanResult<CompletedScan> {
        let Self {
            target,
            ports,
            config,
            prober,
            cancel,
            progress,
        } = self;

        let started_at = Utc::now();
        let start = Instant::now();
        info!(
            %target,
            ports = ports.len(),
            concurrency = config.concurrency(),
            timeout_ms = config.timeout().as_millis() as u64,
            "starting scan"
        );
        debug!(phase = %ScanPhase::Scanning);

        let (tx, rx) = mpsc::channel(config.concurrency());
        let aggregator = state::spawn_aggregator(ScanState::new(ports.clone()), rx);

        // Stopped after dispatch so the monitor never outlives the scan.
        let monitor_stop = cancel.child_token();
        let monitor = progress.map(|bar| {
            tokio::spawn(monitor_progress(
                aggregator.progress.clone(),
                bar,
                config.progress_interval(),
                monitor_stop.clone(),
            ))
        });

        let dispatched =
            dispatch::dispatch(target.ip(), &ports, &config, prober, tx, &cancel).await;

        let final_state = aggregator.handle.await;
        monitor_stop.cancel();
        if let Some(monitor) = monitor {
            if let Err(e) = monitor.await {
                warn!(error = %e, "progress monitor failed");
            }
        }

        let snapshot = final_state
            .map_err(|e| ScanError::DispatchFatal {
                source: DispatchError::WorkerFailed(format!("result aggregator: {}", e)),
                partial: Box::new(ScanState::new(ports.clone()).snapshot()),
            })?
            .snapshot();

        if let Err(source) = dispatched {
            warn!(error = %source, scanned = snapshot.scanned, "dispatch failed");
            debug!(phase = %ScanPhase::Aborted);
            return Err(ScanError::DispatchFatal {
                source,
                partial: Box::new(snapshot),
            });
        }

        let status = if snapshot.is_complete() {
            ScanStatus::Complete
        } else {
            ScanStatus::Aborted
        };

        let elapsed = start.elapsed();
        info!(
            %status,
            scanned = snapshot.scanned,
            total = snapshot.total,
            open = snapshot.open_ports.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "scan finished"
        );

        Ok(CompletedScan {
            target,
            status,
            snapshot,
            started_at,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::types::{Port, PortSpec};
    use async_trait::async_trait;
    use std::net::IpAddr;

    /// Ports divisible by 10 are open, ports divisible by 7 time out.
    struct PatternProber;

    #[async_trait]
    impl Prober for PatternProber {
        async fn probe(&self, _target: IpAddr, port: Port, _timeout: Duration) -> ProbeOutcome {
            tokio::task::yield_now().await;
            match port.as_u16() {
                p if p % 10 == 0 => ProbeOutcome::Open,
                p if p % 7 == 0 => ProbeOutcome::Error(ProbeError::Timeout),
                _ => ProbeOutcome::Closed,
            }
        }
    }

    /// Answers the first `quick` ports immediately; the rest wait for the
    /// token and then report an error, like a probe hitting its timeout.
    struct StallingProber {
        quick: u16,
        release: CancellationToken,
    }

    #[async_trait]
    impl Prober for StallingProber {
        async fn probe(&self, _target: IpAddr, port: Port, _timeout: Duration) -> ProbeOutcome {
            if port.as_u16() <= self.quick {
                return if port.as_u16() == 2 {
                    ProbeOutcome::Open
                } else {
                    ProbeOutcome::Closed
                };
            }
            self.release.cancelled().await;
            ProbeOutcome::Error(ProbeError::Timeout)
        }
    }

    struct FailingProber;

    #[async_trait]
    impl Prober for FailingProber {
        async fn probe(&self, _target: IpAddr, port: Port, _timeout: Duration) -> ProbeOutcome {
            if port.as_u16() == 5 {
                panic!("worker crashed");
            }
            ProbeOutcome::Closed
        }
    }

    fn job(range: &str, concurrency: usize) -> ScanJob {
        let ports = PortSpec::parse_range(range).unwrap().resolve();
        let config = ScanConfig::new(concurrency, Duration::from_secs(1)).unwrap();
        ScanJob::new(ScanTarget::parse("127.0.0.1").unwrap(), ports, config)
    }

    #[tokio::test]
    async fn test_completed_scan_counts_every_port() {
        let scan = job("1-100", 16).with_prober(PatternProber).run().await.unwrap();

        assert_eq!(scan.status, ScanStatus::Complete);
        assert_eq!(scan.snapshot.scanned, 100);
        assert_eq!(scan.snapshot.total, 100);
        let open: Vec<u16> = scan.snapshot.open_ports.iter().map(|p| p.as_u16()).collect();
        assert_eq!(open, (1..=10).map(|n| n * 10).collect::<Vec<_>>());
        // 7..=98 step 7 minus 70: 14 multiples of 7, one of which is also a multiple of 10.
        assert_eq!(scan.snapshot.errors, 13);
        assert_eq!(scan.snapshot.closed, 100 - 10 - 13);
    }

    #[tokio::test]
    async fn test_progress_bar_reaches_total() {
        let bar = ProgressBar::hidden();
        let scan = job("1-50", 4)
            .with_prober(PatternProber)
            .with_progress(bar.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(scan.status, ScanStatus::Complete);
        assert_eq!(bar.position(), 50);
    }

    #[tokio::test]
    async fn test_cancel_mid_scan_reports_partial_results() {
        let release = CancellationToken::new();
        let cancel = CancellationToken::new();
        let prober = StallingProber {
            quick: 3,
            release: release.clone(),
        };
        let job = job("1-10", 2).with_prober(prober).with_cancel(cancel.clone());
        let handle = tokio::spawn(job.run());

        // Ports 1-3 finish at once, 4 and 5 hold both permits until released.
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        release.cancel();

        let scan = handle.await.unwrap().unwrap();
        assert_eq!(scan.status, ScanStatus::Aborted);
        assert_eq!(scan.snapshot.total, 10);
        assert_eq!(scan.snapshot.scanned, 5);
        assert!(scan.snapshot.scanned <= scan.snapshot.total);
        let open: Vec<u16> = scan.snapshot.open_ports.iter().map(|p| p.as_u16()).collect();
        assert_eq!(open, vec![2]);
    }

    #[tokio::test]
    async fn test_worker_failure_surfaces_partial_snapshot() {
        let err = job("1-20", 1).with_prober(FailingProber).run().await.unwrap_err();

        match err {
            ScanError::DispatchFatal { source, partial } => {
                assert!(matches!(source, DispatchError::WorkerFailed(_)));
                assert!(partial.scanned < partial.total);
                assert!(partial.scanned >= 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_status_phase() {
        assert_eq!(ScanStatus::Complete.phase(), ScanPhase::Complete);
        assert_eq!(ScanStatus::Aborted.phase(), ScanPhase::Aborted);
        assert_eq!(ScanPhase::ValidatingTarget.to_string(), "validating-target");
    }
}
