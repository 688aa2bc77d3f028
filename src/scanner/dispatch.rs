//! Bounded-concurrency dispatcher.
//!
//! One task is spawned per port, but only after a semaphore permit has been
//! acquired, so at most `concurrency` connection attempts (and sockets) exist
//! at any moment. The permit lives inside the task and is released when the
//! probe's result has been handed to the aggregator.

use super::probe::{ProbeResult, Prober};
use crate::config::ScanConfig;
use crate::error::DispatchError;
use crate::types::PortSet;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Probe every port in `ports` and send each result on `results`.
///
/// Returns the number of probes submitted once all of them have finished.
/// Cancellation stops further submissions; probes already running are left to
/// finish within their own timeout. A worker that dies without reporting is
/// fatal: submissions stop, running probes are drained, and the error returned.
pub async fn dispatch<P>(
    target: IpAddr,
    ports: &PortSet,
    config: &ScanConfig,
    prober: Arc<P>,
    results: mpsc::Sender<ProbeResult>,
    cancel: &CancellationToken,
) -> Result<usize, DispatchError>
where
    P: Prober + 'static,
{
    let semaphore = Arc::new(Semaphore::new(config.concurrency()));
    let timeout = config.timeout();
    let mut workers = JoinSet::new();
    let mut failure: Option<DispatchError> = None;
    let mut submitted = 0usize;

    for port in ports.iter() {
        while let Some(joined) = workers.try_join_next() {
            note_failure(&mut failure, joined);
        }
        if failure.is_some() {
            break;
        }

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(submitted, remaining = ports.len() - submitted, "scan cancelled, stopping submissions");
                break;
            }
            permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(e) => {
                    failure = Some(DispatchError::WorkerFailed(format!("port {}: {}", port, e)));
                    break;
                }
            },
        };

        let prober = Arc::clone(&prober);
        let results = results.clone();
        workers.spawn(async move {
            let _permit = permit;
            let outcome = prober.probe(target, port, timeout).await;
            if results.send(ProbeResult::new(port, outcome)).await.is_err() {
                warn!(%port, "aggregator gone, result dropped");
            }
        });
        submitted += 1;
    }

    // Only the workers' clones remain; the aggregator sees end-of-stream once they finish.
    drop(results);

    while let Some(joined) = workers.join_next().await {
        note_failure(&mut failure, joined);
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(submitted),
    }
}

fn note_failure(failure: &mut Option<DispatchError>, joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        warn!(error = %e, "probe worker failed");
        failure.get_or_insert_with(|| DispatchError::WorkerFailed(e.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::probe::ProbeOutcome;
    use crate::types::{Port, PortSpec};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    const TARGET: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    /// Counts calls per port and tracks the peak number of concurrent probes.
    #[derive(Default)]
    struct CountingProber {
        calls: Mutex<HashMap<Port, usize>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Prober for CountingProber {
        async fn probe(&self, _target: IpAddr, port: Port, _timeout: Duration) -> ProbeOutcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2)).await;
            *self.calls.lock().unwrap().entry(port).or_default() += 1;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            ProbeOutcome::Closed
        }
    }

    struct PanickingProber;

    #[async_trait]
    impl Prober for PanickingProber {
        async fn probe(&self, _target: IpAddr, port: Port, _timeout: Duration) -> ProbeOutcome {
            if port.as_u16() == 3 {
                panic!("probe blew up");
            }
            ProbeOutcome::Closed
        }
    }

    async fn drain(mut rx: mpsc::Receiver<ProbeResult>) -> Vec<ProbeResult> {
        let mut out = Vec::new();
        while let Some(result) = rx.recv().await {
            out.push(result);
        }
        out
    }

    #[tokio::test]
    async fn test_every_port_probed_once_within_limit() {
        let ports = PortSpec::parse_range("1-200").unwrap().resolve();
        let config = ScanConfig::new(8, Duration::from_secs(1)).unwrap();
        let prober = Arc::new(CountingProber::default());
        let (tx, rx) = mpsc::channel(8);
        let collector = tokio::spawn(drain(rx));

        let submitted = dispatch(
            TARGET,
            &ports,
            &config,
            Arc::clone(&prober),
            tx,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let received = collector.await.unwrap();
        assert_eq!(submitted, 200);
        assert_eq!(received.len(), 200);

        let calls = prober.calls.lock().unwrap();
        assert_eq!(calls.len(), 200);
        assert!(calls.values().all(|&n| n == 1));
        assert!(prober.peak.load(Ordering::SeqCst) <= 8);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_submits_nothing() {
        let ports = PortSpec::parse_range("1-50").unwrap().resolve();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (tx, rx) = mpsc::channel(4);

        let submitted = dispatch(
            TARGET,
            &ports,
            &ScanConfig::default(),
            Arc::new(CountingProber::default()),
            tx,
            &cancel,
        )
        .await
        .unwrap();

        assert_eq!(submitted, 0);
        assert!(drain(rx).await.is_empty());
    }

    #[tokio::test]
    async fn test_worker_panic_is_fatal() {
        let ports = PortSpec::parse_range("1-5").unwrap().resolve();
        let config = ScanConfig::new(1, Duration::from_secs(1)).unwrap();
        let (tx, rx) = mpsc::channel(4);
        let collector = tokio::spawn(drain(rx));

        let result = dispatch(
            TARGET,
            &ports,
            &config,
            Arc::new(PanickingProber),
            tx,
            &CancellationToken::new(),
        )
        .await;

        assert!(matches!(result, Err(DispatchError::WorkerFailed(_))));
        let received = collector.await.unwrap();
        assert!(received.iter().all(|r| r.port.as_u16() != 3));
        assert!(received.len() < 5);
    }
}
