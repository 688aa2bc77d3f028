//! Scan state and the task that owns it.
//!
//! Workers never touch the state directly. They send [`ProbeResult`]s over a
//! channel to a single aggregator task, which applies them one at a time and
//! publishes a [`Progress`] value after each. Because only one task mutates
//! the state, increments and insertions can never interleave.

use super::probe::{ProbeOutcome, ProbeResult};
use crate::types::{Port, PortSet};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::warn;

/// Counters and open ports accumulated over a scan.
#[derive(Debug, Clone)]
pub struct ScanState {
    ports: PortSet,
    seen: HashSet<Port>,
    scanned: usize,
    closed: usize,
    errors: usize,
    open_ports: BTreeSet<Port>,
}

impl ScanState {
    /// Fresh state for scanning `ports`; `total` is fixed from here on.
    pub fn new(ports: PortSet) -> Self {
        Self {
            seen: HashSet::with_capacity(ports.len()),
            ports,
            scanned: 0,
            closed: 0,
            errors: 0,
            open_ports: BTreeSet::new(),
        }
    }

    /// Apply one probe result.
    ///
    /// Returns `false` (and changes nothing) for a port outside the scanned
    /// set or a port that already has a result.
    pub fn record(&mut self, result: &ProbeResult) -> bool {
        if !self.ports.contains(result.port) {
            warn!(port = %result.port, "ignoring result for a port outside the scan");
            return false;
        }
        if !self.seen.insert(result.port) {
            warn!(port = %result.port, "ignoring duplicate result");
            return false;
        }

        match &result.outcome {
            ProbeOutcome::Open => {
                self.open_ports.insert(result.port);
            }
            ProbeOutcome::Closed => self.closed += 1,
            ProbeOutcome::Error(_) => self.errors += 1,
        }
        self.scanned += 1;
        true
    }

    pub fn scanned(&self) -> usize {
        self.scanned
    }

    pub fn total(&self) -> usize {
        self.ports.len()
    }

    pub fn is_complete(&self) -> bool {
        self.scanned == self.total()
    }

    /// Consistent copy of the counters and open ports.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            scanned: self.scanned,
            total: self.total(),
            closed: self.closed,
            errors: self.errors,
            open_ports: self.open_ports.clone(),
        }
    }

    /// Cheap summary published to the progress monitor.
    pub fn progress(&self) -> Progress {
        Progress {
            scanned: self.scanned,
            total: self.total(),
            open: self.open_ports.len(),
        }
    }
}

/// Point-in-time view of a scan's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub scanned: usize,
    pub total: usize,
    pub closed: usize,
    pub errors: usize,
    /// Ascending by construction.
    pub open_ports: BTreeSet<Port>,
}

impl Snapshot {
    pub fn is_complete(&self) -> bool {
        self.scanned == self.total
    }
}

/// How far along a scan is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub scanned: usize,
    pub total: usize,
    pub open: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.scanned >= self.total
    }

    /// Completion as a percentage in `[0, 100]`.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.scanned as f64 * 100.0 / self.total as f64
        }
    }
}

/// Handle to a running aggregator.
pub struct Aggregator {
    pub handle: JoinHandle<ScanState>,
    pub progress: watch::Receiver<Progress>,
}

/// Spawn the task that owns `state`.
///
/// It applies every result received on `results` and finishes, returning the
/// final state, once all senders are dropped.
pub fn spawn_aggregator(
    mut state: ScanState,
    mut results: mpsc::Receiver<ProbeResult>,
) -> Aggregator {
    let (tx, rx) = watch::channel(state.progress());

    let handle = tokio::spawn(async move {
        while let Some(result) = results.recv().await {
            if state.record(&result) {
                tx.send_replace(state.progress());
            }
        }
        state
    });

    Aggregator {
        handle,
        progress: rx,
    }
}
