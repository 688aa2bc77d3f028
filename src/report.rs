//! Scan report.
//!
//! Turns the final snapshot of a scan into the structure that gets printed or
//! serialized. Building a report never touches the network.

use crate::scanner::{CompletedScan, ScanStatus, Snapshot};
use crate::services::ServiceLookup;
use crate::types::{Port, ScanTarget};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// One open port in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenPort {
    pub port: Port,
    /// `None` when service names were not requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

/// Everything known about a scan once it has stopped.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub target: ScanTarget,
    pub status: ScanStatus,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub ports_scanned: usize,
    pub total_ports: usize,
    pub closed_ports: usize,
    pub errored_ports: usize,
    /// Ascending by port.
    pub open_ports: Vec<OpenPort>,
}

impl ScanReport {
    /// Build the report for a finished scan.
    pub fn from_scan(scan: &CompletedScan, services: Option<&dyn ServiceLookup>) -> Self {
        Self::build(
            scan.target,
            scan.status,
            &scan.snapshot,
            scan.started_at,
            scan.elapsed,
            services,
        )
    }

    /// Build a report from a bare snapshot, e.g. one salvaged from a failed scan.
    pub fn build(
        target: ScanTarget,
        status: ScanStatus,
        snapshot: &Snapshot,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        services: Option<&dyn ServiceLookup>,
    ) -> Self {
        let open_ports = snapshot
            .open_ports
            .iter()
            .map(|&port| OpenPort {
                port,
                service: services.map(|lookup| lookup.describe(port).to_string()),
            })
            .collect();

        Self {
            target,
            status,
            started_at,
            duration_ms: elapsed.as_millis() as u64,
            ports_scanned: snapshot.scanned,
            total_ports: snapshot.total,
            closed_ports: snapshot.closed,
            errored_ports: snapshot.errors,
            open_ports,
        }
    }

    pub fn open_count(&self) -> usize {
        self.open_ports.len()
    }

    pub fn is_complete(&self) -> bool {
        self.status == ScanStatus::Complete
    }
}
