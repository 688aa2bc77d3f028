//! CSV output formatting.

use crate::report::ScanReport;
use std::io::{self, Write};

/// Write one row per open port.
pub fn write_csv<W: Write>(out: W, report: &ScanReport) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["target", "port", "state", "service"])?;

    let target = report.target.to_string();
    for open in &report.open_ports {
        let port = open.port.to_string();
        wtr.write_record([
            target.as_str(),
            port.as_str(),
            "open",
            open.service.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
