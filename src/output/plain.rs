//! Plain text output formatting.
//!
//! Produces human-readable output with colors, plus the terse one-port-per-line
//! form used in quiet mode.

use crate::report::ScanReport;
use crate::scanner::ScanStatus;
use console::style;
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Write the full report: header, table of open ports, summary.
pub fn write_plain<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                   {} Scan Results",
        style("portsweep").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(out, "  {} {}", style("Target:").bold(), report.target)?;
    let status = match report.status {
        ScanStatus::Complete => style(report.status.to_string()).green(),
        ScanStatus::Aborted => style(format!("{} (interrupted)", report.status)).yellow(),
    };
    writeln!(out, "  {} {}", style("Status:").bold(), status)?;
    writeln!(out)?;

    if report.open_ports.is_empty() {
        writeln!(out, "  {}", style("No open ports found.").dim())?;
    } else {
        let with_services = report.open_ports.iter().any(|p| p.service.is_some());

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        if with_services {
            writeln!(
                out,
                "  {:>6}  {}",
                style("PORT").bold(),
                style("SERVICE").bold()
            )?;
        } else {
            writeln!(out, "  {:>6}", style("PORT").bold())?;
        }
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for open in &report.open_ports {
            match &open.service {
                Some(service) => writeln!(out, "  {:>6}  {}", style(open.port).green(), service)?,
                None => writeln!(out, "  {:>6}", style(open.port).green())?,
            }
        }
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "  {} {} of {} ports scanned in {:.2}s",
        style("Summary:").bold(),
        report.ports_scanned,
        report.total_ports,
        report.duration_ms as f64 / 1000.0
    )?;
    writeln!(
        out,
        "           {} open, {} closed, {} unanswered",
        style(report.open_count()).green().bold(),
        style(report.closed_ports).red(),
        style(report.errored_ports).yellow()
    )?;
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;

    Ok(())
}

/// Write one open port per line, `PORT (service)` or just `PORT`.
pub fn write_quiet<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    for open in &report.open_ports {
        match &open.service {
            Some(service) => writeln!(out, "{} ({})", open.port, service)?,
            None => writeln!(out, "{}", open.port)?,
        }
    }
    Ok(())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(target: &str, ports: usize, concurrency: usize, timeout_secs: f64) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("portsweep").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{} Target: {}", style("•").dim(), style(target).white().bold());
    println!(
        "{} Scanning {} ports with {} workers ({}s timeout)...",
        style("•").dim(),
        style(ports).white().bold(),
        concurrency,
        timeout_secs
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}
