//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan reports.
//! Every formatter writes to any `io::Write`; the `print_*` helpers bind them
//! to stdout.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use plain::{print_error, print_scan_header, print_warning, write_plain, write_quiet};

use crate::cli::OutputFormat;
use crate::report::ScanReport;
use std::io::{self, Write};

/// Write `report` in `format`. Quiet mode only changes the plain format;
/// JSON and CSV are already machine-oriented.
pub fn write_report<W: Write>(
    out: &mut W,
    report: &ScanReport,
    format: OutputFormat,
    quiet: bool,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain if quiet => write_quiet(out, report),
        OutputFormat::Plain => write_plain(out, report),
        OutputFormat::Json => write_json(out, report),
        OutputFormat::Csv => write_csv(out, report),
    }
}

/// Print `report` to stdout.
pub fn print_report(report: &ScanReport, format: OutputFormat, quiet: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, report, format, quiet)?;
    out.flush()
}
