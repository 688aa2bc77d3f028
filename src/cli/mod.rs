//! Command-line interface definitions for portsweep.
//!
//! Uses `clap` derive macros for declarative argument parsing.

mod scan;

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// portsweep - a bounded-concurrency TCP connect port scanner.
///
/// Scans every port (1-65535) on the target by default. Use --port-range or
/// --port-list to narrow the sweep.
#[derive(Parser, Debug)]
#[command(name = "portsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A fast TCP connect port scanner", long_about = None)]
#[command(group(ArgGroup::new("ports").args(["port_range", "port_list"])))]
#[command(after_help = "Examples:\n  \
    portsweep 192.168.1.1                  Scan all ports\n  \
    portsweep 192.168.1.1 -p 80-443        Scan a port range\n  \
    portsweep 192.168.1.1 -l 80,443,8080   Scan specific ports\n  \
    portsweep ::1 -c 200 -t 2              Custom concurrency and timeout")]
pub struct Cli {
    /// Target IPv4 or IPv6 address
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Inclusive port range to scan (e.g. "1-1000")
    #[arg(short = 'p', long = "port-range", value_name = "START-END")]
    pub port_range: Option<String>,

    /// Comma-separated ports to scan (e.g. "22,80,443")
    #[arg(short = 'l', long = "port-list", value_name = "PORTS")]
    pub port_list: Option<String>,

    /// Maximum number of concurrent connection attempts [default: 100]
    #[arg(short = 'c', long, visible_alias = "threads")]
    pub concurrency: Option<usize>,

    /// Connection timeout in seconds [default: 1.0]
    #[arg(short = 't', long, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Only print open ports, one per line
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not show service names
    #[arg(long)]
    pub no_service: bool,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a settings file
    #[arg(long, value_name = "PATH", env = "PORTSWEEP_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["portsweep", "127.0.0.1"]).unwrap();
        assert_eq!(cli.target, "127.0.0.1");
        assert!(cli.port_range.is_none() && cli.port_list.is_none());
        assert!(cli.concurrency.is_none());
        assert!(!cli.quiet && !cli.no_service);
        assert_eq!(cli.output, OutputFormat::Plain);
    }

    #[test]
    fn test_full_flag_set() {
        let cli = Cli::try_parse_from([
            "portsweep", "::1", "-l", "80,443", "--threads", "20", "-t", "0.5", "-q",
            "--no-service", "-o", "json",
        ])
        .unwrap();
        assert_eq!(cli.port_list.as_deref(), Some("80,443"));
        assert_eq!(cli.concurrency, Some(20));
        assert_eq!(cli.timeout, Some(0.5));
        assert!(cli.quiet && cli.no_service);
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_range_and_list_are_exclusive() {
        let result =
            Cli::try_parse_from(["portsweep", "127.0.0.1", "-p", "1-10", "-l", "22"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_target_required() {
        assert!(Cli::try_parse_from(["portsweep"]).is_err());
    }
}
