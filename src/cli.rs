use clap::{Parser, Subcommand};
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// Classify scanned host files against the reference store.
#[derive(Debug, Parser)]
#[command(name = "syscheck", version, about)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Accept scan batches over HTTP until interrupted.
    Serve,
    /// Run a single batch file through the pipeline.
    Analyze {
        /// Path to a batch JSON file, as the scanner would have posted it.
        batch: PathBuf,
    },
    /// Merge every report of one host into a consolidated report.
    Finalize { hostname: String, ipv4: Ipv4Addr },
}
