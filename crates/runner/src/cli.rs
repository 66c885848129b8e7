//! Command-line options.

use std::path::PathBuf;

use clap::Parser;

/// Headless squad damage simulator
#[derive(Debug, Parser)]
#[command(name = "burst-sim")]
#[command(about = "Frame-accurate squad damage simulation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Scenario TOML file
    #[arg(short, long)]
    pub scenario: PathBuf,

    /// Random seed; overrides the scenario seed. Drawn at random when
    /// neither is given.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run length in seconds; overrides the scenario duration
    #[arg(long)]
    pub seconds: Option<u32>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Write the full report, including ammo and cooldown traces, as JSON
    #[arg(long, value_name = "PATH")]
    pub trace_out: Option<PathBuf>,

    /// Record every simulation event and replay it through the log
    #[arg(long)]
    pub events: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
