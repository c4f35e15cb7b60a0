//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Class schedule statistics.
///
/// Reads an ICS calendar with a university class schedule and summarises
/// session types, remote vs on-campus classes and time spent.
#[derive(Debug, Parser)]
#[command(name = "schedstat", version, about, long_about = None)]
pub struct Cli {
    /// Path to the ICS file with the class schedule.
    pub ics_file: PathBuf,

    /// Show a detailed report (instructors, rooms, campus schedule).
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Classify events in parallel.
    #[arg(long)]
    pub parallel: bool,

    /// Enable debug logging on stderr.
    #[arg(long)]
    pub debug: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
