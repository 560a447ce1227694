//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Scene file (.json, .yaml or .yml)
    #[arg(short, long)]
    pub scenes: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the play command
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Scene file (.json, .yaml or .yml)
    #[arg(short, long)]
    pub scenes: PathBuf,

    /// Start position on the global timeline (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(long)]
    pub seek: Option<String>,

    /// Simulated frame interval in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Stop after this many simulated seconds
    #[arg(long, default_value_t = 600.0)]
    pub max_seconds: f64,
}

/// Arguments for the trim command
#[derive(Args, Debug)]
pub struct TrimArgs {
    /// Scene file (.json, .yaml or .yml)
    #[arg(short, long)]
    pub scenes: PathBuf,

    /// Segment id to trim
    #[arg(long)]
    pub segment: String,

    /// Boundary to move (start or end)
    #[arg(long)]
    pub handle: String,

    /// Proposed source time for the boundary
    #[arg(long)]
    pub to: String,

    /// Trim store file
    #[arg(long)]
    pub store: Option<PathBuf>,
}
