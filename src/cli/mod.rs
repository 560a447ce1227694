//! CLI module for sceneplay
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// Segment playback and trim tool
///
/// Plays a multi-segment composition through a simulated media pipeline,
/// reports its timeline and applies constrained trims.
#[derive(Parser, Debug)]
#[command(name = "sceneplay")]
#[command(about = "sceneplay - Segment playback, voice-over sync and trimming")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file (defaults to ./sceneplay.toml when present)
    #[arg(long, global = true, env = "SCENEPLAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the global timeline of a scene file
    Inspect(args::InspectArgs),
    /// Play a scene file through the simulated media pipeline
    Play(args::PlayArgs),
    /// Drag one segment boundary and persist the clamped result
    Trim(args::TrimArgs),
}

impl Commands {
    /// Tick interval override, for commands that drive playback
    pub fn tick_ms(&self) -> Option<u64> {
        match self {
            Commands::Play(args) => args.tick_ms,
            Commands::Inspect(_) | Commands::Trim(_) => None,
        }
    }
}
