//! Command-line argument definitions for the bimsplit CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, export overrides, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the bimsplit tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input model file
    #[arg(help = "Path to the input model file")]
    pub input: String,

    /// Directory receiving per-category GLB files, manifests and statistics
    #[arg(short, long, default_value = "out")]
    pub output_dir: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the configured decimation ratio (0 < ratio <= 1)
    #[arg(long)]
    pub decimation_ratio: Option<f32>,

    /// Override the configured compression level (0 disables)
    #[arg(long)]
    pub compression_level: Option<u32>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
