//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

/// Build a music signal from notation sheets. Plays it by default, or saves
/// it to a WAV file.
#[derive(Parser, Debug)]
#[command(name = "composer", version, about)]
pub struct Cli {
    /// Sheet or matrix files (main melody first)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Sample rate in Hz
    #[arg(long, default_value_t = composer::DEFAULT_SAMPLE_RATE)]
    pub fs: u32,

    /// Tuning reference for A4 in Hz
    #[arg(long, default_value_t = composer::sequencing::keyboard::DEFAULT_A4)]
    pub a4: f64,

    /// Save to this WAV file instead of playing
    #[arg(long, value_name = "WAV")]
    pub save: Option<PathBuf>,

    /// JSON file overriding harmonics and envelope shapes
    #[arg(long, value_name = "JSON")]
    pub timbre: Option<PathBuf>,

    /// Regenerate matrix files even when a cached one is up to date
    #[arg(long)]
    pub no_cache: bool,

    /// Only convert sheets to matrix files, do not render
    #[arg(long, conflicts_with_all = ["save", "timbre"])]
    pub matrix_only: bool,

    /// Log every stage of the pipeline
    #[arg(short, long)]
    pub verbose: bool,
}
