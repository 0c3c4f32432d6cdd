//! composer - render numbered-notation sheets to audio
//!
//! Run with: cargo run -- sheets/twinkle sheets/twinkle_bass --save twinkle.wav

mod app;
mod cli;
#[cfg(feature = "playback")]
mod playback;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    app::run(cli)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
