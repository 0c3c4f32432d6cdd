//! Matrix-to-waveform synthesis: per-track rendering and mixing.

pub mod config;
pub mod mixer;
pub mod synthesizer;
pub mod waveform;

pub use config::SynthConfig;
pub use mixer::mix;
pub use synthesizer::{render, Synthesizer};
pub use waveform::Waveform;
