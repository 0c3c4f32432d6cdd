//! Low-level DSP primitives used by the synthesizer.
//!
//! These components only do the signal math: one note's partials, one
//! note's envelope, and buffer-level summing. Track layout and mixing policy
//! live in [`crate::synth`].

/// Attack-then-decay envelope shared by every note.
pub mod envelope;
/// Sample-wise summing and peak normalization.
pub mod mix;
/// Additive oscillator built from weighted harmonics.
pub mod oscillator;

pub use envelope::DecayEnvelope;
pub use oscillator::HarmonicOscillator;
