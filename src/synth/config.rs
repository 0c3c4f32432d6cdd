//! Timbre and envelope settings for the synthesizer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ComposerError, Result};

/// Default harmonic amplitudes, `HARMONICS[k - 1]` for harmonic `k`
pub const HARMONICS: [f64; 10] = [
    0.6882, 1.0, 0.9217, 0.2318, 0.0524, 0.1355, 0.1797, 0.09109, 0.0055, 0.1127,
];

/// Envelope shape for the main melody: sharp attack, quick fall
pub const MELODY_SHAPE: f64 = 15.0;

/// Envelope shape for accompaniment lines: slow attack, sustained
pub const ACCOMPANIMENT_SHAPE: f64 = 2.0;

/// Exponential decay rate of every note envelope
pub const DECAY_RATE: f64 = 2.0;

/// Everything that decides how a track sounds, independent of what it plays.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    /// Amplitude of each harmonic, fundamental first
    pub harmonics: Vec<f64>,
    /// Envelope shape used for the first (main) track
    pub melody_shape: f64,
    /// Envelope shape used for every other track
    pub accompaniment_shape: f64,
    /// Exponential decay rate of the envelope
    pub decay_rate: f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            harmonics: HARMONICS.to_vec(),
            melody_shape: MELODY_SHAPE,
            accompaniment_shape: ACCOMPANIMENT_SHAPE,
            decay_rate: DECAY_RATE,
        }
    }
}

impl SynthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.harmonics.is_empty() {
            return Err(ComposerError::Configuration(
                "at least one harmonic is required".to_string(),
            ));
        }
        if let Some(c) = self.harmonics.iter().find(|c| !c.is_finite()) {
            return Err(ComposerError::Configuration(format!(
                "harmonic coefficient {c} is not finite"
            )));
        }
        validate_shape("melody_shape", self.melody_shape)?;
        validate_shape("accompaniment_shape", self.accompaniment_shape)?;
        if !(self.decay_rate.is_finite() && self.decay_rate >= 0.0) {
            return Err(ComposerError::Configuration(format!(
                "decay_rate must be non-negative, got {}",
                self.decay_rate
            )));
        }
        Ok(())
    }

    /// Load a config from a JSON file. Missing fields keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| ComposerError::Configuration(format!("invalid timbre file: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn validate_shape(name: &str, shape: f64) -> Result<()> {
    if shape.is_finite() && shape > 0.0 {
        Ok(())
    } else {
        Err(ComposerError::Configuration(format!(
            "{name} must be positive, got {shape}"
        )))
    }
}
