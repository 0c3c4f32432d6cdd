//! Renders matrices into waveforms.
//!
//! Notes within a track are laid end to end: row `n` starts on the sample
//! right after row `n - 1` ends, and each row gets
//! `round(seconds * sample_rate)` samples. Every note restarts its own
//! oscillator phase and envelope.
//!
//! Independent tracks share nothing but the config, so [`Synthesizer::arrange`]
//! renders them on the rayon pool and mixes the results in input order.

use rayon::prelude::*;
use tracing::{debug, info};

use super::config::{validate_shape, SynthConfig};
use super::mixer::mix;
use super::waveform::Waveform;
use crate::dsp::{DecayEnvelope, HarmonicOscillator};
use crate::error::{ComposerError, Result};
use crate::sequencing::{Matrix, MatrixRow};

/// Longest track that will be rendered, in samples (about 12 hours at 48 kHz)
pub const MAX_TRACK_FRAMES: usize = i32::MAX as usize;

/// Additive synthesizer bound to one sample rate and timbre.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    config: SynthConfig,
    sample_rate: u32,
}

impl Synthesizer {
    pub fn new(config: SynthConfig, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ComposerError::Configuration(
                "sample rate must be positive".to_string(),
            ));
        }
        config.validate()?;
        Ok(Self {
            config,
            sample_rate,
        })
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples a row occupies.
    pub fn frames(&self, row: &MatrixRow) -> Result<usize> {
        let frames = (row.duration * self.sample_rate as f64).round();
        if frames.is_nan() || frames <= 0.0 {
            return Ok(0);
        }
        if frames > MAX_TRACK_FRAMES as f64 {
            return Err(ComposerError::Configuration(format!(
                "note of {} s at {} Hz is longer than {MAX_TRACK_FRAMES} samples",
                row.duration, self.sample_rate
            )));
        }
        Ok(frames as usize)
    }

    /// Render one track with the given envelope shape.
    pub fn render(&self, track: &Matrix, shape: f64) -> Result<Waveform> {
        validate_shape("decay shape", shape)?;

        let osc = HarmonicOscillator::new(&self.config.harmonics);
        let env = DecayEnvelope::new(shape, self.config.decay_rate);

        let frames = track
            .iter()
            .enumerate()
            .map(|(i, row)| {
                self.frames(row).map_err(|e| match e {
                    ComposerError::Configuration(msg) => {
                        ComposerError::Configuration(format!("row {}: {msg}", i + 1))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let total = frames
            .iter()
            .try_fold(0usize, |acc, &n| {
                acc.checked_add(n).filter(|&t| t <= MAX_TRACK_FRAMES)
            })
            .ok_or_else(|| {
                ComposerError::Configuration(format!(
                    "track of {:.0} s is longer than {MAX_TRACK_FRAMES} samples",
                    track.duration()
                ))
            })?;
        let mut samples = vec![0.0f32; total];

        let mut start = 0;
        for (row, &len) in track.iter().zip(&frames) {
            let end = start + len;
            let block = &mut samples[start..end];
            osc.render(row.frequency, block, self.sample_rate);
            env.apply(block, self.sample_rate);
            start = end;
        }

        debug!(
            rows = track.len(),
            frames = total,
            shape,
            "rendered track"
        );
        Ok(Waveform::new(samples, self.sample_rate))
    }

    /// Render the main melody with the melody envelope.
    pub fn render_melody(&self, track: &Matrix) -> Result<Waveform> {
        self.render(track, self.config.melody_shape)
    }

    /// Render an accompaniment line with the accompaniment envelope.
    pub fn render_accompaniment(&self, track: &Matrix) -> Result<Waveform> {
        self.render(track, self.config.accompaniment_shape)
    }

    /// Render a melody and its accompaniment, then mix and normalize.
    pub fn arrange(&self, melody: &Matrix, accompaniment: &[Matrix]) -> Result<Waveform> {
        let (main, others) = rayon::join(
            || self.render_melody(melody),
            || {
                accompaniment
                    .par_iter()
                    .map(|track| self.render_accompaniment(track))
                    .collect::<Result<Vec<_>>>()
            },
        );
        let (main, others) = (main?, others?);

        let waveform = mix(&main, &others)?;
        info!(
            tracks = 1 + others.len(),
            samples = waveform.len(),
            seconds = waveform.duration(),
            "mixed arrangement"
        );
        Ok(waveform)
    }
}

/// Render `track` at `sample_rate` with the default timbre and `decay_shape`.
pub fn render(track: &Matrix, decay_shape: f64, sample_rate: u32) -> Result<Waveform> {
    Synthesizer::new(SynthConfig::default(), sample_rate)?.render(track, decay_shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::config::HARMONICS;
    use approx::assert_relative_eq;

    fn synth(sample_rate: u32) -> Synthesizer {
        Synthesizer::new(SynthConfig::default(), sample_rate).unwrap()
    }

    fn matrix(rows: &[(f64, f64)]) -> Matrix {
        Matrix::new(rows.iter().map(|&(f, d)| MatrixRow::new(f, d)).collect())
    }

    #[test]
    fn frame_count_is_rounded() {
        let s = synth(1_000);
        assert_eq!(s.frames(&MatrixRow::new(440.0, 1.0)).unwrap(), 1_000);
        assert_eq!(s.frames(&MatrixRow::new(440.0, 0.0014)).unwrap(), 1);
        assert_eq!(s.frames(&MatrixRow::new(440.0, 0.0016)).unwrap(), 2);
        assert_eq!(s.frames(&MatrixRow::new(440.0, 0.0)).unwrap(), 0);
    }

    #[test]
    fn huge_duration_is_rejected() {
        let s = synth(48_000);
        assert!(matches!(
            s.frames(&MatrixRow::new(440.0, 1e300)),
            Err(ComposerError::Configuration(_))
        ));

        let track: Matrix = "440 1\n440 1e300\n".parse().unwrap();
        match s.render_melody(&track) {
            Err(ComposerError::Configuration(msg)) => assert!(msg.starts_with("row 2:")),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn track_total_is_bounded() {
        // Each row fits on its own, together they do not
        let s = synth(48_000);
        let half = (MAX_TRACK_FRAMES / 2 + 1) as f64 / 48_000.0;
        let track = matrix(&[(440.0, half), (220.0, half)]);
        assert!(s.frames(&track.rows[0]).is_ok());
        assert!(matches!(
            s.render_melody(&track),
            Err(ComposerError::Configuration(_))
        ));

        let arranged = s.arrange(&matrix(&[(440.0, 1.0)]), &[track]);
        assert!(matches!(arranged, Err(ComposerError::Configuration(_))));
    }

    #[test]
    fn length_is_sum_of_rows() {
        let wave = synth(1_000)
            .render(&matrix(&[(440.0, 0.5), (0.0, 0.25), (220.0, 0.125)]), 15.0)
            .unwrap();
        assert_eq!(wave.len(), 500 + 250 + 125);
        assert_eq!(wave.sample_rate(), 1_000);
    }

    #[test]
    fn rest_renders_silence() {
        let wave = synth(8_000).render(&matrix(&[(0.0, 0.5)]), 2.0).unwrap();
        assert_eq!(wave.len(), 4_000);
        assert!(wave.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn zero_duration_row_contributes_nothing() {
        let s = synth(1_000);
        let with_empty = s
            .render(&matrix(&[(440.0, 0.1), (330.0, 0.0), (220.0, 0.1)]), 15.0)
            .unwrap();
        let without = s
            .render(&matrix(&[(440.0, 0.1), (220.0, 0.1)]), 15.0)
            .unwrap();
        assert_eq!(with_empty, without);
    }

    #[test]
    fn empty_track_renders_empty_waveform() {
        let wave = synth(1_000).render(&Matrix::default(), 15.0).unwrap();
        assert!(wave.is_empty());
    }

    #[test]
    fn sample_matches_formula() {
        let sample_rate = 4_000;
        let f = 261.63;
        let wave = synth(sample_rate).render(&matrix(&[(f, 0.01)]), 15.0).unwrap();

        for i in [0usize, 7, 39] {
            let t = (i + 1) as f64 / sample_rate as f64;
            let raw: f64 = HARMONICS
                .iter()
                .enumerate()
                .map(|(k, c)| c * (std::f64::consts::TAU * f * (k + 1) as f64 * t).sin())
                .sum();
            let expected = raw * t.powf(1.0 / 15.0) * (-2.0 * t).exp();
            assert_relative_eq!(wave.samples()[i], expected as f32, epsilon = 1e-5);
        }
    }

    #[test]
    fn each_note_restarts_its_envelope() {
        let s = synth(1_000);
        let single = s.render(&matrix(&[(330.0, 0.05)]), 2.0).unwrap();
        let pair = s
            .render(&matrix(&[(440.0, 0.05), (330.0, 0.05)]), 2.0)
            .unwrap();
        assert_eq!(&pair.samples()[50..], single.samples());
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(matches!(
            Synthesizer::new(SynthConfig::default(), 0),
            Err(ComposerError::Configuration(_))
        ));
        assert!(matches!(
            synth(1_000).render(&matrix(&[(440.0, 1.0)]), 0.0),
            Err(ComposerError::Configuration(_))
        ));
        assert!(render(&matrix(&[(440.0, 1.0)]), -3.0, 1_000).is_err());
    }

    #[test]
    fn arrange_normalizes_and_keeps_longest_length() {
        let s = synth(1_000);
        let melody = matrix(&[(523.25, 0.3)]);
        let bass = vec![matrix(&[(130.81, 0.5)]), matrix(&[(0.0, 0.1)])];
        let wave = s.arrange(&melody, &bass).unwrap();
        assert_eq!(wave.len(), 500);
        assert_eq!(wave.peak(), 1.0);
    }

    #[test]
    fn arrange_uses_shape_policy() {
        let s = synth(1_000);
        let melody = matrix(&[(440.0, 0.2)]);
        let accompaniment = matrix(&[(220.0, 0.2)]);

        let mixed = s.arrange(&melody, &[accompaniment.clone()]).unwrap();

        let mut expected = s.render(&melody, 15.0).unwrap().into_samples();
        let slow = s.render(&accompaniment, 2.0).unwrap();
        crate::dsp::mix::sum_in_place(&mut expected, slow.samples());
        crate::dsp::mix::normalize_peak(&mut expected).unwrap();
        assert_eq!(mixed.samples(), expected.as_slice());
    }

    #[test]
    fn arrange_all_rests_is_silent_mix() {
        let s = synth(1_000);
        let result = s.arrange(&matrix(&[(0.0, 1.0)]), &[matrix(&[(0.0, 2.0)])]);
        assert!(matches!(result, Err(ComposerError::SilentMix)));
    }
}
