/*
Harmonic Oscillator
===================

Additive synthesis: instead of one waveform, sum a fixed set of sine
partials at integer multiples of the note frequency. The relative strength
of each partial is the timbre.

When you play a note at 261.63 Hz (C4), the partials are:
  1st (fundamental): 261.63 Hz
  2nd harmonic:      523.25 Hz  - one octave up
  3rd harmonic:      784.88 Hz  - octave + fifth
  ... up to the 10th

The Math
--------

    sample(t) = Σ c[k-1] * sin(2π * f * k * t),   k = 1..=N

where c is the coefficient list. The default coefficients come from a
measured piano-like spectrum where the 2nd harmonic is the loudest:

    k   1       2    3       4       5       6       7       8        9       10
    c   0.6882  1    0.9217  0.2318  0.0524  0.1355  0.1797  0.09109  0.0055  0.1127

A frequency of 0.0 makes every sine argument 0, so rests come out as exact
silence with no special case.

Phases are evaluated in f64. With f up to ~4 kHz, k up to 10 and notes
several seconds long, the sine argument gets large enough that f32 would
audibly smear the pitch.
*/

use std::f64::consts::TAU;

/// Sums sine partials with fixed amplitude coefficients.
#[derive(Debug, Clone, Copy)]
pub struct HarmonicOscillator<'a> {
    coefficients: &'a [f64],
}

impl<'a> HarmonicOscillator<'a> {
    /// `coefficients[k - 1]` is the amplitude of harmonic `k`.
    pub fn new(coefficients: &'a [f64]) -> Self {
        Self { coefficients }
    }

    pub fn harmonics(&self) -> usize {
        self.coefficients.len()
    }

    /// Raw additive sample at time `t` for a note of `frequency` Hz.
    #[inline]
    pub fn sample(&self, frequency: f64, t: f64) -> f64 {
        let phase = TAU * frequency * t;
        self.coefficients
            .iter()
            .enumerate()
            .map(|(k, &c)| c * (phase * (k + 1) as f64).sin())
            .sum()
    }

    /// Fill `buffer` with one note, starting one sample after t = 0.
    pub fn render(&self, frequency: f64, buffer: &mut [f32], sample_rate: u32) {
        let sr = sample_rate as f64;
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample = self.sample(frequency, (i + 1) as f64 / sr) as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn single_partial_is_a_sine() {
        let osc = HarmonicOscillator::new(&[1.0]);
        assert_relative_eq!(osc.sample(1.0, 0.25), 1.0, epsilon = 1e-12);
        assert_relative_eq!(osc.sample(1.0, 0.75), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn partials_are_integer_multiples() {
        // Only the 2nd harmonic: 2 Hz sine for a 1 Hz note
        let osc = HarmonicOscillator::new(&[0.0, 1.0]);
        assert_relative_eq!(osc.sample(1.0, 0.125), 1.0, epsilon = 1e-12);
        assert_relative_eq!(osc.sample(1.0, 0.5), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn coefficients_scale_partials() {
        let osc = HarmonicOscillator::new(&[0.5, 0.25]);
        let t = 0.1;
        let expected = 0.5 * (TAU * 3.0 * t).sin() + 0.25 * (TAU * 6.0 * t).sin();
        assert_relative_eq!(osc.sample(3.0, t), expected, epsilon = 1e-12);
    }

    #[test]
    fn zero_frequency_is_silent() {
        let osc = HarmonicOscillator::new(&[0.6882, 1.0, 0.9217]);
        let mut buffer = [1.0f32; 64];
        osc.render(0.0, &mut buffer, 48_000);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn render_starts_one_sample_in() {
        let osc = HarmonicOscillator::new(&[1.0]);
        let mut buffer = [0.0f32; 2];
        // 250 Hz at 1 kHz: first sample at t = 1ms is a quarter period
        osc.render(250.0, &mut buffer, 1_000);
        assert_relative_eq!(buffer[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(buffer[1], 0.0, epsilon = 1e-6);
    }
}
