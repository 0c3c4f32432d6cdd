/*
Decay Envelope
==============

Every note is shaped by a single curve: a fast rise followed by an
exponential fall. There is no gate and no sustain stage; the curve only
depends on the time since the note started.

Vocabulary
----------

  t           Seconds since the note began. Sampling starts one sample in,
              t = (i + 1) / sample_rate, so the first sample is never at 0.

  shape       Root exponent of the attack. The rise is t^(1/shape): a large
              shape jumps to full level almost at once, a small shape climbs
              slowly.

  decay_rate  Speed of the exponential fall, exp(-decay_rate * t).


The Shape
---------

    level(t) = t^(1/shape) * exp(-decay_rate * t)

  Level
        │  ╭─╮                       shape = 15  (melody)
        │ ╭╯  ╲___
        │╭╯       ╲_____
        ││              ╲________
    0.0 └┴─────────────────────────→ t

        │      ╭────╮                shape = 2   (accompaniment)
        │   ╭──╯     ╲____
        │ ╭─╯             ╲______
    0.0 └─┴────────────────────────→ t

The peak sits where the derivative is zero:

    d/dt level = level * (1 / (shape * t) - decay_rate) = 0
    t_peak = 1 / (shape * decay_rate)

With decay_rate = 2: a shape of 15 peaks after 33ms, a shape of 2 after
250ms. Melody lines use the fast one so repeated notes stay distinct,
accompaniment uses the slow one for a softer, sustained bed.

Levels are computed in f64: t^(1/shape) near t = 0 is sensitive and the
result is multiplied straight into the audio buffer.
*/

/// Attack-then-decay amplitude curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayEnvelope {
    shape: f64,
    decay_rate: f64,
}

impl DecayEnvelope {
    /// `shape` must be positive; callers validate it.
    pub fn new(shape: f64, decay_rate: f64) -> Self {
        Self { shape, decay_rate }
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    /// Envelope level `t` seconds into a note.
    #[inline]
    pub fn level(&self, t: f64) -> f64 {
        t.powf(1.0 / self.shape) * (-self.decay_rate * t).exp()
    }

    /// Time in seconds at which the envelope peaks.
    pub fn peak_time(&self) -> f64 {
        1.0 / (self.shape * self.decay_rate)
    }

    /// Fill `buffer` with envelope levels, one per sample.
    pub fn render(&self, buffer: &mut [f32], sample_rate: u32) {
        let sr = sample_rate as f64;
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample = self.level((i + 1) as f64 / sr) as f32;
        }
    }

    /// Multiply `buffer` in place by the envelope.
    pub fn apply(&self, buffer: &mut [f32], sample_rate: u32) {
        let sr = sample_rate as f64;
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample = (*sample as f64 * self.level((i + 1) as f64 / sr)) as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE_RATE: u32 = 1_000;

    #[test]
    fn level_matches_formula() {
        let env = DecayEnvelope::new(15.0, 2.0);
        let t: f64 = 0.25;
        assert_relative_eq!(
            env.level(t),
            t.powf(1.0 / 15.0) * (-2.0 * t).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn first_sample_is_not_zero() {
        let env = DecayEnvelope::new(2.0, 2.0);
        let mut buffer = [0.0f32; 4];
        env.render(&mut buffer, SAMPLE_RATE);
        assert!(buffer[0] > 0.0);
        assert_relative_eq!(buffer[0], env.level(0.001) as f32);
    }

    #[test]
    fn rises_then_falls() {
        let env = DecayEnvelope::new(2.0, 2.0);
        let mut buffer = vec![0.0f32; 2_000];
        env.render(&mut buffer, SAMPLE_RATE);

        let peak_index = (env.peak_time() * SAMPLE_RATE as f64) as usize - 1;
        assert!(buffer[..peak_index].windows(2).all(|w| w[0] <= w[1]));
        assert!(buffer[peak_index + 1..].windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn larger_shape_peaks_earlier() {
        let melody = DecayEnvelope::new(15.0, 2.0);
        let accompaniment = DecayEnvelope::new(2.0, 2.0);
        assert!(melody.peak_time() < accompaniment.peak_time());
        assert_relative_eq!(accompaniment.peak_time(), 0.25);
    }

    #[test]
    fn apply_scales_signal() {
        let env = DecayEnvelope::new(15.0, 2.0);
        let mut signal = [1.0f32, -1.0, 0.5];
        env.apply(&mut signal, SAMPLE_RATE);
        assert_relative_eq!(signal[0], env.level(0.001) as f32);
        assert_relative_eq!(signal[1], -env.level(0.002) as f32);
        assert_relative_eq!(signal[2], 0.5 * env.level(0.003) as f32, epsilon = 1e-7);
    }
}
