//! Summing and peak normalization primitives.

/*
Summing Tracks
==============

Tracks are mixed by plain addition: every track plays at full level and the
result is rescaled once at the end. No weights, no crossfade.

Vocabulary
----------

  summing       Adding signals sample by sample. The result can leave the
                [-1.0, +1.0] range.

  overlap       Tracks rarely have the same length. Summing runs over the
                overlap; past the end of a shorter track it contributes
                silence, so the mix is as long as the longest track.

                    melody:   [ 0.2,  0.4, -0.1]
                    bass:     [ 0.5, -0.5]
                    mix:      [ 0.7, -0.1, -0.1]

  peak          The largest absolute sample value in a signal.

  normalize     Divide every sample by the peak so the loudest sample lands
                exactly on ±1.0. Quiet passages scale up by the same factor,
                so relative levels are preserved.


Normalization
-------------

    output[i] = input[i] / max(|input|)

The peak sample becomes x / |x|, which is exactly ±1.0 in floating point.

An all-zero signal has no peak to divide by. That is reported as an error
instead of producing NaNs.
*/

use crate::error::{ComposerError, Result};

/// Add `b` into `a` sample by sample.
///
/// `a` grows with zeros when `b` is longer, so the result always covers
/// both signals.
///
/// ⚠️ WARNING: Can exceed [-1.0, +1.0] range!
#[inline]
pub fn sum_in_place(a: &mut Vec<f32>, b: &[f32]) {
    if b.len() > a.len() {
        a.resize(b.len(), 0.0);
    }

    for (sa, &sb) in a.iter_mut().zip(b.iter()) {
        *sa += sb;
    }
}

/// Largest absolute sample value, 0.0 for an empty signal.
#[inline]
pub fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0f32, |max, &s| max.max(s.abs()))
}

/// Scale `signal` in place so its peak absolute value is exactly 1.0.
pub fn normalize_peak(signal: &mut [f32]) -> Result<()> {
    let peak = peak(signal);
    if peak == 0.0 || !peak.is_finite() {
        return Err(ComposerError::SilentMix);
    }

    for sample in signal.iter_mut() {
        *sample /= peak;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_equal_lengths() {
        let mut a = vec![1.0, 0.5, -0.5];
        sum_in_place(&mut a, &[0.5, 0.5, 0.5]);
        assert_eq!(a, vec![1.5, 1.0, 0.0]);
    }

    #[test]
    fn test_sum_longer_signal_extends() {
        let mut a = vec![0.5, -0.5];
        sum_in_place(&mut a, &[0.25, 0.25, 0.25, 0.25]);
        assert_eq!(a, vec![0.75, -0.25, 0.25, 0.25]);
    }

    #[test]
    fn test_sum_shorter_signal_leaves_tail() {
        let mut a = vec![0.5, 0.5, 0.5];
        sum_in_place(&mut a, &[1.0]);
        assert_eq!(a, vec![1.5, 0.5, 0.5]);
    }

    #[test]
    fn test_sum_can_exceed_one() {
        let mut a = vec![1.0, 0.5];
        sum_in_place(&mut a, &[1.0, 0.8]);
        assert_eq!(a[0], 2.0); // Exceeds 1.0!
        assert_eq!(a[1], 1.3);
    }

    #[test]
    fn test_peak() {
        assert_eq!(peak(&[0.1, -0.8, 0.5]), 0.8);
        assert_eq!(peak(&[]), 0.0);
    }

    #[test]
    fn test_normalize_hits_exactly_one() {
        let mut signal = [0.3, -0.7, 0.1];
        normalize_peak(&mut signal).unwrap();
        assert_eq!(peak(&signal), 1.0);
        assert_eq!(signal[1], -1.0);
    }

    #[test]
    fn test_normalize_boosts_quiet_signal() {
        let mut signal = [0.01, -0.02];
        normalize_peak(&mut signal).unwrap();
        assert_eq!(signal, [0.5, -1.0]);
    }

    #[test]
    fn test_normalize_silence_is_error() {
        let mut signal = [0.0; 8];
        assert!(matches!(
            normalize_peak(&mut signal),
            Err(ComposerError::SilentMix)
        ));
        assert!(matches!(
            normalize_peak(&mut []),
            Err(ComposerError::SilentMix)
        ));
    }
}
