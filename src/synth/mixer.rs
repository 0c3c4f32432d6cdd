//! Track mixer: sums rendered tracks and normalizes the result.

use crate::dsp::mix::{normalize_peak, sum_in_place};
use crate::error::{ComposerError, Result};

use super::waveform::Waveform;

/// Sum `main` with every accompaniment waveform and normalize to peak 1.0.
///
/// The mix is as long as the longest input; shorter tracks are silent past
/// their end. All inputs must share one sample rate. A mix with no non-zero
/// sample fails with [`ComposerError::SilentMix`].
pub fn mix(main: &Waveform, accompaniment: &[Waveform]) -> Result<Waveform> {
    let sample_rate = main.sample_rate();
    if let Some(other) = accompaniment
        .iter()
        .find(|w| w.sample_rate() != sample_rate)
    {
        return Err(ComposerError::Configuration(format!(
            "cannot mix {} Hz and {} Hz tracks",
            sample_rate,
            other.sample_rate()
        )));
    }

    let len = accompaniment
        .iter()
        .map(Waveform::len)
        .fold(main.len(), usize::max);
    let mut samples = Vec::with_capacity(len);

    sum_in_place(&mut samples, main.samples());
    for track in accompaniment {
        sum_in_place(&mut samples, track.samples());
    }
    normalize_peak(&mut samples)?;

    Ok(Waveform::new(samples, sample_rate))
}
