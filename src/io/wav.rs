//! WAV export using hound
//!
//! Waveforms are written as mono 32-bit float so normalized samples land in
//! the file unchanged.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use crate::error::Result;
use crate::synth::Waveform;

fn spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    }
}

/// Write `waveform` to `path` as a mono float WAV file.
pub fn write_wav(path: impl AsRef<Path>, waveform: &Waveform) -> Result<()> {
    let path = path.as_ref();
    let mut writer = WavWriter::create(path, spec(waveform.sample_rate()))?;
    for &sample in waveform.samples() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    info!(
        path = %path.display(),
        samples = waveform.len(),
        sample_rate = waveform.sample_rate(),
        "wrote wav"
    );
    Ok(())
}
