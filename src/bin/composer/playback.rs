//! Live playback on the default output device

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};

use composer::Waveform;

/// Play `waveform` on the default device. The stream keeps running, silent
/// once the waveform ends, until Enter is pressed.
///
/// The stream is opened as f32 at the waveform's sample rate with no
/// resampling, so `--fs` has to be a rate the device accepts.
pub fn play(waveform: Waveform) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let default = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let channels = default.channels() as usize;
    let config = cpal::StreamConfig {
        channels: default.channels(),
        sample_rate: cpal::SampleRate(waveform.sample_rate()),
        buffer_size: cpal::BufferSize::Default,
    };

    let samples = waveform.into_samples();
    let mut position = 0;

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _| {
                // Mono to all channels, silence once the waveform ends
                for frame in data.chunks_mut(channels) {
                    let sample = samples.get(position).copied().unwrap_or(0.0);
                    frame.fill(sample);
                    position += 1;
                }
            },
            |err| tracing::error!(%err, "audio stream error"),
            None,
        )
        .wrap_err_with(|| {
            format!(
                "failed to open a {} Hz f32 output stream on {} (device default is {} Hz); \
                 pass a matching --fs or use --save",
                config.sample_rate.0,
                device.name().unwrap_or_else(|_| "the default device".to_string()),
                default.sample_rate().0,
            )
        })?;

    stream.play()?;

    println!("Playing... press Enter to stop (silence after the last note)");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(())
}
