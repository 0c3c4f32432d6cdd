//! Pipeline driver: sheets in, WAV file or speakers out

use color_eyre::eyre::{Result as EyreResult, WrapErr};

use composer::io::write_wav;
use composer::sequencing::matrix::convert_file;
use composer::{PitchTable, SynthConfig, Synthesizer, Waveform};

use super::cli::Cli;

pub fn run(cli: Cli) -> EyreResult<()> {
    let table = PitchTable::new(cli.a4).wrap_err("invalid --a4")?;

    if cli.matrix_only {
        for file in &cli.files {
            let path = convert_file(file, &table)
                .wrap_err_with(|| format!("failed to convert {}", file.display()))?;
            println!("{}", path.display());
        }
        return Ok(());
    }

    let config = match &cli.timbre {
        Some(path) => SynthConfig::from_json_file(path)
            .wrap_err_with(|| format!("failed to load timbre {}", path.display()))?,
        None => SynthConfig::default(),
    };
    let synth = Synthesizer::new(config, cli.fs).wrap_err("invalid synthesizer settings")?;

    println!("=== Composer ===");
    println!("Sample rate: {} Hz", cli.fs);
    for (i, file) in cli.files.iter().enumerate() {
        let role = if i == 0 { "melody" } else { "accompaniment" };
        println!("  Track: {} ({})", file.display(), role);
    }

    let waveform = composer::render_files(&cli.files, &table, &synth, cli.no_cache)
        .wrap_err("failed to render")?;
    println!("Duration: {:.2} s", waveform.duration());

    match &cli.save {
        Some(path) => {
            write_wav(path, &waveform)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            println!("Saved to {}", path.display());
            Ok(())
        }
        None => play(waveform),
    }
}

#[cfg(feature = "playback")]
fn play(waveform: Waveform) -> EyreResult<()> {
    super::playback::play(waveform)
}

#[cfg(not(feature = "playback"))]
fn play(_waveform: Waveform) -> EyreResult<()> {
    Err(color_eyre::eyre::eyre!(
        "built without the `playback` feature; use --save <WAV> to write a file"
    ))
}
