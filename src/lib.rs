pub mod dsp;
pub mod error;
pub mod io;
pub mod sequencing; // Pitch table, notation and matrices
pub mod synth; // Additive rendering and mixing

use std::path::Path;

use tracing::debug;

pub use error::{ComposerError, Result};
pub use sequencing::{Matrix, MatrixRow, PitchTable, Sheet};
pub use synth::{SynthConfig, Synthesizer, Waveform};

pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Load each file as a track and render the mixed arrangement.
///
/// The first path is the main melody, the rest are accompaniment. Each path
/// may be a notation sheet or a `_matrix` file; sheets go through the matrix
/// cache unless `force_convert` is set.
pub fn render_files<P: AsRef<Path>>(
    paths: &[P],
    table: &PitchTable,
    synth: &Synthesizer,
    force_convert: bool,
) -> Result<Waveform> {
    let Some((melody, accompaniment)) = paths.split_first() else {
        return Err(ComposerError::Configuration(
            "at least one track is required".to_string(),
        ));
    };

    let melody = sequencing::load_or_convert(melody, table, force_convert)?;
    let accompaniment = accompaniment
        .iter()
        .map(|p| sequencing::load_or_convert(p, table, force_convert))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        tracks = 1 + accompaniment.len(),
        sample_rate = synth.sample_rate(),
        "rendering arrangement"
    );
    synth.arrange(&melody, &accompaniment)
}
