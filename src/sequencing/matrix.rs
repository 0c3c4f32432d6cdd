//! Matrix: the persisted `(frequency, seconds)` form of a track.
//!
//! A matrix file is plain text with one row per note:
//!
//! ```text
//! 261.6255653005986 1
//! 0 1
//! 391.99543598174927 1
//! ```
//!
//! Lines starting with `#` are comments. It sits between notation and
//! synthesis. Once a sheet has been converted, the matrix is written next to
//! it as `<sheet>_matrix` with a `# a4 <Hz>` tuning line on top, and reused
//! until the sheet or the tuning changes.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::keyboard::PitchTable;
use super::sheet::Sheet;
use super::transpose::{Note, Pitch};
use crate::error::{ComposerError, Result};

/// Suffix appended to a sheet path to name its matrix file
pub const MATRIX_SUFFIX: &str = "_matrix";

/// First line of a cached matrix, followed by the A4 it was tuned to
const TUNING_TAG: &str = "# a4";

/// One note ready for synthesis
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixRow {
    /// Pitch in Hz, 0.0 for a rest
    pub frequency: f64,
    /// Length in seconds
    pub duration: f64,
}

impl MatrixRow {
    pub fn new(frequency: f64, duration: f64) -> Self {
        Self {
            frequency,
            duration,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.frequency == 0.0
    }
}

/// An ordered list of rows: one melodic line
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix {
    pub rows: Vec<MatrixRow>,
}

impl Matrix {
    pub fn new(rows: Vec<MatrixRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatrixRow> {
        self.rows.iter()
    }

    /// Total length of the track in seconds
    pub fn duration(&self) -> f64 {
        self.rows.iter().map(|r| r.duration).sum()
    }

    /// Read a matrix file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        text.parse()
    }
}

impl<'a> IntoIterator for &'a Matrix {
    type Item = &'a MatrixRow;
    type IntoIter = std::slice::Iter<'a, MatrixRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{} {}", row.frequency, row.duration)?;
        }
        Ok(())
    }
}

impl FromStr for Matrix {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for (i, line) in s.lines().enumerate() {
            let line_no = i + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            let [frequency, duration] = fields.as_slice() else {
                return Err(ComposerError::Matrix {
                    line: line_no,
                    reason: format!("expected 2 fields, found {}", fields.len()),
                });
            };

            rows.push(MatrixRow::new(
                parse_field(frequency, line_no)?,
                parse_field(duration, line_no)?,
            ));
        }
        Ok(Self { rows })
    }
}

fn parse_field(field: &str, line: usize) -> Result<f64> {
    field
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| ComposerError::Matrix {
            line,
            reason: format!("`{field}` is not a non-negative number"),
        })
}

/// Convert transposed notes into matrix rows.
///
/// Each raw duration is divided by `reference_unit` to get seconds.
pub fn to_matrix(notes: &[Note], reference_unit: f64, table: &PitchTable) -> Result<Matrix> {
    if !(reference_unit.is_finite() && reference_unit > 0.0) {
        return Err(ComposerError::Configuration(format!(
            "reference unit must be positive, got {reference_unit}"
        )));
    }

    let rows = notes
        .iter()
        .map(|note| -> Result<MatrixRow> {
            let frequency = match note.pitch {
                Pitch::Rest => 0.0,
                Pitch::Key(name) => table
                    .frequency(name)
                    .ok_or_else(|| ComposerError::UnknownKey(name.to_string()))?,
            };
            Ok(MatrixRow::new(frequency, note.raw_duration / reference_unit))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Matrix::new(rows))
}

impl Sheet {
    /// Parse-to-matrix in one step: transpose, then serialize.
    pub fn to_matrix(&self, table: &PitchTable) -> Result<Matrix> {
        let notes = self.transpose(table)?;
        to_matrix(&notes, self.header.reference_unit, table)
    }
}

/// Path of the matrix file that caches `sheet`.
pub fn matrix_path(sheet: impl AsRef<Path>) -> PathBuf {
    let mut path = sheet.as_ref().as_os_str().to_owned();
    path.push(MATRIX_SUFFIX);
    PathBuf::from(path)
}

/// True when `path` names a matrix file rather than a sheet.
pub fn is_matrix_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(MATRIX_SUFFIX))
}

/// Convert a sheet file and write its matrix next to it.
///
/// Returns the path of the written matrix file.
pub fn convert_file(sheet: impl AsRef<Path>, table: &PitchTable) -> Result<PathBuf> {
    let sheet = sheet.as_ref();
    let (path, _) = convert_and_save(sheet, table)?;
    Ok(path)
}

/// Load the matrix for `path`, converting the sheet only when needed.
///
/// Matrix files are loaded as-is. For a sheet, an existing `<sheet>_matrix`
/// is reused unless `force` is set, as long as it is at least as new as the
/// sheet and was tuned to the same A4 as `table`.
pub fn load_or_convert(path: impl AsRef<Path>, table: &PitchTable, force: bool) -> Result<Matrix> {
    let path = path.as_ref();
    if is_matrix_path(path) {
        debug!(path = %path.display(), "loading matrix file");
        return Matrix::load(path);
    }

    let cached = matrix_path(path);
    if !force && is_fresh(path, &cached) && cached_tuning(&cached) == Some(table.a4()) {
        info!(matrix = %cached.display(), "using cached matrix");
        return Matrix::load(&cached);
    }

    let (_, matrix) = convert_and_save(path, table)?;
    Ok(matrix)
}

fn convert_and_save(sheet: &Path, table: &PitchTable) -> Result<(PathBuf, Matrix)> {
    let matrix = Sheet::from_file(sheet)?.to_matrix(table)?;
    let path = matrix_path(sheet);
    fs::write(&path, format!("{TUNING_TAG} {}\n{matrix}", table.a4()))?;
    info!(
        matrix = %path.display(),
        rows = matrix.len(),
        seconds = matrix.duration(),
        a4 = table.a4(),
        "wrote matrix"
    );
    Ok((path, matrix))
}

fn is_fresh(sheet: &Path, matrix: &Path) -> bool {
    let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
    match (modified(sheet), modified(matrix)) {
        (Some(sheet), Some(matrix)) => matrix >= sheet,
        _ => false,
    }
}

/// A4 recorded on the first line of a cached matrix, if any.
fn cached_tuning(matrix: &Path) -> Option<f64> {
    let text = fs::read_to_string(matrix).ok()?;
    text.lines()
        .next()?
        .strip_prefix(TUNING_TAG)?
        .trim()
        .parse()
        .ok()
}
