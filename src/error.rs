//! Error types shared by every stage of the sheet-to-waveform pipeline.

use std::io;
use thiserror::Error;

/// What went wrong while reading a notation sheet.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("sheet is empty, expected a `(root,R)` header")]
    MissingHeader,

    #[error("malformed header `{0}`, expected `(root,R)`")]
    MalformedHeader(String),

    #[error("reference unit `{0}` is not a number")]
    InvalidReferenceUnit(String),

    #[error("token `{0}` has no `:` duration separator")]
    MissingSeparator(String),

    #[error("duration `{0}` is not a non-negative number")]
    InvalidDuration(String),

    #[error("token `{0}` contains an empty tone")]
    EmptyTone(String),
}

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum ComposerError {
    /// Malformed notation text. The whole sheet is rejected.
    #[error("parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },

    /// Header root is not a key on the keyboard
    #[error("root key `{0}` is not on the keyboard")]
    UnknownRoot(String),

    /// Absolute key name is not on the keyboard
    #[error("key `{0}` is not on the keyboard")]
    UnknownKey(String),

    /// Numbered token that does not start with a degree `1..7`
    #[error("tone `{0}` does not start with a scale degree 1-7")]
    InvalidDegree(String),

    #[error("tone `{token}` has invalid octave marker `{marker}`")]
    InvalidOctaveMarker { token: String, marker: char },

    /// Transposition landed outside the keyboard
    #[error("tone `{token}` resolves to key index {index}, outside the keyboard")]
    PitchOutOfRange { token: String, index: i64 },

    /// Key that has no degree in the requested root's major scale
    #[error("key `{key}` is not in the major scale of `{root}`")]
    NotInScale { key: String, root: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    /// Normalization of a mix that has no non-zero sample
    #[error("cannot normalize a silent mix")]
    SilentMix,

    /// Malformed row in a persisted matrix file
    #[error("matrix row {line}: {reason}")]
    Matrix { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("WAV encoding error: {0}")]
    Wav(#[from] hound::Error),
}

impl ComposerError {
    pub(crate) fn parse(line: usize, kind: ParseErrorKind) -> Self {
        ComposerError::Parse { line, kind }
    }
}

/// Result type for composer operations
pub type Result<T> = std::result::Result<T, ComposerError>;
