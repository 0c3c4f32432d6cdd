/*
Degree Transposition
====================

Numbered notation writes notes as scale degrees of a movable root instead of
fixed key names. With root C4:

    degree    1   2   3   4   5   6   7
    semitone  0   2   4   5   7   9   11     (major scale intervals)
    key       C4  D4  E4  F4  G4  A4  B4

Octave markers follow the digit and apply left to right:

    1^  = C5      1_  = C3      5^^ = G6      3^_ = E4

Transposition walks the keyboard by index: root index + interval, then +/-12
per marker. Landing outside the 88 keys is an error, not a clamp.

The reverse direction (absolute keys back to degrees) only works for keys in
the root's major scale; accidentals have no degree in this notation.
*/

use std::fmt;

use tracing::debug;

use super::keyboard::{PitchTable, KEY_COUNT, REST};
use super::sheet::{Sheet, SheetEvent, SheetHeader};
use crate::error::{ComposerError, Result};

/// Semitone offset of each major-scale degree from the root
pub const MAJOR_SCALE: [i64; 7] = [0, 2, 4, 5, 7, 9, 11];

const OCTAVE: i64 = 12;

/// A resolved tone: silence or a key on the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pitch {
    Rest,
    Key(&'static str),
}

impl Pitch {
    pub fn name(&self) -> &'static str {
        match self {
            Pitch::Rest => REST,
            Pitch::Key(name) => name,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Pitch::Rest)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An event after transposition: absolute pitch plus raw duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub pitch: Pitch,
    pub raw_duration: f64,
}

impl Note {
    pub fn new(pitch: Pitch, raw_duration: f64) -> Self {
        Self {
            pitch,
            raw_duration,
        }
    }
}

impl Sheet {
    /// Resolve every event of this sheet to an absolute pitch.
    pub fn transpose(&self, table: &PitchTable) -> Result<Vec<Note>> {
        transpose(&self.header, &self.events, table)
    }
}

/// Resolve sheet events to absolute pitches.
///
/// Sheets without a root already use key names and only get looked up.
/// Numbered sheets are shifted from the root by degree and octave markers.
pub fn transpose(
    header: &SheetHeader,
    events: &[SheetEvent],
    table: &PitchTable,
) -> Result<Vec<Note>> {
    let notes = match header.root.as_deref() {
        None => events
            .iter()
            .map(|e| -> Result<Note> {
                Ok(Note::new(resolve_key(&e.tone, table)?, e.raw_duration))
            })
            .collect::<Result<Vec<_>>>()?,
        Some(root) => {
            let root_index = root_index(root, table)?;
            events
                .iter()
                .map(|e| -> Result<Note> {
                    let pitch = resolve_degree(&e.tone, root_index, table)?;
                    Ok(Note::new(pitch, e.raw_duration))
                })
                .collect::<Result<Vec<_>>>()?
        }
    };

    debug!(root = ?header.root, notes = notes.len(), "transposed sheet");
    Ok(notes)
}

/// Convert absolute notes back into numbered notation relative to `root`.
pub fn to_degrees(notes: &[Note], root: &str, table: &PitchTable) -> Result<Vec<SheetEvent>> {
    let root_index = root_index(root, table)? as i64;

    notes
        .iter()
        .map(|note| -> Result<SheetEvent> {
            let tone = match note.pitch {
                Pitch::Rest => REST.to_string(),
                Pitch::Key(name) => {
                    let index = table
                        .index_of(name)
                        .ok_or_else(|| ComposerError::UnknownKey(name.to_string()))?
                        as i64;
                    let offset = index - root_index;
                    let semitone = offset.rem_euclid(OCTAVE);
                    let degree = MAJOR_SCALE
                        .iter()
                        .position(|&s| s == semitone)
                        .ok_or_else(|| ComposerError::NotInScale {
                            key: name.to_string(),
                            root: root.to_string(),
                        })?;
                    degree_token(degree as i64 + 1, offset.div_euclid(OCTAVE))
                }
            };
            Ok(SheetEvent::new(tone, note.raw_duration))
        })
        .collect()
}

/// Move every numbered tone by `steps` scale degrees, carrying into octaves.
///
/// `-2` relabels a major-key melody so that its 6th degree becomes the 1st of
/// the relative minor. Rests pass through.
pub fn shift_degrees(events: &[SheetEvent], steps: i64) -> Result<Vec<SheetEvent>> {
    events
        .iter()
        .map(|event| -> Result<SheetEvent> {
            if event.tone == REST {
                return Ok(event.clone());
            }
            let (degree, octave) = split_degree(&event.tone)?;
            let position = (degree - 1) + 7 * octave + steps;
            let tone = degree_token(position.rem_euclid(7) + 1, position.div_euclid(7));
            Ok(SheetEvent::new(tone, event.raw_duration))
        })
        .collect()
}

fn root_index(root: &str, table: &PitchTable) -> Result<usize> {
    table
        .index_of(root)
        .filter(|&i| i > 0)
        .ok_or_else(|| ComposerError::UnknownRoot(root.to_string()))
}

fn resolve_key(tone: &str, table: &PitchTable) -> Result<Pitch> {
    if tone == REST {
        return Ok(Pitch::Rest);
    }
    table
        .key(tone)
        .map(Pitch::Key)
        .ok_or_else(|| ComposerError::UnknownKey(tone.to_string()))
}

fn resolve_degree(tone: &str, root_index: usize, table: &PitchTable) -> Result<Pitch> {
    if tone == REST {
        return Ok(Pitch::Rest);
    }

    let (degree, octave) = split_degree(tone)?;
    let index = root_index as i64 + MAJOR_SCALE[(degree - 1) as usize] + OCTAVE * octave;

    // Index 0 is the silence slot, not a key
    if index < 1 || index >= KEY_COUNT as i64 {
        return Err(ComposerError::PitchOutOfRange {
            token: tone.to_string(),
            index,
        });
    }

    table
        .name(index as usize)
        .map(Pitch::Key)
        .ok_or_else(|| ComposerError::PitchOutOfRange {
            token: tone.to_string(),
            index,
        })
}

/// Split a numbered token into its degree (1-7) and net octave shift.
fn split_degree(tone: &str) -> Result<(i64, i64)> {
    let mut chars = tone.chars();
    let degree = chars
        .next()
        .and_then(|c| c.to_digit(10))
        .filter(|d| (1..=7).contains(d))
        .ok_or_else(|| ComposerError::InvalidDegree(tone.to_string()))?;

    let mut octave = 0;
    for marker in chars {
        match marker {
            '_' => octave -= 1,
            '^' => octave += 1,
            other => {
                return Err(ComposerError::InvalidOctaveMarker {
                    token: tone.to_string(),
                    marker: other,
                })
            }
        }
    }

    Ok((degree as i64, octave))
}

fn degree_token(degree: i64, octave: i64) -> String {
    let marker = if octave < 0 { "_" } else { "^" };
    format!("{degree}{}", marker.repeat(octave.unsigned_abs() as usize))
}
