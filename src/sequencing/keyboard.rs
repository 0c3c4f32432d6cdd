/*
Keyboard Pitch Table
====================

An 88-key piano (A0 to C8) tuned in twelve-tone equal temperament, plus one
extra slot at index 0 that stands for silence. The table is the single
source of truth for turning key names into frequencies and for walking
the keyboard by semitones.

Naming Convention:
- Natural notes: C4, D4, E4, etc.
- Flats: the flat marker follows the octave, D4b = D-flat 4. The
  letter-first spelling Db4 names the same key.
- Sharps are not used; every black key is written as the flat above it

Index Layout:
- 0        silence ("0"), frequency 0.0
- 1..=3    A0, B0b, B0
- 4..=87   C1 through B7, twelve keys per octave
- 88       C8

The formula: frequency(i) = A4 * 2^((i - 49) / 12), where index 49 is A4.

Example usage:
  let table = PitchTable::standard();
  table.frequency("A4")   // Some(440.0)
  table.index_of("C4")    // Some(40)
*/

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{ComposerError, Result};

/// Number of slots in the table (88 keys plus the silence slot)
pub const KEY_COUNT: usize = 89;

/// Index of A4, the tuning reference
pub const A4_INDEX: usize = 49;

/// Name of the silence slot
pub const REST: &str = "0";

/// Default tuning reference in Hz
pub const DEFAULT_A4: f64 = 440.0;

/// Key names in keyboard order
#[rustfmt::skip]
pub const KEY_NAMES: [&str; KEY_COUNT] = [
    REST,
    "A0", "B0b", "B0",
    // Octave 1
    "C1", "D1b", "D1", "E1b", "E1", "F1", "G1b", "G1", "A1b", "A1", "B1b", "B1",
    // Octave 2
    "C2", "D2b", "D2", "E2b", "E2", "F2", "G2b", "G2", "A2b", "A2", "B2b", "B2",
    // Octave 3
    "C3", "D3b", "D3", "E3b", "E3", "F3", "G3b", "G3", "A3b", "A3", "B3b", "B3",
    // Octave 4 (Middle C octave)
    "C4", "D4b", "D4", "E4b", "E4", "F4", "G4b", "G4", "A4b", "A4", "B4b", "B4",
    // Octave 5
    "C5", "D5b", "D5", "E5b", "E5", "F5", "G5b", "G5", "A5b", "A5", "B5b", "B5",
    // Octave 6
    "C6", "D6b", "D6", "E6b", "E6", "F6", "G6b", "G6", "A6b", "A6", "B6b", "B6",
    // Octave 7
    "C7", "D7b", "D7", "E7b", "E7", "F7", "G7b", "G7", "A7b", "A7", "B7b", "B7",
    "C8",
];

/// Letter-first spelling of every key (`Db4` for `D4b`), accepted on lookup
#[rustfmt::skip]
const LETTER_FIRST_NAMES: [&str; KEY_COUNT] = [
    REST,
    "A0", "Bb0", "B0",
    "C1", "Db1", "D1", "Eb1", "E1", "F1", "Gb1", "G1", "Ab1", "A1", "Bb1", "B1",
    "C2", "Db2", "D2", "Eb2", "E2", "F2", "Gb2", "G2", "Ab2", "A2", "Bb2", "B2",
    "C3", "Db3", "D3", "Eb3", "E3", "F3", "Gb3", "G3", "Ab3", "A3", "Bb3", "B3",
    "C4", "Db4", "D4", "Eb4", "E4", "F4", "Gb4", "G4", "Ab4", "A4", "Bb4", "B4",
    "C5", "Db5", "D5", "Eb5", "E5", "F5", "Gb5", "G5", "Ab5", "A5", "Bb5", "B5",
    "C6", "Db6", "D6", "Eb6", "E6", "F6", "Gb6", "G6", "Ab6", "A6", "Bb6", "B6",
    "C7", "Db7", "D7", "Eb7", "E7", "F7", "Gb7", "G7", "Ab7", "A7", "Bb7", "B7",
    "C8",
];

/// Frequencies of every key, plus a name to index lookup built once.
#[derive(Debug, Clone)]
pub struct PitchTable {
    a4: f64,
    frequencies: [f64; KEY_COUNT],
    index: HashMap<&'static str, usize>,
}

impl PitchTable {
    /// Build a table tuned to `a4` Hz.
    pub fn new(a4: f64) -> Result<Self> {
        if !a4.is_finite() || a4 <= 0.0 {
            return Err(ComposerError::Configuration(format!(
                "A4 reference must be a positive frequency, got {a4}"
            )));
        }
        Ok(Self::build(a4))
    }

    fn build(a4: f64) -> Self {
        let mut frequencies = [0.0; KEY_COUNT];
        for (i, freq) in frequencies.iter_mut().enumerate().skip(1) {
            *freq = a4 * 2.0_f64.powf((i as f64 - A4_INDEX as f64) / 12.0);
        }

        let index = KEY_NAMES
            .iter()
            .enumerate()
            .chain(LETTER_FIRST_NAMES.iter().enumerate())
            .map(|(i, &name)| (name, i))
            .collect();

        Self {
            a4,
            frequencies,
            index,
        }
    }

    /// The shared A4 = 440 Hz table.
    pub fn standard() -> &'static PitchTable {
        static STANDARD: OnceLock<PitchTable> = OnceLock::new();
        STANDARD.get_or_init(|| Self::build(DEFAULT_A4))
    }

    pub fn a4(&self) -> f64 {
        self.a4
    }

    pub fn len(&self) -> usize {
        KEY_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Key names in keyboard order, silence first
    pub fn names(&self) -> &'static [&'static str] {
        &KEY_NAMES
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// `name` as a key on this table, keeping the spelling it was given in.
    pub fn key(&self, name: &str) -> Option<&'static str> {
        self.index.get_key_value(name).map(|(&key, _)| key)
    }

    pub fn name(&self, index: usize) -> Option<&'static str> {
        KEY_NAMES.get(index).copied()
    }

    pub fn frequency(&self, name: &str) -> Option<f64> {
        self.index_of(name).map(|i| self.frequencies[i])
    }

    /// Iterate over `(name, frequency)` in keyboard order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        KEY_NAMES.iter().copied().zip(self.frequencies.iter().copied())
    }
}
