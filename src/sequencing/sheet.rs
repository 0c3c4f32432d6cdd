/*
Notation Sheets
===============

A sheet is a small hand-written text file. The first line is a header, every
following line holds whitespace-separated note tokens.

    (C4,4)
    # twinkle twinkle
    1:4 1:4 5:4 5:4
    6,6:4 5:8

Header
------

  (root,R)    `root` is the key that degree 1 maps to. Leave it empty to
              write absolute key names (C4, B3b, ...) instead of degrees.
              `R` is the reference unit: raw durations are divided by it
              to get seconds.

Tokens
------

  tone:duration         a single note
  tone,tone,...:dur     shorthand for several consecutive notes that share
                        one duration (NOT a chord)

A tone is "0" for a rest, an absolute key name, or a degree 1-7 followed by
octave markers: `^` up one octave, `_` down one octave.

Blank lines and lines starting with `#` are skipped. Any malformed header or
token rejects the whole sheet.
*/

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::error::{ComposerError, ParseErrorKind, Result};

/// Header line of a sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetHeader {
    /// Key that degree 1 maps to. None means the sheet uses absolute key names.
    pub root: Option<String>,
    /// Raw durations are divided by this to get seconds
    pub reference_unit: f64,
}

impl SheetHeader {
    pub fn is_numbered(&self) -> bool {
        self.root.is_some()
    }
}

/// A single note as written: tone token and raw duration
#[derive(Debug, Clone, PartialEq)]
pub struct SheetEvent {
    pub tone: String,
    pub raw_duration: f64,
}

impl SheetEvent {
    pub fn new(tone: impl Into<String>, raw_duration: f64) -> Self {
        Self {
            tone: tone.into(),
            raw_duration,
        }
    }
}

/// A parsed sheet: header plus events in playing order
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub header: SheetHeader,
    pub events: Vec<SheetEvent>,
}

impl Sheet {
    /// Read and parse a sheet file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let sheet = parse(&text)?;
        debug!(
            path = %path.display(),
            events = sheet.events.len(),
            numbered = sheet.header.is_numbered(),
            "parsed sheet"
        );
        Ok(sheet)
    }
}

impl FromStr for Sheet {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "({},{})",
            self.header.root.as_deref().unwrap_or(""),
            self.header.reference_unit
        )?;
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}", event.tone, event.raw_duration)?;
        }
        writeln!(f)
    }
}

/// Parse sheet text into a header and a flat list of events.
pub fn parse(text: &str) -> Result<Sheet> {
    let mut lines = text.lines();
    let meta = lines
        .next()
        .ok_or_else(|| ComposerError::parse(1, ParseErrorKind::MissingHeader))?;
    let header = parse_header(meta)?;

    let mut events = Vec::new();
    for (offset, line) in lines.enumerate() {
        // Header is line 1
        let line_no = offset + 2;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        for token in line.split_whitespace() {
            parse_token(token, line_no, &mut events)?;
        }
    }

    Ok(Sheet { header, events })
}

fn parse_header(meta: &str) -> Result<SheetHeader> {
    let meta = meta.trim();
    let malformed = || ComposerError::parse(1, ParseErrorKind::MalformedHeader(meta.to_string()));

    let inner = meta
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(malformed)?;
    let (root, unit) = inner.split_once(',').ok_or_else(malformed)?;
    if unit.contains(',') {
        return Err(malformed());
    }

    let unit = unit.trim();
    let reference_unit = unit
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite())
        .ok_or_else(|| {
            ComposerError::parse(1, ParseErrorKind::InvalidReferenceUnit(unit.to_string()))
        })?;

    let root = root.trim();
    Ok(SheetHeader {
        root: (!root.is_empty()).then(|| root.to_string()),
        reference_unit,
    })
}

fn parse_token(token: &str, line: usize, events: &mut Vec<SheetEvent>) -> Result<()> {
    let (tones, duration) = token.rsplit_once(':').ok_or_else(|| {
        ComposerError::parse(line, ParseErrorKind::MissingSeparator(token.to_string()))
    })?;

    let raw_duration = duration
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| {
            ComposerError::parse(line, ParseErrorKind::InvalidDuration(duration.to_string()))
        })?;

    for tone in tones.split(',') {
        if tone.is_empty() {
            return Err(ComposerError::parse(
                line,
                ParseErrorKind::EmptyTone(token.to_string()),
            ));
        }
        events.push(SheetEvent::new(tone, raw_duration));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_kind(text: &str) -> (usize, ParseErrorKind) {
        match parse(text) {
            Err(ComposerError::Parse { line, kind }) => (line, kind),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_header() {
        let sheet = parse("(C4,4)\n").unwrap();
        assert_eq!(sheet.header.root.as_deref(), Some("C4"));
        assert_eq!(sheet.header.reference_unit, 4.0);
        assert!(sheet.events.is_empty());
    }

    #[test]
    fn test_empty_root_means_absolute() {
        let sheet = parse("(,2.5)\nC4:1").unwrap();
        assert_eq!(sheet.header.root, None);
        assert!(!sheet.header.is_numbered());
        assert_eq!(sheet.header.reference_unit, 2.5);
    }

    #[test]
    fn test_parse_tokens() {
        let sheet = parse("(C4,4)\n1:4 0:4 5:4").unwrap();
        assert_eq!(
            sheet.events,
            vec![
                SheetEvent::new("1", 4.0),
                SheetEvent::new("0", 4.0),
                SheetEvent::new("5", 4.0),
            ]
        );
    }

    #[test]
    fn test_comma_group_is_sequential() {
        let sheet = parse("(C4,4)\n1,3,5^:2 6_:8").unwrap();
        assert_eq!(
            sheet.events,
            vec![
                SheetEvent::new("1", 2.0),
                SheetEvent::new("3", 2.0),
                SheetEvent::new("5^", 2.0),
                SheetEvent::new("6_", 8.0),
            ]
        );
    }

    #[test]
    fn test_empty_lines_and_comments() {
        let text = "(,4)\n\n# intro\n   \nC4:4\n  # indented comment\nD4:2  E4:2\n";
        let sheet = parse(text).unwrap();
        assert_eq!(sheet.events.len(), 3);
        assert_eq!(sheet.events[2], SheetEvent::new("E4", 2.0));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(parse_kind(""), (1, ParseErrorKind::MissingHeader));
    }

    #[test]
    fn test_malformed_header() {
        assert!(matches!(
            parse_kind("(C4 4)\n1:4"),
            (1, ParseErrorKind::MalformedHeader(_))
        ));
        assert!(matches!(
            parse_kind("C4,4\n1:4"),
            (1, ParseErrorKind::MalformedHeader(_))
        ));
        assert!(matches!(
            parse_kind("(C4,4,1)\n1:4"),
            (1, ParseErrorKind::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_non_numeric_reference_unit() {
        assert_eq!(
            parse_kind("(C4,four)\n1:4"),
            (1, ParseErrorKind::InvalidReferenceUnit("four".to_string()))
        );
    }

    #[test]
    fn test_missing_separator() {
        assert_eq!(
            parse_kind("(C4,4)\n1:4\n5 6:4"),
            (3, ParseErrorKind::MissingSeparator("5".to_string()))
        );
    }

    #[test]
    fn test_invalid_duration() {
        assert_eq!(
            parse_kind("(C4,4)\n1:x"),
            (2, ParseErrorKind::InvalidDuration("x".to_string()))
        );
        assert_eq!(
            parse_kind("(C4,4)\n1:-2"),
            (2, ParseErrorKind::InvalidDuration("-2".to_string()))
        );
    }

    #[test]
    fn test_empty_tone() {
        assert_eq!(
            parse_kind("(C4,4)\n1,,2:4"),
            (2, ParseErrorKind::EmptyTone("1,,2:4".to_string()))
        );
    }

    #[test]
    fn test_error_aborts_whole_sheet() {
        // A good line before the bad one does not yield a partial result
        assert!(parse("(C4,4)\n1:4 2:4\n3:oops").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let sheet = parse("(C4,4)\n1,2:4 0:2.5\n5^:8").unwrap();
        let reparsed = parse(&sheet.to_string()).unwrap();
        assert_eq!(reparsed, sheet);
    }
}
