//! # Harmonic Analysis Module
//!
//! Reduces a set of pitches to a chord name.
//!
//! ## Steps
//! 1. Sort the pitches by chromatic index; the lowest is the bass.
//! 2. Collect the distinct intervals above the bass (mod 12). While there are
//!    more than four, drop notes from the top and collect again.
//! 3. Look the intervals up in the quality tables.
//! 4. Resolve inversion markers to a root tone.
//! 5. Join root, quality and bass into the final name.

use std::fmt;
use std::str::FromStr;

use super::pitch::Pitch;
use super::quality::{self, InversionMarker, ERROR_QUALITY, NO_THIRD};
use crate::error::PitchParseError;

/// Most distinct pitch classes a chord is named from.
pub const MAX_CHORD_TONES: usize = 4;

/// A named chord built from the pitches detected in one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    /// Notes left after reduction, ascending by chromatic index.
    notes: Vec<Pitch>,
    /// Number of pitches the chord was built from, before reduction.
    raw_note_count: usize,
    quality: String,
    name: String,
}

impl Chord {
    /// Builds and names a chord. Pitches may be given in any order.
    pub fn new(mut notes: Vec<Pitch>) -> Self {
        notes.sort_by_key(Pitch::chromatic_index);
        let raw_note_count = notes.len();

        if notes.is_empty() {
            return Self {
                notes,
                raw_note_count,
                quality: String::new(),
                name: String::new(),
            };
        }

        let intervals = reduce(&mut notes);
        let quality = determine_quality(&notes, &intervals, raw_note_count);
        let name = determine_name(&notes[0], &quality);

        Self {
            notes,
            raw_note_count,
            quality,
            name,
        }
    }

    /// Builds a chord from pitch names such as `"C3"`, `"Eb4"`.
    pub fn from_names<I, S>(names: I) -> Result<Self, PitchParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let notes = names
            .into_iter()
            .map(|name| name.as_ref().parse::<Pitch>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(notes))
    }

    /// Lowest note, or `None` for an empty chord.
    pub fn bass(&self) -> Option<&Pitch> {
        self.notes.first()
    }

    /// Notes kept after reduction, lowest first.
    pub fn notes(&self) -> &[Pitch] {
        &self.notes
    }

    pub fn raw_note_count(&self) -> usize {
        self.raw_note_count
    }

    pub fn quality(&self) -> &str {
        &self.quality
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct intervals above the bass, ascending.
    pub fn intervals(&self) -> Vec<u8> {
        unique_intervals(&self.notes)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for Chord {
    type Err = PitchParseError;

    /// Parses a comma or whitespace separated list of pitch names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_names(
            s.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|part| !part.is_empty()),
        )
    }
}

/// Distinct intervals (mod 12) of `notes` above `notes[0]`, sorted ascending.
/// Always contains 0 for a non-empty slice.
pub fn unique_intervals(notes: &[Pitch]) -> Vec<u8> {
    let Some(bass) = notes.first() else {
        return Vec::new();
    };
    let mut intervals: Vec<u8> = Vec::with_capacity(MAX_CHORD_TONES + 1);
    for note in notes {
        let interval = note.interval_above(bass);
        if !intervals.contains(&interval) {
            intervals.push(interval);
        }
    }
    intervals.sort_unstable();
    intervals
}

/// Truncates `notes` (sorted, bass first) from the top until at most
/// [`MAX_CHORD_TONES`] distinct intervals remain, and returns them.
///
/// Each round drops as many notes as there are excess intervals. The bass is
/// never dropped since a single note always has one interval.
pub fn reduce(notes: &mut Vec<Pitch>) -> Vec<u8> {
    loop {
        let intervals = unique_intervals(notes);
        if intervals.len() <= MAX_CHORD_TONES {
            return intervals;
        }
        let excess = intervals.len() - MAX_CHORD_TONES;
        notes.truncate(notes.len() - excess);
    }
}

fn determine_quality(notes: &[Pitch], intervals: &[u8], raw_note_count: usize) -> String {
    match *intervals {
        [] => String::new(),
        [_] => {
            if notes.len() > 1 {
                " octave".to_string()
            } else {
                " note".to_string()
            }
        }
        [_, distance] => quality::interval_quality(distance).to_string(),
        [_, lower, upper] => resolve_marker(notes, quality::triad_quality(lower, upper)),
        [a, b, c, d] => {
            let resolved = resolve_marker(notes, quality::tetrad_quality([a, b, c, d]));
            if raw_note_count > MAX_CHORD_TONES {
                strip_no_third(&resolved)
            } else {
                resolved
            }
        }
        _ => {
            log::warn!("Unreduced interval set {:?}", intervals);
            ERROR_QUALITY.to_string()
        }
    }
}

fn resolve_marker(notes: &[Pitch], quality: &str) -> String {
    if quality == ERROR_QUALITY {
        log::warn!(
            "No chord quality for notes [{}]",
            notes.iter().map(Pitch::to_string).collect::<Vec<_>>().join(", ")
        );
    }
    match InversionMarker::parse(quality) {
        Some(marker) => resolve_inversion(notes, marker),
        None => quality.to_string(),
    }
}

/// Finds the root named by `marker` and returns `"<root><remainder>"`.
///
/// The root is the first note, scanning upward from the bass, whose interval
/// above the bass equals the marker offset.
pub fn resolve_inversion(notes: &[Pitch], marker: InversionMarker<'_>) -> String {
    let Some(bass) = notes.first() else {
        return ERROR_QUALITY.to_string();
    };
    match notes.iter().find(|note| note.interval_above(bass) == marker.offset) {
        Some(root) => format!("{}{}", root.tone(), marker.remainder),
        None => {
            log::warn!(
                "No note {} semitones above bass {} to use as root",
                marker.offset,
                bass
            );
            ERROR_QUALITY.to_string()
        }
    }
}

/// Removes a `" (no 3)"` qualifier, keeping a trailing slash if present.
fn strip_no_third(quality: &str) -> String {
    match quality.find(NO_THIRD) {
        Some(pos) => {
            let mut stripped = quality[..pos].to_string();
            if quality.ends_with('/') {
                stripped.push('/');
            }
            stripped
        }
        None => quality.to_string(),
    }
}

/// Slash qualities already carry their root (`"C7/"`) and get the bass
/// appended; everything else is prefixed by the bass tone.
fn determine_name(bass: &Pitch, quality: &str) -> String {
    if quality.ends_with('/') {
        format!("{}{}", quality, bass.tone())
    } else {
        format!("{}{}", bass.tone(), quality)
    }
}
