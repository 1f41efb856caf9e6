//! # Pitch Module
//!
//! Discrete musical pitches on the piano-style chromatic scale, where A0 is
//! index 0 and C8 is index 87.
//!
//! A `Tone` keeps the spelling it was created with (`Bb` stays `Bb`), since
//! chord names are built from the spelling of the notes they contain.

use std::fmt;
use std::str::FromStr;

use crate::error::PitchParseError;

/// One of the twelve pitch classes, including the enharmonic spellings
/// accepted in pitch names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    C,
    CSharp,
    DFlat,
    D,
    DSharp,
    EFlat,
    E,
    F,
    FSharp,
    GFlat,
    G,
    GSharp,
    AFlat,
    A,
    ASharp,
    BFlat,
    B,
}

impl Tone {
    /// Sharp spellings in chromatic order starting at C. This is the spelling
    /// produced by frequency quantization.
    pub const SHARPS: [Tone; 12] = [
        Tone::C,
        Tone::CSharp,
        Tone::D,
        Tone::DSharp,
        Tone::E,
        Tone::F,
        Tone::FSharp,
        Tone::G,
        Tone::GSharp,
        Tone::A,
        Tone::ASharp,
        Tone::B,
    ];

    /// Semitones above C within an octave (C = 0, A = 9, B = 11).
    pub const fn offset(self) -> u8 {
        match self {
            Tone::C => 0,
            Tone::CSharp | Tone::DFlat => 1,
            Tone::D => 2,
            Tone::DSharp | Tone::EFlat => 3,
            Tone::E => 4,
            Tone::F => 5,
            Tone::FSharp | Tone::GFlat => 6,
            Tone::G => 7,
            Tone::GSharp | Tone::AFlat => 8,
            Tone::A => 9,
            Tone::ASharp | Tone::BFlat => 10,
            Tone::B => 11,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Tone::C => "C",
            Tone::CSharp => "C#",
            Tone::DFlat => "Db",
            Tone::D => "D",
            Tone::DSharp => "D#",
            Tone::EFlat => "Eb",
            Tone::E => "E",
            Tone::F => "F",
            Tone::FSharp => "F#",
            Tone::GFlat => "Gb",
            Tone::G => "G",
            Tone::GSharp => "G#",
            Tone::AFlat => "Ab",
            Tone::A => "A",
            Tone::ASharp => "A#",
            Tone::BFlat => "Bb",
            Tone::B => "B",
        }
    }

    /// Looks up a tone by its spelling, returning `None` if it is not recognized.
    pub fn try_from_name(name: &str) -> Option<Tone> {
        let tone = match name {
            "C" => Tone::C,
            "C#" => Tone::CSharp,
            "Db" => Tone::DFlat,
            "D" => Tone::D,
            "D#" => Tone::DSharp,
            "Eb" => Tone::EFlat,
            "E" => Tone::E,
            "F" => Tone::F,
            "F#" => Tone::FSharp,
            "Gb" => Tone::GFlat,
            "G" => Tone::G,
            "G#" => Tone::GSharp,
            "Ab" => Tone::AFlat,
            "A" => Tone::A,
            "A#" => Tone::ASharp,
            "Bb" => Tone::BFlat,
            "B" => Tone::B,
            _ => return None,
        };
        Some(tone)
    }

    /// Looks up a tone by its spelling. Unrecognized spellings fall back to C.
    pub fn from_name(name: &str) -> Tone {
        Self::try_from_name(name).unwrap_or_else(|| {
            log::debug!("Unrecognized tone '{}', treating it as C", name);
            Tone::C
        })
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single note: a tone in a given octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    tone: Tone,
    octave: u32,
}

impl Pitch {
    pub const fn new(tone: Tone, octave: u32) -> Self {
        Self { tone, octave }
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn octave(&self) -> u32 {
        self.octave
    }

    /// Semitones above A0. Octaves start at C, so A0, A#0 and B0 are the only
    /// notes of octave 0 with a non-negative index.
    pub fn chromatic_index(&self) -> i32 {
        self.octave as i32 * 12 + self.tone.offset() as i32 - 9
    }

    /// Interval above `bass` reduced to a single octave (0..12).
    pub fn interval_above(&self, bass: &Pitch) -> u8 {
        (self.chromatic_index() - bass.chromatic_index()).rem_euclid(12) as u8
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.tone, self.octave)
    }
}

impl FromStr for Pitch {
    type Err = PitchParseError;

    /// Parses names in the `"A0"`, `"Bb3"`, `"A#3"` format: everything but the
    /// last character is the tone, the last character is the octave.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PitchParseError::Empty);
        }
        let char_count = name.chars().count();
        if !(2..=3).contains(&char_count) {
            return Err(PitchParseError::InvalidLength { name: name.to_string() });
        }

        let (split, octave_char) = name
            .char_indices()
            .last()
            .ok_or(PitchParseError::Empty)?;
        let octave = octave_char
            .to_digit(10)
            .ok_or_else(|| PitchParseError::InvalidOctave { name: name.to_string() })?;
        let tone_part = &name[..split];

        Ok(Pitch::new(Tone::from_name(tone_part), octave))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piano_range_anchors() {
        assert_eq!(Pitch::new(Tone::A, 0).chromatic_index(), 0);
        assert_eq!(Pitch::new(Tone::C, 8).chromatic_index(), 87);
        assert_eq!(Pitch::new(Tone::A, 4).chromatic_index(), 48);
    }

    #[test]
    fn chromatic_index_is_strictly_increasing() {
        let mut previous = None;
        for octave in 0..=8 {
            for tone in Tone::SHARPS {
                let index = Pitch::new(tone, octave).chromatic_index();
                if let Some(prev) = previous {
                    assert!(index > prev, "{}{} did not increase", tone, octave);
                }
                previous = Some(index);
            }
        }
    }

    #[test]
    fn enharmonic_spellings_share_an_index() {
        let sharp: Pitch = "A#3".parse().unwrap();
        let flat: Pitch = "Bb3".parse().unwrap();
        assert_eq!(sharp.chromatic_index(), flat.chromatic_index());
        assert_eq!(flat.tone().as_str(), "Bb");
        assert_eq!(flat.to_string(), "Bb3");
    }

    #[test]
    fn parses_pitch_names() {
        let a0: Pitch = "A0".parse().unwrap();
        assert_eq!(a0, Pitch::new(Tone::A, 0));
        let cs4: Pitch = "C#4".parse().unwrap();
        assert_eq!(cs4.tone(), Tone::CSharp);
        assert_eq!(cs4.octave(), 4);
    }

    #[test]
    fn unknown_tone_falls_back_to_c() {
        let pitch: Pitch = "H3".parse().unwrap();
        assert_eq!(pitch.tone(), Tone::C);
        assert_eq!(pitch.chromatic_index(), Pitch::new(Tone::C, 3).chromatic_index());
    }

    #[test]
    fn rejects_malformed_names() {
        assert_eq!("".parse::<Pitch>(), Err(PitchParseError::Empty));
        assert!(matches!("C".parse::<Pitch>(), Err(PitchParseError::InvalidLength { .. })));
        assert!(matches!("C#10".parse::<Pitch>(), Err(PitchParseError::InvalidLength { .. })));
        assert!(matches!("Cx".parse::<Pitch>(), Err(PitchParseError::InvalidOctave { .. })));
    }

    #[test]
    fn interval_above_wraps_octaves() {
        let bass: Pitch = "E3".parse().unwrap();
        let upper: Pitch = "C4".parse().unwrap();
        let same: Pitch = "E5".parse().unwrap();
        assert_eq!(upper.interval_above(&bass), 8);
        assert_eq!(same.interval_above(&bass), 0);
    }
}
