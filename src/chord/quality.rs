//! # Chord Quality Tables
//!
//! Lookup tables mapping reduced interval sets to chord quality tokens.
//!
//! Intervals are semitones above the bass note, reduced to one octave. A token
//! is either a plain quality (`"m7"`, `"sus4"`, `""` for major) or an
//! inversion marker `"+<offset><quality>/"`, meaning the real root lies
//! `offset` semitones above the bass and the chord is written as a slash
//! chord over the bass. Lookups that miss return [`ERROR_QUALITY`].

/// Returned when an interval combination has no table entry.
pub const ERROR_QUALITY: &str = "Error";

/// Qualifier for voicings without a third.
pub const NO_THIRD: &str = " (no 3)";

/// Two distinct pitch classes, indexed by `distance - 1`.
const INTERVAL_QUALITIES: [&str; 11] = [
    "addb9",
    "2",
    "m",
    "",
    "sus4",
    " tritone",
    "5",
    "5# (no 3)",
    "6 (no 3)",
    "7 (no 3)",
    "maj7 (no 3)",
];

/// Three distinct pitch classes, keyed by the two upper intervals.
const TRIAD_QUALITIES: [((u8, u8), &str); 55] = [
    ((1, 2), "2b9"),
    ((1, 3), "mb9"),
    ((1, 4), "addb9"),
    ((1, 5), "+1maj7/"),
    ((1, 6), "b5b9"),
    ((1, 7), "5b9"),
    ((1, 8), "+1maj7 (no 3)/"),
    ((1, 9), "6b9 (no 3)"),
    ((1, 10), "7b9 (no 3)"),
    ((1, 11), "maj7b9 (no 3)"),
    ((2, 3), "m2"),
    ((2, 4), "add2"),
    ((2, 5), "2sus4"),
    ((2, 6), "+27/"),
    ((2, 7), "2"),
    ((2, 8), "2#5"),
    ((2, 9), "6/9 (no 3)"),
    ((2, 10), "9 (no 3)"),
    ((2, 11), "maj9 (no 3)"),
    ((3, 4), "add#9"),
    ((3, 5), "msus4"),
    ((3, 6), "dim"),
    ((3, 7), "m"),
    ((3, 8), "+8/"),
    ((3, 9), "m6"),
    ((3, 10), "m7"),
    ((3, 11), "m(maj7)"),
    ((4, 5), "add4"),
    ((4, 6), "majb5"),
    ((4, 7), ""),
    ((4, 8), "aug"),
    ((4, 9), "+9m/"),
    ((4, 10), "7"),
    ((4, 11), "maj7"),
    ((5, 6), "sus4b5"),
    ((5, 7), "sus4"),
    ((5, 8), "+5m/"),
    ((5, 9), "+5/"),
    ((5, 10), "7sus4"),
    ((5, 11), "maj7sus4"),
    ((6, 7), "5add#11"),
    ((6, 8), "+87/"),
    ((6, 9), "+6dim/"),
    ((6, 10), "7b5 (no 3)"),
    ((6, 11), "maj7b5 (no 3)"),
    ((7, 8), "+8maj7/"),
    ((7, 9), "6 (no 3)"),
    ((7, 10), "7 (no 3)"),
    ((7, 11), "maj7 (no 3)"),
    ((8, 9), "6#5 (no 3)"),
    ((8, 10), "7#5 (no 3)"),
    ((8, 11), "maj7#5 (no 3)"),
    ((9, 10), "13 (no 3)"),
    ((9, 11), "maj13 (no 3)"),
    ((10, 11), "7maj7 (no 3)"),
];

/// Upper-triad name -> (correction to the bass-to-triad interval, family).
///
/// The triads of a family are inversions of one another. Shifting the
/// interval by the correction makes it measure the distance from the bass to
/// the same triad note, so one family table covers every inversion.
const TETRAD_GROUPING: [(&str, i8, usize); 55] = [
    ("7maj7 (no 3)", -2, 0),
    ("maj7b9 (no 3)", -1, 0),
    ("2b9", 0, 0),
    ("13 (no 3)", -3, 1),
    ("maj9 (no 3)", -1, 1),
    ("mb9", 0, 1),
    ("6#5 (no 3)", -4, 2),
    ("m(maj7)", -1, 2),
    ("addb9", 0, 2),
    ("+8maj7/", -4, 3),
    ("maj7", 0, 3),
    ("+1maj7/", 1, 3),
    ("5add#11", -6, 4),
    ("maj7sus4", -1, 4),
    ("b5b9", 0, 4),
    ("sus4b5", -7, 5),
    ("maj7b5 (no 3)", -1, 5),
    ("5b9", 0, 5),
    ("add4", -7, 6),
    ("maj7 (no 3)", 0, 6),
    ("+1maj7 (no 3)/", 1, 6),
    ("add#9", -9, 7),
    ("maj7#5 (no 3)", -1, 7),
    ("6b9 (no 3)", 0, 7),
    ("m2", -10, 8),
    ("maj13 (no 3)", -1, 8),
    ("7b9 (no 3)", 0, 8),
    ("7#5 (no 3)", -4, 9),
    ("9 (no 3)", -2, 9),
    ("add2", 0, 9),
    ("6 (no 3)", -5, 10),
    ("m7", -2, 10),
    ("2sus4", 0, 10),
    ("+87/", -6, 11),
    ("7", -2, 11),
    ("+27/", 0, 11),
    ("sus4", -7, 12),
    ("7sus4", -2, 12),
    ("2", 0, 12),
    ("majb5", -8, 13),
    ("7b5 (no 3)", -2, 13),
    ("2#5", 0, 13),
    ("msus4", -9, 14),
    ("7 (no 3)", -2, 14),
    ("6/9 (no 3)", 0, 14),
    ("+6dim/", -6, 15),
    ("m6", -3, 15),
    ("dim", 0, 15),
    ("+5m/", -7, 16),
    ("+9m/", -3, 16),
    ("m", 0, 16),
    ("", 0, 17),
    ("+5/", 5, 17),
    ("+8/", 8, 17),
    ("aug", 0, 18),
];

/// Four-note qualities per family, keyed by the corrected interval.
const TETRAD_FAMILIES: [&[(u8, &str)]; 19] = [
    &[
        (1, "m2b9"),
        (2, "add2#9"),
        (3, "add4#9"),
        (4, "add4b5"),
        (5, "sus4#11"),
        (6, "5#11b13"),
        (7, "6b13 (no 3)"),
        (8, "13#5 (no 3)"),
        (9, "13maj7 (no 3)"),
    ],
    &[
        (1, "add2b9"),
        (2, "m2sus4"),
        (3, "m2b5"),
        (4, "add4"),
        (5, "+5m7/"),
        (6, "6#11 (no 3)"),
        (7, "7b13 (no 3)"),
        (8, "maj13#5 (no 3)"),
        (10, "7maj7b9 (no 3)"),
    ],
    &[
        (1, "2sus4b9"),
        (2, "m2b5"),
        (3, "add#9"),
        (4, "+5m(maj7)/"),
        (5, "+5addb9/"),
        (6, "7#11 (no 3)"),
        (7, "maj7b13 (no 3)"),
        (9, "13b9 (no 3)"),
        (10, "9maj7 (no 3)"),
    ],
    &[
        (2, "+2maj7/"),
        (3, "m2"),
        (4, "+4maj7/"),
        (5, "+5maj7/"),
        (6, "7sus4b5"),
        (7, "maj7#11 (no 3)"),
        (9, "+9maj7/"),
        (10, "+2m7/"),
        (11, "m7maj7"),
    ],
    &[
        (1, "2b9"),
        (2, "+8add#11/"),
        (3, "6#9"),
        (4, "11"),
        (5, "maj7sus4b5"),
        (7, "+8maj11/"),
        (8, "6/9#5 (no 3)"),
        (9, "m13"),
        (10, "7maj7"),
    ],
    &[
        (1, "+1maj7b9 (no 3)/"),
        (2, "m6/9"),
        (3, "7#9"),
        (4, "maj11"),
        (6, "5b9#11"),
        (7, "2b13"),
        (8, "m6#5"),
        (9, "13"),
        (10, "7maj7sus4"),
    ],
    &[
        (2, "6/9b9 (no 3)"),
        (3, "m9"),
        (4, "maj7#9"),
        (6, "+1maj11/"),
        (7, "+211/"),
        (8, "+8maj7/"),
        (9, "aug6"),
        (10, "+5add4/"),
        (11, "7maj7b5 (no 3)"),
    ],
    &[
        (1, "9addb9 (no 3)"),
        (2, "m(maj9)"),
        (4, "+1maj7#9/"),
        (5, "+27#9/"),
        (6, "m#11"),
        (7, "addb13"),
        (8, "+5add#9/"),
        (9, "13b5 (no 3)"),
        (10, "7maj7 (no 3)"),
    ],
    &[
        (1, "maj9b9"),
        (3, "addb9#9"),
        (4, "add2add4"),
        (5, "+57b9 (no 3)/"),
        (6, "add#11"),
        (7, "sus4b13"),
        (8, "+87b9 (no 3)/"),
        (9, "13 (no 3)"),
        (10, "7maj7#5 (no 3)"),
    ],
    &[
        (1, "+1maj9/"),
        (2, "+29/"),
        (3, "msus4"),
        (4, "+87#5/"),
        (5, "+5add2/"),
        (6, "+89/"),
        (7, "maj13 (no 3)"),
        (9, "maj13b9 (no 3)"),
        (11, "m(maj7)b9"),
    ],
    &[
        (1, "dimb9"),
        (2, "add2"),
        (3, "+5m7/"),
        (4, "+9m6/"),
        (5, "7sus4"),
        (6, "+87#9/"),
        (8, "+10m9/"),
        (9, "maj13 (no 3)"),
        (11, "maj7b9"),
    ],
    &[
        (1, "mb9"),
        (2, "+47#5/"),
        // No trailing slash: resolves to "<root>7" and is then prefixed by the bass tone.
        (3, "+57"),
        (4, "7b5"),
        (5, "maj7sus4"),
        (7, "+97#9/"),
        (8, "+109/"),
        (9, "m6(maj7)"),
        (11, "+17maj7/"),
    ],
    &[
        (1, "+1maj9 (no 3)/"),
        (2, "+29 (no 3)/"),
        (3, "m11"),
        (4, "maj7b5"),
        (6, "+811/"),
        (7, "6/9 (no 3)"),
        (8, "+8add2/"),
        (9, "maj13"),
        (11, "+112b9/"),
    ],
    &[
        (1, "m6b9"),
        (2, "9"),
        (3, "msus4(maj7)"),
        (5, "sus4b9"),
        (6, "+87b5/"),
        (7, "m6"),
        (8, "7#5"),
        (9, "maj13sus4"),
        (11, "maj7b9 (no 3)"),
    ],
    &[
        (1, "m7b9"),
        (2, "maj9"),
        (4, "b5b9"),
        (5, "2sus4"),
        (6, "+87/"),
        (7, "6"),
        (8, "+86/9/"),
        (9, "+9m6/9/"),
        (11, "maj7#5b9 (no 3)"),
    ],
    &[
        (1, "b9"),
        (2, "+2m7b5/"),
        (3, "dim7"),
        (4, "7"),
        (5, "maj7sus4b5"),
        (7, "7b9 (no 3)"),
        (8, "maj9#5 (no 3)"),
        (10, "7b9"),
        (11, "maj9sus4"),
    ],
    &[
        (1, "+1m(maj7)/"),
        (2, "+2m7/"),
        (3, "m7b5"),
        (4, "maj7"),
        (6, "+6m#11/"),
        (7, "9 (no 3)"),
        (8, "m(maj7)#5"),
        (10, "+1maj13/"),
        (11, "+213/"),
    ],
    &[
        (1, "+1maj7/"),
        (2, "+27/"),
        (3, "m7"),
        (4, "maj7#5"),
        (6, "+6add#11/"),
        (7, "maj9 (no 3)"),
        (9, "6b9"),
        (10, "m11 (no 3)"),
        (11, "dim(maj7)"),
    ],
    &[
        (1, "+1maj7#5/"),
        (2, "9b5 (no 3)"),
        (3, "m(maj7)"),
        (5, "+5addb13/"),
        (6, "9b5 (no 3)"),
        (7, "m(maj7)"),
        (9, "6sus4b9"),
        (10, "+27#5/"),
        (11, "m(maj7)"),
    ],
];

/// Quality of two distinct pitch classes `distance` semitones apart.
pub fn interval_quality(distance: u8) -> &'static str {
    match distance {
        1..=11 => INTERVAL_QUALITIES[distance as usize - 1],
        _ => {
            log::warn!("No interval quality for distance {}", distance);
            ERROR_QUALITY
        }
    }
}

/// Quality of three distinct pitch classes at `0`, `lower` and `upper`.
pub fn triad_quality(lower: u8, upper: u8) -> &'static str {
    TRIAD_QUALITIES
        .iter()
        .find(|(key, _)| *key == (lower, upper))
        .map(|&(_, quality)| quality)
        .unwrap_or(ERROR_QUALITY)
}

/// Quality of four distinct pitch classes given as ascending intervals
/// `[0, a, b, c]` above the bass.
///
/// The upper three notes are named as a triad first; that triad's family and
/// the corrected distance from the bass then select the four-note quality.
pub fn tetrad_quality(intervals: [u8; 4]) -> &'static str {
    let first_interval = intervals[1];
    let upper_lower = intervals[2].wrapping_sub(first_interval);
    let upper_upper = intervals[3].wrapping_sub(first_interval);
    let upper_triad = triad_quality(upper_lower, upper_upper);

    let Some(&(_, correction, family)) = TETRAD_GROUPING
        .iter()
        .find(|(name, _, _)| *name == upper_triad)
    else {
        log::warn!("No tetrad family for upper triad '{}' in {:?}", upper_triad, intervals);
        return ERROR_QUALITY;
    };

    let corrected = (first_interval as i16 + correction as i16).rem_euclid(12) as u8;
    TETRAD_FAMILIES[family]
        .iter()
        .find(|(interval, _)| *interval == corrected)
        .map(|&(_, quality)| quality)
        .unwrap_or_else(|| {
            log::warn!(
                "No tetrad quality for '{}' at corrected interval {}",
                upper_triad,
                corrected
            );
            ERROR_QUALITY
        })
}

/// A parsed inversion marker: `"+<offset><remainder>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InversionMarker<'a> {
    /// Semitones from the bass up to the actual root.
    pub offset: u8,
    /// Quality text to append to the root, including any trailing `/`.
    pub remainder: &'a str,
}

impl<'a> InversionMarker<'a> {
    /// Parses `quality` if it is an inversion marker.
    ///
    /// The offset is one digit, or two when the marker starts with `+10` or
    /// `+11`.
    pub fn parse(quality: &'a str) -> Option<Self> {
        let body = quality.strip_prefix('+')?;
        let bytes = body.as_bytes();
        let digits = if bytes.len() >= 2 && bytes[0] == b'1' && (bytes[1] == b'0' || bytes[1] == b'1') {
            2
        } else {
            1
        };
        let offset = body.get(..digits)?.parse().ok()?;
        Some(Self {
            offset,
            remainder: &body[digits..],
        })
    }
}
