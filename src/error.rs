//! Error types for the analysis core.

use thiserror::Error;

/// Errors produced when parsing a pitch from its textual form (e.g. `"Bb3"`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PitchParseError {
    /// The input string was empty.
    #[error("pitch name is empty")]
    Empty,

    /// Pitch names are a 1-2 character tone followed by a single octave digit.
    #[error("invalid pitch name '{name}': expected 2-3 characters like \"A0\" or \"Bb3\"")]
    InvalidLength {
        /// The offending input.
        name: String,
    },

    /// The last character was not an octave digit.
    #[error("invalid octave in pitch name '{name}'")]
    InvalidOctave {
        /// The offending input.
        name: String,
    },
}
