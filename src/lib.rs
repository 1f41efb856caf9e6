//! Chord recognition core.
//!
//! Turns one frame of byte-scaled magnitude spectrum into a chord name:
//! spectrum -> spectral peaks -> pitches -> chord quality -> name.
//! Every frame is independent; nothing here keeps state between calls.

pub mod chord;
pub mod error;

pub use chord::{AnalyzerConfig, Chord, ChordDetector, FrameAnalysis, FrequencyIndexMap, Pitch, Tone};
pub use error::PitchParseError;
