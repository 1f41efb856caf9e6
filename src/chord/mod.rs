//! Spectrum-to-chord analysis.

pub mod detector;
pub mod frequency_map;
pub mod harmony;
pub mod peaks;
pub mod pitch;
pub mod quality;
pub mod quantize;

pub use detector::{AnalyzerConfig, ChordDetector, FrameAnalysis};
pub use frequency_map::FrequencyIndexMap;
pub use harmony::Chord;
pub use peaks::{PeakScan, SpectralPeak};
pub use pitch::{Pitch, Tone};
