//! # Chord Detector
//!
//! Runs the full per-frame pipeline: peak picking, pitch quantization and
//! harmonic analysis. A detector holds only read-only data, so one instance
//! can serve many frames in parallel.

use serde::Deserialize;

use super::frequency_map::FrequencyIndexMap;
use super::harmony::Chord;
use super::peaks::{self, PeakSettings, SpectralPeak};
use super::pitch::Pitch;
use super::quantize;

/// Tunable parameters of the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Lowest frequency (Hz) considered for peaks.
    pub min_frequency: f64,
    /// Minimum byte magnitude of a spectral peak.
    pub peak_threshold: u8,
    /// Attenuate overtones of detected peaks before looking for more.
    pub harmonic_suppression: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_frequency: 60.0,
            peak_threshold: 120,
            harmonic_suppression: true,
        }
    }
}

impl AnalyzerConfig {
    fn peak_settings(&self) -> PeakSettings {
        PeakSettings {
            min_frequency: self.min_frequency,
            peak_threshold: self.peak_threshold,
            harmonic_suppression: self.harmonic_suppression,
        }
    }
}

/// Everything derived from one frame.
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    pub peaks: Vec<SpectralPeak>,
    pub note_threshold: f64,
    pub pitches: Vec<Pitch>,
    pub chord: Chord,
}

impl FrameAnalysis {
    pub fn chord_name(&self) -> &str {
        self.chord.name()
    }
}

#[derive(Debug, Clone)]
pub struct ChordDetector {
    map: FrequencyIndexMap,
    config: AnalyzerConfig,
}

impl ChordDetector {
    pub fn new(map: FrequencyIndexMap, config: AnalyzerConfig) -> Self {
        Self { map, config }
    }

    pub fn frequency_map(&self) -> &FrequencyIndexMap {
        &self.map
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes one frame of byte magnitudes (one value per bin).
    ///
    /// `spectrum` is left untouched. Its length should match the frequency
    /// map; any extra bins are ignored.
    pub fn detect(&self, spectrum: &[u8]) -> FrameAnalysis {
        let scan = peaks::pick_peaks(spectrum, &self.map, &self.config.peak_settings());
        let pitches = quantize::pitches_from_peaks(&scan);
        let chord = Chord::new(pitches.clone());

        FrameAnalysis {
            peaks: scan.peaks,
            note_threshold: scan.note_threshold,
            pitches,
            chord,
        }
    }

    /// Shorthand for `detect(spectrum).chord` name.
    pub fn chord_name(&self, spectrum: &[u8]) -> String {
        self.detect(spectrum).chord.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BINS: usize = 4801;

    /// 5 Hz per bin up to 24 kHz.
    fn detector(harmonic_suppression: bool) -> ChordDetector {
        ChordDetector::new(
            FrequencyIndexMap::new(48000, BINS),
            AnalyzerConfig {
                harmonic_suppression,
                ..AnalyzerConfig::default()
            },
        )
    }

    fn spectrum_with(peaks: &[(usize, u8)]) -> Vec<u8> {
        let mut spectrum = vec![0u8; BINS];
        for &(bin, magnitude) in peaks {
            spectrum[bin] = magnitude;
        }
        spectrum
    }

    #[test]
    fn silence_is_an_empty_name() {
        let spectrum = vec![0u8; BINS];
        let analysis = detector(true).detect(&spectrum);
        assert!(analysis.peaks.is_empty());
        assert_eq!(analysis.chord_name(), "");
    }

    #[test]
    fn single_tone_is_a_note() {
        // 440 Hz
        let spectrum = spectrum_with(&[(88, 200)]);
        assert_eq!(detector(true).chord_name(&spectrum), "A note");
    }

    #[test]
    fn c_major_triad() {
        // 130, 165 and 195 Hz: C3, E3, G3.
        let spectrum = spectrum_with(&[(26, 200), (33, 200), (39, 200)]);
        let analysis = detector(true).detect(&spectrum);
        let names: Vec<String> = analysis.pitches.iter().map(Pitch::to_string).collect();
        assert_eq!(names, vec!["C3", "E3", "G3"]);
        assert_eq!(analysis.chord_name(), "C");
    }

    #[test]
    fn weak_bass_is_kept_but_weak_upper_peaks_are_not() {
        // Threshold = mean(130, 220, 220, 125) * 1.1, about 191.
        let spectrum = spectrum_with(&[(26, 130), (33, 220), (39, 220), (60, 125)]);
        let analysis = detector(false).detect(&spectrum);
        assert_eq!(analysis.peaks.len(), 4);
        assert!((analysis.note_threshold - 695.0 / 4.0 * 1.1).abs() < 1e-9);
        assert_eq!(analysis.chord_name(), "C");
    }

    #[test]
    fn overtone_is_suppressed_into_a_single_note() {
        // A2 at 110 Hz with a stronger component just above 220 Hz.
        let spectrum = spectrum_with(&[(22, 130), (45, 165)]);
        assert_eq!(detector(false).chord_name(&spectrum), "A octave");
        assert_eq!(detector(true).chord_name(&spectrum), "A note");
    }

    #[test]
    fn input_spectrum_is_not_mutated() {
        let spectrum = spectrum_with(&[(22, 230), (44, 200)]);
        let copy = spectrum.clone();
        let _ = detector(true).detect(&spectrum);
        assert_eq!(spectrum, copy);
    }
}
