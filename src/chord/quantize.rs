//! # Pitch Quantization Module
//!
//! Maps peak frequencies onto discrete pitches and drops peaks that are too
//! weak to count as notes.
//!
//! The octave is found by doubling a slightly lowered C0 reference (16.35 Hz
//! scaled by 0.97) until it passes the frequency. The frequency is then folded
//! down into octave 0 and classified against fixed tone boundaries.

use super::peaks::PeakScan;
use super::pitch::{Pitch, Tone};

/// Frequency of C0 in Hz.
const C0_FREQUENCY: f64 = 16.35;
/// Lowers each octave boundary so notes slightly flat of C still land in the
/// octave they belong to.
const OCTAVE_TOLERANCE: f64 = 0.97;

/// Upper bounds (exclusive) of each tone once folded into octave 0. Anything
/// at or above the last bound is a B.
const TONE_BOUNDARIES: [(f64, Tone); 11] = [
    (16.835, Tone::C),
    (17.835, Tone::CSharp),
    (18.9, Tone::D),
    (20.025, Tone::DSharp),
    (21.215, Tone::E),
    (22.475, Tone::F),
    (23.81, Tone::FSharp),
    (25.23, Tone::G),
    (26.73, Tone::GSharp),
    (28.83, Tone::A),
    (30.005, Tone::ASharp),
];

/// Quantizes a frequency to the nearest pitch.
///
/// # Returns
/// * `Some(pitch)` - for any positive, finite frequency
/// * `None` - the frequency cannot be placed on the scale
pub fn quantize(frequency: f64) -> Option<Pitch> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return None;
    }

    let mut octave: i32 = -1;
    let mut next_octave_threshold = 0.0;
    while frequency > next_octave_threshold {
        octave += 1;
        next_octave_threshold = 2f64.powi(octave + 1) * C0_FREQUENCY * OCTAVE_TOLERANCE;
    }

    let frequency_in_octave0 = frequency / 2f64.powi(octave);
    let tone = TONE_BOUNDARIES
        .iter()
        .find(|(bound, _)| frequency_in_octave0 < *bound)
        .map(|&(_, tone)| tone)
        .unwrap_or(Tone::B);

    Some(Pitch::new(tone, octave as u32))
}

/// Converts the peaks of one frame into the pitches that make up its chord.
///
/// Peaks weaker than the frame's note threshold are skipped, except when no
/// pitch has been accepted yet: the lowest peak is kept as the bass note no
/// matter how weak it is.
pub fn pitches_from_peaks(scan: &PeakScan) -> Vec<Pitch> {
    let mut pitches = Vec::with_capacity(scan.peaks.len());

    for peak in &scan.peaks {
        if (peak.magnitude as f64) < scan.note_threshold {
            if pitches.is_empty() {
                log::debug!("Keeping weak peak at {:.1} Hz as bass note", peak.frequency);
            } else {
                continue;
            }
        }

        if let Some(pitch) = quantize(peak.frequency) {
            log::debug!("Note {} (magnitude {})", pitch, peak.magnitude);
            pitches.push(pitch);
        }
    }

    pitches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::peaks::SpectralPeak;

    fn name(frequency: f64) -> String {
        quantize(frequency).map(|p| p.to_string()).unwrap_or_default()
    }

    #[test]
    fn quantizes_reference_pitches() {
        assert_eq!(name(440.0), "A4");
        assert_eq!(name(261.63), "C4");
        assert_eq!(name(130.81), "C3");
        assert_eq!(name(164.81), "E3");
        assert_eq!(name(196.0), "G3");
        assert_eq!(name(233.08), "A#3");
        assert_eq!(name(61.74), "B1");
        assert_eq!(name(27.5), "A0");
    }

    #[test]
    fn slightly_flat_c_stays_in_its_octave() {
        // 3% below C4 is still above the lowered boundary.
        assert_eq!(name(255.0), "C4");
    }

    #[test]
    fn rejects_unplaceable_frequencies() {
        assert!(quantize(0.0).is_none());
        assert!(quantize(-10.0).is_none());
        assert!(quantize(f64::NAN).is_none());
        assert!(quantize(f64::INFINITY).is_none());
    }

    #[test]
    fn chromatic_index_never_decreases_with_frequency() {
        let mut previous = i32::MIN;
        let mut frequency = 30.0;
        while frequency < 8000.0 {
            let index = quantize(frequency).unwrap().chromatic_index();
            assert!(index >= previous, "index dropped at {} Hz", frequency);
            previous = index;
            frequency *= 1.001;
        }
    }

    #[test]
    fn weak_peaks_are_dropped_except_the_bass() {
        let scan = PeakScan {
            peaks: vec![
                SpectralPeak { frequency: 130.81, magnitude: 121 },
                SpectralPeak { frequency: 164.81, magnitude: 200 },
                SpectralPeak { frequency: 185.0, magnitude: 125 },
                SpectralPeak { frequency: 196.0, magnitude: 210 },
            ],
            note_threshold: 180.0,
        };
        let names: Vec<String> = pitches_from_peaks(&scan).iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["C3", "E3", "G3"]);
    }

    #[test]
    fn empty_scan_yields_no_pitches() {
        assert!(pitches_from_peaks(&PeakScan::default()).is_empty());
    }
}
