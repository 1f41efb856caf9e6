//! # Peak Picking Module
//!
//! Finds local maxima in a byte-scaled magnitude spectrum and, optionally,
//! attenuates the overtones of every accepted peak so that harmonics are not
//! mistaken for separate notes.
//!
//! The scan walks the spectrum upward from the minimum analyzable frequency.
//! A bin that is not lower than its right neighbour ends an ascending run; it
//! becomes a peak when it also clears the peak threshold and is not lower than
//! its left neighbour. Because suppression runs as soon as a peak is accepted,
//! bins above it are already attenuated when the scan reaches them.

use super::frequency_map::FrequencyIndexMap;

/// Attenuation applied to the first harmonic window (2x the fundamental).
const FIRST_HARMONIC_ADJUSTMENT: u8 = 50;
/// Attenuation applied to every later harmonic window.
const LATER_HARMONIC_ADJUSTMENT: u8 = 30;
/// Suppression continues while the adjustment is above this value. The
/// adjustment never decays below it, so in practice only the frequency bound
/// stops the loop.
const MIN_HARMONIC_ADJUSTMENT: u8 = 10;
/// Ratio of one equal-tempered semitone, rounded as used for the window width.
const SEMITONE_RATIO: f64 = 1.06;
/// The note threshold is this factor above the mean peak magnitude.
const NOTE_THRESHOLD_FACTOR: f64 = 1.1;

/// A local maximum of the spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    /// Frequency of the peak bin in Hz.
    pub frequency: f64,
    /// Magnitude of the peak bin (0-255) at the time it was accepted.
    pub magnitude: u8,
}

/// Result of scanning one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeakScan {
    /// Peaks in ascending frequency order.
    pub peaks: Vec<SpectralPeak>,
    /// Mean peak magnitude times 1.1; 0.0 when no peaks were found.
    pub note_threshold: f64,
}

/// Parameters for [`pick_peaks`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakSettings {
    /// Bins below this frequency are not scanned.
    pub min_frequency: f64,
    /// Minimum magnitude for a peak, and for a bin to be attenuated.
    pub peak_threshold: u8,
    /// Attenuate harmonic multiples of each accepted peak.
    pub harmonic_suppression: bool,
}

/// Scans `spectrum` for peaks.
///
/// The input is never modified; harmonic suppression is applied to a private
/// working copy for this frame only.
pub fn pick_peaks(spectrum: &[u8], map: &FrequencyIndexMap, settings: &PeakSettings) -> PeakScan {
    let mut working = spectrum.to_vec();
    pick_peaks_in_place(&mut working, map, settings)
}

/// Same as [`pick_peaks`] but suppresses harmonics directly in `working`.
pub fn pick_peaks_in_place(
    working: &mut [u8],
    map: &FrequencyIndexMap,
    settings: &PeakSettings,
) -> PeakScan {
    let len = working.len().min(map.len());
    let threshold = settings.peak_threshold;

    let mut peaks = Vec::new();
    let mut magnitude_sum: u64 = 0;

    let Some(start) = map.first_bin_at_or_above(settings.min_frequency) else {
        return PeakScan::default();
    };

    let mut i = start;
    while i + 1 < len {
        if working[i] >= working[i + 1] {
            let is_peak = i > 0 && working[i] >= threshold && working[i] >= working[i - 1];
            if is_peak {
                let frequency = map.frequency(i);
                magnitude_sum += working[i] as u64;
                peaks.push(SpectralPeak {
                    frequency,
                    magnitude: working[i],
                });

                if settings.harmonic_suppression {
                    suppress_harmonics(&mut working[..len], map, frequency, threshold);
                }
            }
            // The bin after a non-increasing step cannot be a maximum.
            i += 1;
        }
        i += 1;
    }

    let note_threshold = if peaks.is_empty() {
        0.0
    } else {
        magnitude_sum as f64 / peaks.len() as f64 * NOTE_THRESHOLD_FACTOR
    };
    log::debug!(
        "Found {} peaks, note threshold {:.1}",
        peaks.len(),
        note_threshold.max(threshold as f64)
    );

    PeakScan {
        peaks,
        note_threshold,
    }
}

/// Attenuates the spectrum just above each integer multiple of `fundamental`.
///
/// For every harmonic `j * fundamental` (j = 2, 3, ...) below the top of the
/// spectrum, bins from `floor(h / bin_width)` up to (excluding)
/// `floor(1.06 * h / bin_width)` that exceed `threshold` are lowered by 50 for
/// the first harmonic and by 30 for all later ones, stopping at zero.
pub fn suppress_harmonics(
    working: &mut [u8],
    map: &FrequencyIndexMap,
    fundamental: f64,
    threshold: u8,
) {
    let bin_width = map.bin_width();
    if fundamental <= 0.0 || bin_width <= 0.0 {
        return;
    }
    let top = map.max_frequency();

    let mut multiple = 2.0;
    let mut harmonic = multiple * fundamental;
    let mut adjustment = FIRST_HARMONIC_ADJUSTMENT;

    while harmonic < top && adjustment > MIN_HARMONIC_ADJUSTMENT {
        let lower = (harmonic / bin_width).floor() as usize;
        let upper = ((SEMITONE_RATIO * harmonic / bin_width).floor() as usize).min(working.len());

        for magnitude in working.iter_mut().take(upper).skip(lower) {
            if *magnitude > threshold {
                *magnitude = magnitude.saturating_sub(adjustment);
            }
        }

        multiple += 1.0;
        harmonic = multiple * fundamental;
        // Known quirk: the adjustment is pinned here instead of decaying,
        // so the guard above never ends the loop on its own.
        adjustment = LATER_HARMONIC_ADJUSTMENT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10 Hz per bin, 0..=24000 Hz.
    fn test_map() -> FrequencyIndexMap {
        FrequencyIndexMap::new(48000, 2401)
    }

    fn settings(harmonic_suppression: bool) -> PeakSettings {
        PeakSettings {
            min_frequency: 60.0,
            peak_threshold: 120,
            harmonic_suppression,
        }
    }

    fn spectrum_with(peaks: &[(usize, u8)]) -> Vec<u8> {
        let mut spectrum = vec![0u8; 2401];
        for &(bin, magnitude) in peaks {
            spectrum[bin] = magnitude;
        }
        spectrum
    }

    #[test]
    fn finds_isolated_peaks_above_threshold() {
        let spectrum = spectrum_with(&[(20, 200), (50, 130), (80, 100)]);
        let scan = pick_peaks(&spectrum, &test_map(), &settings(false));

        let frequencies: Vec<f64> = scan.peaks.iter().map(|p| p.frequency).collect();
        assert_eq!(frequencies, vec![200.0, 500.0]);
        assert_eq!(scan.peaks[0].magnitude, 200);
        assert!((scan.note_threshold - (330.0 / 2.0) * 1.1).abs() < 1e-9);
    }

    #[test]
    fn ignores_bins_below_min_frequency() {
        let spectrum = spectrum_with(&[(3, 250), (30, 150)]);
        let scan = pick_peaks(&spectrum, &test_map(), &settings(false));
        assert_eq!(scan.peaks.len(), 1);
        assert_eq!(scan.peaks[0].frequency, 300.0);
    }

    #[test]
    fn plateau_reports_its_first_bin_only() {
        let spectrum = spectrum_with(&[(40, 180), (41, 180)]);
        let scan = pick_peaks(&spectrum, &test_map(), &settings(false));
        assert_eq!(scan.peaks.len(), 1);
        assert_eq!(scan.peaks[0].frequency, 400.0);
    }

    #[test]
    fn silence_has_no_peaks_and_zero_threshold() {
        let spectrum = vec![0u8; 2401];
        let scan = pick_peaks(&spectrum, &test_map(), &settings(true));
        assert!(scan.peaks.is_empty());
        assert_eq!(scan.note_threshold, 0.0);
    }

    #[test]
    fn suppression_attenuates_the_octave_above_a_fundamental() {
        // Fundamental at 200 Hz, overtone just above 400 Hz.
        let spectrum = spectrum_with(&[(20, 220), (41, 160)]);

        let plain = pick_peaks(&spectrum, &test_map(), &settings(false));
        let suppressed = pick_peaks(&spectrum, &test_map(), &settings(true));

        assert_eq!(plain.peaks.len(), 2);
        assert_eq!(plain.peaks[1].magnitude, 160);
        // 160 - 50 = 110 falls under the peak threshold.
        assert_eq!(suppressed.peaks.len(), 1);
        assert_eq!(suppressed.peaks[0].frequency, 200.0);
    }

    #[test]
    fn suppression_never_touches_the_callers_spectrum() {
        let spectrum = spectrum_with(&[(20, 220), (41, 200)]);
        let before = spectrum.clone();
        let _ = pick_peaks(&spectrum, &test_map(), &settings(true));
        assert_eq!(spectrum, before);
    }

    #[test]
    fn later_harmonics_use_the_smaller_adjustment() {
        let map = test_map();
        let mut working = spectrum_with(&[(40, 200), (60, 200), (80, 200), (100, 100)]);
        suppress_harmonics(&mut working, &map, 200.0, 120);

        assert_eq!(working[40], 150); // 2nd harmonic: -50
        assert_eq!(working[60], 170); // 3rd harmonic: -30
        assert_eq!(working[80], 170); // 4th harmonic: -30
        assert_eq!(working[100], 100); // below threshold, untouched
    }

    #[test]
    fn low_threshold_suppression_bottoms_out_at_zero() {
        let spectrum = spectrum_with(&[(20, 200), (40, 40)]);
        let low = PeakSettings {
            peak_threshold: 30,
            ..settings(true)
        };
        let scan = pick_peaks(&spectrum, &test_map(), &low);
        assert_eq!(scan.peaks.len(), 1);
        assert_eq!(scan.peaks[0].frequency, 200.0);

        let mut working = spectrum_with(&[(40, 40), (60, 45)]);
        suppress_harmonics(&mut working, &test_map(), 200.0, 30);
        assert_eq!(working[40], 0);
        assert_eq!(working[60], 15);
    }

    #[test]
    fn suppression_runs_up_to_the_top_of_the_spectrum() {
        let map = test_map();
        let mut working = vec![200u8; 2401];
        suppress_harmonics(&mut working, &map, 1000.0, 120);

        assert_eq!(working[200], 150);
        assert_eq!(working[1000], 170);
        // Between harmonic windows nothing changes.
        assert_eq!(working[1070], 200);
        // Harmonic 23 (23 kHz) is still below 24 kHz and gets attenuated.
        assert_eq!(working[2390], 170);
    }
}
