use std::f64::consts::TAU;
use std::ops::RangeInclusive;

use super::spectrum::{ByteSpectrum, SpectrumConfig};

const ONSET_WINDOW: usize = 2048;
const ONSET_HOP: usize = 1024;
/// Hops on each side averaged for the adaptive onset threshold.
const LOCAL_MEAN_RADIUS: usize = 20;
const ONSET_THRESHOLD_FACTOR: f32 = 1.5;
const MIN_ONSET_GAP: f64 = 0.1;
/// Beat lengths in seconds accepted as a tempo (60..200 BPM).
const BEAT_LENGTH_RANGE: RangeInclusive<f64> = 0.3..=1.0;
const DEFAULT_BPM: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Onset {
    /// Center of the window the onset was found in, in seconds.
    pub time: f64,
    /// Summed rise of the byte spectrum over the previous window.
    pub strength: f32,
}

/// Tempo and phase of a recording, used to cut it into one frame per beat.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoEstimate {
    pub bpm: f32,
    /// Beat grid point nearest the first onset, in seconds (0.0 without onsets).
    pub first_beat: f64,
    pub onsets: Vec<Onset>,
}

pub fn estimate(samples: &[f32], sample_rate: u32) -> TempoEstimate {
    let envelope = onset_envelope(samples, sample_rate);
    let onsets = pick_onsets(&envelope);
    let bpm = median_beat_length(&onsets).map_or(DEFAULT_BPM, |length| (60.0 / length) as f32);
    let first_beat = align_first_beat(&onsets, 60.0 / bpm as f64);

    log::info!(
        "Tempo: {:.1} BPM from {} onsets, first beat at {:.2}s",
        bpm,
        onsets.len(),
        first_beat
    );

    TempoEstimate {
        bpm,
        first_beat,
        onsets,
    }
}

/// (time, rise) per hop: how much the byte spectrum grew since the previous window.
///
/// Works on the same dB-scaled bytes the chord detector sees, so quiet
/// attacks count about as much as loud ones.
fn onset_envelope(samples: &[f32], sample_rate: u32) -> Vec<(f64, f32)> {
    let spectrum = ByteSpectrum::new(SpectrumConfig {
        fft_size: ONSET_WINDOW,
        ..SpectrumConfig::default()
    });
    let mut previous = vec![0u8; spectrum.bin_count()];

    (0usize..)
        .map(|hop| hop * ONSET_HOP)
        .take_while(|&start| start + ONSET_WINDOW <= samples.len())
        .map(|start| {
            let current = spectrum.frame(samples, start);
            let rise: u32 = current
                .iter()
                .zip(&previous)
                .map(|(&now, &before)| now.saturating_sub(before) as u32)
                .sum();
            previous = current;
            let center = start + ONSET_WINDOW / 2;
            (center as f64 / sample_rate as f64, rise as f32)
        })
        .collect()
}

/// Local maxima of the envelope above 1.5x the surrounding mean, at least 100 ms apart.
fn pick_onsets(envelope: &[(f64, f32)]) -> Vec<Onset> {
    let mut prefix = Vec::with_capacity(envelope.len() + 1);
    prefix.push(0.0f64);
    for &(_, rise) in envelope {
        prefix.push(prefix[prefix.len() - 1] + rise as f64);
    }

    let mut onsets: Vec<Onset> = Vec::new();
    for (i, &(time, rise)) in envelope.iter().enumerate() {
        let lo = i.saturating_sub(LOCAL_MEAN_RADIUS);
        let hi = (i + LOCAL_MEAN_RADIUS + 1).min(envelope.len());
        let local_mean = ((prefix[hi] - prefix[lo]) / (hi - lo) as f64) as f32;
        if rise <= local_mean * ONSET_THRESHOLD_FACTOR {
            continue;
        }

        let rising = i == 0 || rise >= envelope[i - 1].1;
        let falling = envelope.get(i + 1).map_or(true, |&(_, next)| rise >= next);
        let clear_of_last = onsets.last().map_or(true, |last| time - last.time > MIN_ONSET_GAP);
        if rising && falling && clear_of_last {
            onsets.push(Onset {
                time,
                strength: rise,
            });
        }
    }
    onsets
}

/// Median gap between consecutive onsets, ignoring gaps outside 60..200 BPM.
fn median_beat_length(onsets: &[Onset]) -> Option<f64> {
    let mut gaps: Vec<f64> = onsets
        .windows(2)
        .map(|pair| pair[1].time - pair[0].time)
        .filter(|gap| BEAT_LENGTH_RANGE.contains(gap))
        .collect();
    if gaps.is_empty() {
        return None;
    }
    gaps.sort_by(f64::total_cmp);
    Some(gaps[gaps.len() / 2])
}

/// Places a beat grid of `beat_length` over the onsets and returns the grid
/// point closest to the first onset.
///
/// The grid phase is the strength-weighted circular mean of the onset times
/// modulo the beat length, so a few off-beat onsets do not shift the grid.
fn align_first_beat(onsets: &[Onset], beat_length: f64) -> f64 {
    let Some(first) = onsets.first() else {
        return 0.0;
    };

    let (sin, cos) = onsets.iter().fold((0.0, 0.0), |(sin, cos), onset| {
        let angle = TAU * onset.time / beat_length;
        let weight = onset.strength as f64;
        (sin + weight * angle.sin(), cos + weight * angle.cos())
    });
    let phase = (sin.atan2(cos) / TAU * beat_length).rem_euclid(beat_length);
    let beats_before_first = ((first.time - phase) / beat_length).round();
    (phase + beats_before_first * beat_length).max(0.0)
}
