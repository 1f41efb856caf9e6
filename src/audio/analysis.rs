use anyhow::Result;
use chordify::{AnalyzerConfig, ChordDetector, FrequencyIndexMap};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use super::decode::AudioData;
use super::spectrum::{ByteSpectrum, SpectrumConfig};
use super::tempo;
use super::timeline::{ChordFrame, ChordTimeline};

/// Tempos accepted from the command line or config.
const BPM_RANGE: std::ops::RangeInclusive<f32> = 1.0..=1000.0;

#[derive(Debug, Clone, Default)]
pub struct AnalysisSettings {
    /// Fixed tempo; estimated from the audio when `None`.
    pub bpm: Option<f32>,
    /// Time of the first beat in seconds; the first detected onset when `None`.
    pub offset: Option<f32>,
    pub analyzer: AnalyzerConfig,
    pub spectrum: SpectrumConfig,
}

pub fn analyze(audio: &AudioData, settings: &AnalysisSettings, show_progress: bool) -> Result<ChordTimeline> {
    if settings.spectrum.fft_size < 4 {
        anyhow::bail!("FFT size must be at least 4, got {}", settings.spectrum.fft_size);
    }
    let duration = audio.duration();

    log::info!("Pass 1: Tempo...");
    let (bpm, offset) = match settings.bpm {
        Some(bpm) => {
            if !BPM_RANGE.contains(&bpm) {
                anyhow::bail!(
                    "Tempo must be between {} and {} BPM, got {}",
                    BPM_RANGE.start(),
                    BPM_RANGE.end(),
                    bpm
                );
            }
            (bpm, settings.offset.map_or(0.0, f64::from))
        }
        None => {
            let estimate = tempo::estimate(&audio.samples, audio.sample_rate);
            if let Some(last) = estimate.onsets.last() {
                log::debug!("Last onset at {:.2}s", last.time);
            }
            (estimate.bpm, settings.offset.map_or(estimate.first_beat, f64::from))
        }
    };

    let times = frame_times(bpm, offset, duration as f64);
    log::info!("Pass 2: Chords ({} beats at {:.1} BPM)...", times.len(), bpm);

    let spectrum = ByteSpectrum::new(settings.spectrum);
    let detector = ChordDetector::new(
        FrequencyIndexMap::new(audio.sample_rate, spectrum.bin_count()),
        settings.analyzer,
    );

    let pb = if show_progress {
        let pb = ProgressBar::new(times.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} beats ({eta} remaining)")?
                .progress_chars("=>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let frames: Vec<ChordFrame> = times
        .par_iter()
        .enumerate()
        .map(|(beat, &time)| {
            let start = (time * audio.sample_rate as f64) as usize;
            let bytes = spectrum.frame(&audio.samples, start);
            let analysis = detector.detect(&bytes);
            pb.inc(1);
            ChordFrame {
                beat,
                time: time as f32,
                chord: analysis.chord_name().to_string(),
                notes: analysis.pitches.iter().map(|p| p.to_string()).collect(),
            }
        })
        .collect();

    pb.finish_and_clear();

    Ok(ChordTimeline {
        tempo_bpm: bpm,
        offset: offset as f32,
        duration,
        frames,
    })
}

/// Analysis window starts: a quarter beat after each beat, until the end of the audio.
fn frame_times(bpm: f32, offset: f64, duration: f64) -> Vec<f64> {
    let beat_length = 60.0 / bpm as f64;
    let first = offset.max(0.0) + beat_length / 4.0;
    if first >= duration {
        return Vec::new();
    }
    let count = ((duration - first) / beat_length).ceil() as usize;
    (0..count)
        .map(|i| first + i as f64 * beat_length)
        .filter(|&t| t < duration)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tones(notes: &[(f64, f64)], sample_rate: u32, seconds: f64) -> AudioData {
        let len = (sample_rate as f64 * seconds) as usize;
        let samples = (0..len)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                notes
                    .iter()
                    .map(|&(f, a)| a * (2.0 * std::f64::consts::PI * f * t).sin())
                    .sum::<f64>() as f32
            })
            .collect();
        AudioData {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn frames_start_a_quarter_beat_after_each_beat() {
        let times = frame_times(120.0, 1.0, 3.0);
        assert_eq!(times, vec![1.125, 1.625, 2.125, 2.625]);
        assert!(frame_times(120.0, 0.0, 0.1).is_empty());
        // A frame exactly at the end of the audio is not analysed.
        assert_eq!(frame_times(120.0, 1.0, 3.125).len(), 4);
    }

    #[test]
    fn frame_count_is_bounded_by_the_audio() {
        let times = frame_times(1000.0, 0.0, 600.0);
        assert_eq!(times.len(), 10_000);
        assert!(times.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn late_frames_start_on_the_exact_sample() {
        // Eight minutes in at 44.1 kHz; f32 seconds would be off by samples here.
        let times = frame_times(60.0, 479.75, 481.0);
        assert_eq!(times, vec![480.0]);
        assert_eq!((times[0] * 44100.0) as usize, 21_168_000);
    }

    #[test]
    fn sustained_c_major_is_named_c() {
        // Quiet bass so E3 and G3 clear the note threshold.
        let audio = tones(&[(130.81, 0.0055), (164.81, 0.07), (196.0, 0.07)], 44100, 2.0);
        let settings = AnalysisSettings {
            bpm: Some(120.0),
            offset: Some(0.0),
            ..AnalysisSettings::default()
        };
        let timeline = analyze(&audio, &settings, false).unwrap();

        assert_eq!(timeline.frames.len(), 4);
        for frame in &timeline.frames {
            assert_eq!(frame.chord, "C", "beat {} heard {:?}", frame.beat, frame.notes);
            assert_eq!(frame.notes, vec!["C3", "E3", "G3"]);
        }
        assert_eq!(timeline.changes_only().frames.len(), 1);
    }

    #[test]
    fn silence_has_no_chords() {
        let audio = AudioData {
            samples: vec![0.0; 44100],
            sample_rate: 44100,
        };
        let settings = AnalysisSettings {
            bpm: Some(60.0),
            ..AnalysisSettings::default()
        };
        let timeline = analyze(&audio, &settings, false).unwrap();
        assert_eq!(timeline.frames.len(), 1);
        assert_eq!(timeline.frames[0].chord, "");
        assert!(timeline.frames[0].notes.is_empty());
    }

    #[test]
    fn rejects_bad_settings() {
        let audio = AudioData {
            samples: vec![0.0; 100],
            sample_rate: 44100,
        };
        for bpm in [0.0, -90.0, f32::NAN, 1e9] {
            let tempo = AnalysisSettings {
                bpm: Some(bpm),
                ..AnalysisSettings::default()
            };
            assert!(analyze(&audio, &tempo, false).is_err(), "accepted {} BPM", bpm);
        }

        let mut tiny_fft = AnalysisSettings::default();
        tiny_fft.spectrum.fft_size = 2;
        assert!(analyze(&audio, &tiny_fft, false).is_err());
    }
}
