use rustfft::{num_complex::Complex, Fft, FftPlanner};
use serde::Deserialize;
use std::sync::Arc;

/// Byte spectrum settings. The decibel range is mapped linearly onto 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    pub fft_size: usize,
    pub min_decibels: f32,
    pub max_decibels: f32,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            fft_size: 16384,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

/// Produces byte-scaled magnitude spectra, one value per bin up to Nyquist.
///
/// Windows are Blackman-weighted, magnitudes are normalized by the FFT size
/// and converted to dB before scaling.
pub struct ByteSpectrum {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    config: SpectrumConfig,
}

impl ByteSpectrum {
    pub fn new(config: SpectrumConfig) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        Self {
            fft,
            window: blackman_window(config.fft_size),
            config,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.config.fft_size / 2
    }

    /// Spectrum of `fft_size` samples starting at `start`; samples past the
    /// end of the input are treated as silence.
    pub fn frame(&self, samples: &[f32], start: usize) -> Vec<u8> {
        let size = self.config.fft_size;
        let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); size];
        let end = (start + size).min(samples.len());
        if start < end {
            for (i, &s) in samples[start..end].iter().enumerate() {
                buffer[i] = Complex::new(s * self.window[i], 0.0);
            }
        }

        self.fft.process(&mut buffer);

        let range = self.config.max_decibels - self.config.min_decibels;
        buffer[..self.bin_count()]
            .iter()
            .map(|c| {
                let magnitude = c.norm() / size as f32;
                let db = 20.0 * magnitude.log10();
                let scaled = 255.0 * (db - self.config.min_decibels) / range;
                if scaled.is_nan() {
                    0
                } else {
                    scaled.clamp(0.0, 255.0) as u8
                }
            })
            .collect()
    }
}

fn blackman_window(size: usize) -> Vec<f32> {
    const ALPHA: f32 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;
    (0..size)
        .map(|i| {
            let x = 2.0 * std::f32::consts::PI * i as f32 / size as f32;
            a0 - a1 * x.cos() + a2 * (2.0 * x).cos()
        })
        .collect()
}
