/// Bin index to frequency lookup for a magnitude spectrum.
///
/// Bin `i` sits at `i * (sample_rate / 2) / (bin_count - 1)` Hz, so the first
/// bin is 0 Hz and the last bin is the Nyquist frequency. Built once per
/// `(sample_rate, bin_count)` and shared read-only by every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyIndexMap {
    frequencies: Vec<f64>,
    sample_rate: u32,
}

impl FrequencyIndexMap {
    pub fn new(sample_rate: u32, bin_count: usize) -> Self {
        let step_hz = if bin_count > 1 {
            (sample_rate as f64 / 2.0) / (bin_count - 1) as f64
        } else {
            0.0
        };
        let frequencies = (0..bin_count).map(|i| i as f64 * step_hz).collect();
        Self {
            frequencies,
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Frequency of `bin` in Hz.
    ///
    /// # Panics
    /// * If `bin` is out of range
    pub fn frequency(&self, bin: usize) -> f64 {
        self.frequencies[bin]
    }

    /// Width of one bin in Hz (the frequency of bin 1).
    pub fn bin_width(&self) -> f64 {
        self.frequencies.get(1).copied().unwrap_or(0.0)
    }

    /// Highest representable frequency (the last bin).
    pub fn max_frequency(&self) -> f64 {
        self.frequencies.last().copied().unwrap_or(0.0)
    }

    /// First bin at or above `frequency`, if any.
    pub fn first_bin_at_or_above(&self, frequency: f64) -> Option<usize> {
        self.frequencies.iter().position(|&f| f >= frequency)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.frequencies
    }
}
