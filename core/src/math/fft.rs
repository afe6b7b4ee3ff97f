use num_complex::Complex64;
use rustfft::{num_traits::Zero, Fft, FftPlanner};

/// Helper that wraps the `rustfft` planner for zero-padded real transforms.
///
/// The transform length is twice the next power of two at or above the
/// sample count; only the non-negative frequency half is returned.
pub struct FftHelper {
    fft: std::sync::Arc<dyn Fft<f64>>,
    padded_len: usize,
}

impl FftHelper {
    pub fn new(sample_count: usize) -> Self {
        let padded_len = Self::padded_length(sample_count);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(padded_len);
        Self { fft, padded_len }
    }

    pub fn padded_length(sample_count: usize) -> usize {
        sample_count.max(1).next_power_of_two() * 2
    }

    pub fn padded_len(&self) -> usize {
        self.padded_len
    }

    /// Number of retained bins (DC through Nyquist inclusive).
    pub fn positive_bins(&self) -> usize {
        self.padded_len / 2 + 1
    }

    /// Bin centre frequencies in Hz for the retained half spectrum.
    pub fn frequencies(&self, sample_interval: f64) -> Vec<f64> {
        let spacing = 1.0 / (sample_interval * self.padded_len as f64);
        (0..self.positive_bins())
            .map(|bin| bin as f64 * spacing)
            .collect()
    }

    pub fn forward(&self, input: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input
            .iter()
            .take(self.padded_len)
            .map(|&value| Complex64::new(value, 0.0))
            .collect();
        buffer.resize(self.padded_len, Complex64::zero());

        self.fft.process(&mut buffer);
        buffer.truncate(self.positive_bins());
        buffer
    }
}
