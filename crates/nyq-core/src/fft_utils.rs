//! FFT Utilities
//!
//! Thin wrapper around `rustfft` that plans a forward transform once and
//! reuses it, plus the bin/shift helpers used by the analyzers.

use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Planned forward FFT of a fixed size
pub struct FftProcessor {
    size: usize,
    fft: Arc<dyn Fft<f64>>,
}

impl FftProcessor {
    /// Plan a forward transform of `size` points
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self { size, fft }
    }

    /// Transform length
    pub fn size(&self) -> usize {
        self.size
    }

    /// In-place forward FFT
    pub fn fft_inplace(&self, buffer: &mut [Complex64]) {
        self.fft.process(buffer);
    }

    /// Forward FFT of a real sequence
    ///
    /// Input shorter than the transform is zero-padded, longer input is
    /// truncated.
    pub fn fft_real(&self, samples: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = samples
            .iter()
            .take(self.size)
            .map(|&x| Complex64::new(x, 0.0))
            .collect();
        buffer.resize(self.size, Complex64::new(0.0, 0.0));
        self.fft_inplace(&mut buffer);
        buffer
    }

    /// Bin frequencies in FFT order: `0, 1, …, ⌈n/2⌉-1, -⌊n/2⌋, …, -1` times `1/(n·dt)`
    pub fn bin_frequencies(size: usize, dt: f64) -> Vec<f64> {
        let resolution = 1.0 / (size as f64 * dt);
        let half = (size + 1) / 2;
        (0..size)
            .map(|i| {
                let k = if i < half {
                    i as i64
                } else {
                    i as i64 - size as i64
                };
                k as f64 * resolution
            })
            .collect()
    }

    /// Move the zero-frequency bin to the center
    pub fn fft_shift<T: Clone>(data: &[T]) -> Vec<T> {
        let n = data.len();
        let mid = (n + 1) / 2;
        let mut shifted = Vec::with_capacity(n);
        shifted.extend_from_slice(&data[mid..]);
        shifted.extend_from_slice(&data[..mid]);
        shifted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_frequencies_even() {
        let freqs = FftProcessor::bin_frequencies(8, 0.125);
        assert_eq!(freqs, vec![0.0, 1.0, 2.0, 3.0, -4.0, -3.0, -2.0, -1.0]);
    }

    #[test]
    fn test_bin_frequencies_odd() {
        let freqs = FftProcessor::bin_frequencies(5, 0.2);
        assert_eq!(freqs, vec![0.0, 1.0, 2.0, -2.0, -1.0]);
    }

    #[test]
    fn test_fft_shift_centers_dc() {
        let freqs = FftProcessor::bin_frequencies(8, 0.125);
        let shifted = FftProcessor::fft_shift(&freqs);
        assert_eq!(shifted, vec![-4.0, -3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0]);

        let odd = FftProcessor::fft_shift(&FftProcessor::bin_frequencies(5, 0.2));
        assert_eq!(odd, vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_fft_of_constant() {
        let processor = FftProcessor::new(16);
        let spectrum = processor.fft_real(&[1.0; 16]);
        assert!((spectrum[0].re - 16.0).abs() < 1e-9);
        for bin in &spectrum[1..] {
            assert!(bin.norm() < 1e-9);
        }
    }
}
