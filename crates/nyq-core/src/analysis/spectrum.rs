//! Spectrum Analysis
//!
//! Full-length DFT magnitude spectrum of a real signal. No windowing and no
//! averaging: the whole record goes through a single transform so that the
//! bin width is `1/(N·dt)`.

use crate::error::NyqResult;
use crate::fft_utils::FftProcessor;
use crate::types::Signal;
use serde::Serialize;
use tracing::debug;

/// Magnitude spectrum of a signal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectralProfile {
    /// Bin frequencies in Hz, FFT order (non-negative half first)
    pub frequencies: Vec<f64>,
    /// DFT magnitudes `|X[k]|`, unnormalized
    pub magnitudes: Vec<f64>,
    /// Transform length (equals the signal length)
    pub fft_size: usize,
    /// Sample rate derived from the mean time step
    pub sample_rate: f64,
    /// Bin width in Hz
    pub freq_resolution: f64,
}

impl SpectralProfile {
    /// Number of bins
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// True when the profile holds no bins
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Iterate over `(frequency, magnitude)` pairs in FFT order
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies
            .iter()
            .copied()
            .zip(self.magnitudes.iter().copied())
    }

    /// Magnitudes divided by the transform length (amplitude/2 for a pure tone)
    pub fn normalized_magnitudes(&self) -> Vec<f64> {
        let n = self.fft_size.max(1) as f64;
        self.magnitudes.iter().map(|m| m / n).collect()
    }

    /// The first `N/2` bins: DC up to just below Nyquist
    pub fn positive_half(&self) -> (&[f64], &[f64]) {
        let half = self.fft_size / 2;
        (&self.frequencies[..half], &self.magnitudes[..half])
    }

    /// Frequencies and normalized magnitudes ordered from most negative to most positive
    pub fn shifted(&self) -> (Vec<f64>, Vec<f64>) {
        (
            FftProcessor::fft_shift(&self.frequencies),
            FftProcessor::fft_shift(&self.normalized_magnitudes()),
        )
    }

    /// Strongest bin as `(frequency, magnitude)`
    pub fn find_peak(&self) -> Option<(f64, f64)> {
        self.iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Format spectrum as CSV (shifted, normalized)
    pub fn to_csv(&self) -> String {
        let (frequencies, magnitudes) = self.shifted();
        let mut output = String::from("frequency_hz,magnitude\n");
        for (freq, mag) in frequencies.iter().zip(magnitudes.iter()) {
            output.push_str(&format!("{},{}\n", freq, mag));
        }
        output
    }
}

/// Computes [`SpectralProfile`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralAnalyzer;

impl SpectralAnalyzer {
    /// Create an analyzer
    pub fn new() -> Self {
        Self
    }

    /// Transform the whole amplitude sequence.
    ///
    /// `dt` is the mean time step; a non-uniform axis silently turns the
    /// result into an approximation.
    pub fn compute(&self, signal: &Signal) -> NyqResult<SpectralProfile> {
        signal.ensure_usable("spectral analysis")?;

        let n = signal.len();
        let dt = signal.mean_time_step();
        let processor = FftProcessor::new(n);
        let spectrum = processor.fft_real(signal.amplitude());

        let magnitudes: Vec<f64> = spectrum.iter().map(|c| c.norm()).collect();
        let frequencies = FftProcessor::bin_frequencies(n, dt);
        let freq_resolution = 1.0 / (n as f64 * dt);

        debug!(fft_size = n, resolution_hz = freq_resolution, "computed spectrum");

        Ok(SpectralProfile {
            frequencies,
            magnitudes,
            fft_size: n,
            sample_rate: 1.0 / dt,
            freq_resolution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NyqError;
    use crate::synth::SignalSynthesizer;
    use crate::types::SignalTerm;

    #[test]
    fn test_spectrum_single_tone() {
        let signal = SignalSynthesizer::new(1000.0, 1.0)
            .synthesize(&[SignalTerm::new(50.0, 2.0)])
            .unwrap();

        let profile = SpectralAnalyzer::new().compute(&signal).unwrap();
        assert_eq!(profile.len(), 1000);
        assert!((profile.freq_resolution - 1.0).abs() < 1e-9);

        let (peak_freq, peak_mag) = profile.find_peak().unwrap();
        assert!(
            (peak_freq.abs() - 50.0).abs() < profile.freq_resolution,
            "Peak at {} Hz, expected 50 Hz",
            peak_freq
        );
        // A real tone splits its energy between +f and -f
        assert!((peak_mag / 1000.0 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_axis_symmetric_about_zero() {
        let signal = Signal::from_uniform(100.0, vec![0.0; 64]).unwrap();
        let profile = SpectralAnalyzer::new().compute(&signal).unwrap();
        let (freqs, _) = profile.shifted();
        assert!((freqs[0] + 50.0).abs() < 1e-9);
        assert_eq!(freqs[32], 0.0);
        assert!((freqs[63] - 50.0 + profile.freq_resolution).abs() < 1e-9);
    }

    #[test]
    fn test_positive_half() {
        let signal = Signal::from_uniform(10.0, vec![1.0; 10]).unwrap();
        let profile = SpectralAnalyzer::new().compute(&signal).unwrap();
        let (freqs, mags) = profile.positive_half();
        assert_eq!(freqs.len(), 5);
        assert!(freqs.iter().all(|&f| f >= 0.0));
        assert!((mags[0] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_signal_rejected() {
        assert!(matches!(
            SpectralAnalyzer::new().compute(&Signal::empty()),
            Err(NyqError::EmptySignal(_))
        ));
    }
}
