//! Dominant Frequency Detection
//!
//! Find local maxima in the non-negative half of a magnitude spectrum,
//! keep the ones above a threshold and rank them by magnitude.

use crate::analysis::spectrum::SpectralProfile;
use serde::{Deserialize, Serialize};

/// Default magnitude threshold (applied to unnormalized `|X[k]|`)
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// A detected spectral peak
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectralPeak {
    /// Frequency in Hz
    pub frequency: f64,
    /// DFT magnitude
    pub magnitude: f64,
    /// Bin index in the spectrum
    pub bin_index: usize,
}

/// Peaks sorted by magnitude, strongest first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DominantFrequencySet {
    peaks: Vec<SpectralPeak>,
}

impl DominantFrequencySet {
    /// Peaks, strongest first
    pub fn peaks(&self) -> &[SpectralPeak] {
        &self.peaks
    }

    /// Peak frequencies, strongest first
    pub fn frequencies(&self) -> Vec<f64> {
        self.peaks.iter().map(|p| p.frequency).collect()
    }

    /// Number of peaks
    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    /// True when nothing cleared the threshold
    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// Highest dominant frequency; `None` for an empty set
    pub fn max_frequency(&self) -> Option<f64> {
        self.peaks
            .iter()
            .map(|p| p.frequency)
            .fold(None, |acc: Option<f64>, f| Some(acc.map_or(f, |a| a.max(f))))
    }

    /// Format peaks as text table
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str("Dominant Frequencies\n");
        output.push_str(&"═".repeat(44));
        output.push('\n');
        output.push_str(&format!(
            "{:>4}  {:>14}  {:>12}  {:>6}\n",
            "#", "Frequency (Hz)", "Magnitude", "Bin"
        ));
        output.push_str(&"─".repeat(44));
        output.push('\n');

        for (i, peak) in self.peaks.iter().enumerate() {
            output.push_str(&format!(
                "{:>4}  {:>14.2}  {:>12.4}  {:>6}\n",
                i + 1,
                peak.frequency,
                peak.magnitude,
                peak.bin_index
            ));
        }

        if self.peaks.is_empty() {
            output.push_str("  No peaks found above threshold\n");
        }

        output
    }

    /// Format peaks as CSV
    pub fn to_csv(&self) -> String {
        let mut output = String::from("frequency_hz,magnitude,bin_index\n");
        for peak in &self.peaks {
            output.push_str(&format!(
                "{},{},{}\n",
                peak.frequency, peak.magnitude, peak.bin_index
            ));
        }
        output
    }
}

/// Peak detection configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakFinder {
    /// Minimum magnitude a peak must exceed
    pub threshold: f64,
    /// Keep only this many strongest peaks (all when `None`)
    pub max_frequencies: Option<usize>,
}

impl Default for PeakFinder {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_frequencies: None,
        }
    }
}

impl PeakFinder {
    /// Create a new peak finder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the magnitude threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Limit the number of peaks kept
    pub fn with_max_frequencies(mut self, max_frequencies: usize) -> Self {
        self.max_frequencies = Some(max_frequencies);
        self
    }

    /// Find dominant frequencies in a spectrum
    pub fn find_dominant(&self, spectrum: &SpectralProfile) -> DominantFrequencySet {
        let (frequencies, magnitudes) = spectrum.positive_half();
        self.find_in_magnitudes(magnitudes, frequencies)
    }

    /// Find peaks in a raw magnitude sequence
    ///
    /// A peak is a rise followed by a fall. Flat tops count once, at the
    /// middle of the plateau (lower middle for even widths). The first and
    /// last bins are never peaks.
    pub fn find_in_magnitudes(&self, magnitudes: &[f64], frequencies: &[f64]) -> DominantFrequencySet {
        let n = magnitudes.len().min(frequencies.len());
        if n < 3 {
            return DominantFrequencySet::default();
        }

        let mut peaks = Vec::new();
        let mut i = 1;
        while i < n - 1 {
            if magnitudes[i - 1] < magnitudes[i] {
                // Walk to the end of any plateau
                let mut ahead = i + 1;
                while ahead < n - 1 && magnitudes[ahead] == magnitudes[i] {
                    ahead += 1;
                }
                if magnitudes[ahead] < magnitudes[i] {
                    let mid = (i + ahead - 1) / 2;
                    if magnitudes[mid] > self.threshold {
                        peaks.push(SpectralPeak {
                            frequency: frequencies[mid],
                            magnitude: magnitudes[mid],
                            bin_index: mid,
                        });
                    }
                    i = ahead;
                }
            }
            i += 1;
        }

        peaks.sort_by(|a, b| {
            b.magnitude
                .partial_cmp(&a.magnitude)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        if let Some(k) = self.max_frequencies {
            peaks.truncate(k);
        }

        DominantFrequencySet { peaks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SpectralAnalyzer;
    use crate::synth::SignalSynthesizer;
    use crate::types::{Signal, SignalTerm};

    fn three_tone() -> Signal {
        SignalSynthesizer::new(1000.0, 1.0)
            .synthesize(&[
                SignalTerm::new(5.0, 1.0),
                SignalTerm::new(20.0, 1.0),
                SignalTerm::new(50.0, 1.0),
            ])
            .unwrap()
    }

    #[test]
    fn test_three_tone_dominant_frequencies() {
        let spectrum = SpectralAnalyzer::new().compute(&three_tone()).unwrap();
        let dominant = PeakFinder::new().find_dominant(&spectrum);

        assert_eq!(dominant.len(), 3, "found {:?}", dominant.frequencies());

        let mut freqs = dominant.frequencies();
        freqs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for (found, expected) in freqs.iter().zip([5.0, 20.0, 50.0]) {
            assert!(
                (found - expected).abs() <= spectrum.freq_resolution,
                "Peak at {} Hz, expected {} Hz",
                found,
                expected
            );
        }

        let mags: Vec<f64> = dominant.peaks().iter().map(|p| p.magnitude).collect();
        assert!(mags.windows(2).all(|w| w[0] >= w[1]));
        for m in &mags {
            assert!((m - mags[0]).abs() / mags[0] < 1e-6);
        }

        assert!((dominant.max_frequency().unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_frequencies_truncates() {
        let signal = SignalSynthesizer::new(1000.0, 1.0)
            .synthesize(&[
                SignalTerm::new(5.0, 3.0),
                SignalTerm::new(20.0, 2.0),
                SignalTerm::new(50.0, 1.0),
            ])
            .unwrap();
        let spectrum = SpectralAnalyzer::new().compute(&signal).unwrap();
        let dominant = PeakFinder::new()
            .with_max_frequencies(2)
            .find_dominant(&spectrum);

        assert_eq!(dominant.len(), 2);
        assert!((dominant.frequencies()[0] - 5.0).abs() < 1e-9);
        assert!((dominant.frequencies()[1] - 20.0).abs() < 1e-9);
        assert!((dominant.max_frequency().unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_peaks_in_flat_signal() {
        let signal = Signal::from_uniform(1000.0, vec![0.0; 1000]).unwrap();
        let spectrum = SpectralAnalyzer::new().compute(&signal).unwrap();
        let dominant = PeakFinder::new().find_dominant(&spectrum);

        assert!(dominant.is_empty());
        assert_eq!(dominant.max_frequency(), None);

        let flat = vec![1.0; 64];
        let freqs: Vec<f64> = (0..64).map(|i| i as f64).collect();
        assert!(PeakFinder::new().find_in_magnitudes(&flat, &freqs).is_empty());
    }

    #[test]
    fn test_threshold_filters_small_peaks() {
        let mags = [0.0, 5.0, 0.0, 0.05, 0.0];
        let freqs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let dominant = PeakFinder::new().find_in_magnitudes(&mags, &freqs);
        assert_eq!(dominant.frequencies(), vec![1.0]);
    }

    #[test]
    fn test_plateau_peak_reported_at_midpoint() {
        let finder = PeakFinder::new();

        let two_wide = finder.find_in_magnitudes(&[0.0, 1.0, 1.0, 0.0], &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(two_wide.len(), 1, "found {:?}", two_wide.frequencies());
        assert_eq!(two_wide.peaks()[0].bin_index, 1);

        let three_wide =
            finder.find_in_magnitudes(&[0.0, 1.0, 1.0, 1.0, 0.0], &[0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(three_wide.len(), 1, "found {:?}", three_wide.frequencies());
        assert_eq!(three_wide.peaks()[0].bin_index, 2);
        assert!((three_wide.peaks()[0].magnitude - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_plateau_without_fall_is_not_a_peak() {
        // Flat step that keeps rising, then a real peak
        let mags = [0.0, 2.0, 2.0, 3.0, 0.0];
        let freqs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let dominant = PeakFinder::new().find_in_magnitudes(&mags, &freqs);
        assert_eq!(dominant.frequencies(), vec![3.0]);

        // Plateau running into the last bin never falls
        let edge = PeakFinder::new().find_in_magnitudes(&[0.0, 1.0, 1.0], &[0.0, 1.0, 2.0]);
        assert!(edge.is_empty(), "found {:?}", edge.frequencies());
    }

    #[test]
    fn test_flat_topped_tone_still_bounds_sampling() {
        // Two adjacent bins of equal height around a single tone
        let mut mags = vec![0.0; 32];
        mags[10] = 4.0;
        mags[11] = 4.0;
        let freqs: Vec<f64> = (0..32).map(|i| i as f64 * 0.5).collect();
        let dominant = PeakFinder::new().find_in_magnitudes(&mags, &freqs);
        assert_eq!(dominant.len(), 1);
        assert!((dominant.max_frequency().unwrap() - 5.0).abs() < 1e-12);
    }
}
