//! Signal Statistics
//!
//! Time-domain statistics for real signals, plus error metrics comparing a
//! reconstruction against its reference.

use serde::Serialize;

/// Power floor below which dB values are clamped
const POWER_FLOOR: f64 = 1e-20;

/// Floor value reported for silent signals
const DB_FLOOR: f64 = -200.0;

fn power_to_db(power: f64) -> f64 {
    if power > POWER_FLOOR {
        10.0 * power.log10()
    } else {
        DB_FLOOR
    }
}

/// Mean of squared values (0.0 for an empty slice)
pub fn mean_power(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|x| x * x).sum::<f64>() / samples.len() as f64
}

/// Root-mean-square amplitude
pub fn rms(samples: &[f64]) -> f64 {
    mean_power(samples).sqrt()
}

/// Summary statistics of a real signal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalStats {
    /// Number of samples analyzed
    pub num_samples: usize,
    /// Signal duration in seconds (if sample rate provided)
    pub duration_sec: Option<f64>,
    /// Mean value (DC)
    pub mean: f64,
    /// Mean of squared amplitude
    pub mean_power: f64,
    /// Mean power in dB
    pub mean_power_db: f64,
    /// RMS amplitude
    pub rms_amplitude: f64,
    /// Largest absolute amplitude
    pub peak_amplitude: f64,
    /// Crest factor in dB
    pub crest_factor_db: f64,
    /// Minimum amplitude
    pub min: f64,
    /// Maximum amplitude
    pub max: f64,
    /// Sample rate (if provided)
    pub sample_rate: Option<f64>,
}

impl SignalStats {
    /// Compute statistics for the given samples
    pub fn compute(samples: &[f64], sample_rate: Option<f64>) -> Self {
        if samples.is_empty() {
            return Self::empty(sample_rate);
        }

        let num_samples = samples.len();
        let n = num_samples as f64;
        let duration_sec = sample_rate.map(|sr| n / sr);

        let mean = samples.iter().sum::<f64>() / n;
        let mean_power = mean_power(samples);
        let rms_amplitude = mean_power.sqrt();

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut peak_amplitude: f64 = 0.0;
        for &x in samples {
            min = min.min(x);
            max = max.max(x);
            peak_amplitude = peak_amplitude.max(x.abs());
        }

        let crest_factor_db = 20.0 * (peak_amplitude / rms_amplitude.max(POWER_FLOOR)).log10();

        Self {
            num_samples,
            duration_sec,
            mean,
            mean_power,
            mean_power_db: power_to_db(mean_power),
            rms_amplitude,
            peak_amplitude,
            crest_factor_db: crest_factor_db.max(0.0),
            min,
            max,
            sample_rate,
        }
    }

    fn empty(sample_rate: Option<f64>) -> Self {
        Self {
            num_samples: 0,
            duration_sec: Some(0.0),
            mean: 0.0,
            mean_power: 0.0,
            mean_power_db: DB_FLOOR,
            rms_amplitude: 0.0,
            peak_amplitude: 0.0,
            crest_factor_db: 0.0,
            min: 0.0,
            max: 0.0,
            sample_rate,
        }
    }

    /// Format as text report
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str("Signal Statistics\n");
        output.push_str(&"═".repeat(50));
        output.push('\n');

        output.push_str(&format!("Samples:           {}\n", self.num_samples));
        if let Some(dur) = self.duration_sec {
            output.push_str(&format!("Duration:          {:.6} s\n", dur));
        }
        if let Some(sr) = self.sample_rate {
            output.push_str(&format!("Sample Rate:       {:.0} Hz\n", sr));
        }

        output.push_str("\nPower\n");
        output.push_str(&"─".repeat(50));
        output.push('\n');
        output.push_str(&format!("Mean Power:        {:.6} ({:.2} dB)\n", self.mean_power, self.mean_power_db));
        output.push_str(&format!("Crest Factor:      {:.2} dB\n", self.crest_factor_db));

        output.push_str("\nAmplitude\n");
        output.push_str(&"─".repeat(50));
        output.push('\n');
        output.push_str(&format!("DC Mean:           {:.6}\n", self.mean));
        output.push_str(&format!("RMS Amplitude:     {:.6}\n", self.rms_amplitude));
        output.push_str(&format!("Peak Amplitude:    {:.6}\n", self.peak_amplitude));
        output.push_str(&format!("Range:             [{:.6}, {:.6}]\n", self.min, self.max));

        output
    }
}

/// Error between a reference signal and a reconstruction of it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconstructionError {
    /// Mean squared error
    pub mse: f64,
    /// Root of the mean squared error
    pub rmse: f64,
    /// Largest absolute sample difference
    pub max_abs_error: f64,
    /// Reference power over error power in dB
    pub snr_db: f64,
}

impl ReconstructionError {
    /// Compare two equally long sequences (extra samples in the longer one are ignored)
    pub fn compute(reference: &[f64], reconstructed: &[f64]) -> Self {
        let diff = difference(reference, reconstructed);
        let mse = mean_power(&diff);
        let max_abs_error = diff.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
        let signal_power = mean_power(&reference[..diff.len()]);

        let snr_db = if mse > POWER_FLOOR {
            power_to_db(signal_power) - power_to_db(mse)
        } else {
            f64::INFINITY
        };

        Self {
            mse,
            rmse: mse.sqrt(),
            max_abs_error,
            snr_db,
        }
    }
}

/// Sample-wise `reference - reconstructed`
pub fn difference(reference: &[f64], reconstructed: &[f64]) -> Vec<f64> {
    reference
        .iter()
        .zip(reconstructed.iter())
        .map(|(r, x)| r - x)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_stats_empty() {
        let stats = SignalStats::compute(&[], Some(1000.0));
        assert_eq!(stats.num_samples, 0);
        assert_eq!(stats.mean_power, 0.0);
    }

    #[test]
    fn test_stats_single_tone() {
        let sample_rate = 1000.0;
        let amplitude = 0.5;

        let samples: Vec<f64> = (0..1000)
            .map(|i| amplitude * (2.0 * PI * 10.0 * i as f64 / sample_rate).sin())
            .collect();

        let stats = SignalStats::compute(&samples, Some(sample_rate));

        // RMS of a sine is A/sqrt(2)
        let expected = amplitude / 2.0_f64.sqrt();
        assert!(
            (stats.rms_amplitude - expected).abs() < 1e-6,
            "RMS {} != expected {}",
            stats.rms_amplitude,
            expected
        );
        assert!(stats.mean.abs() < 1e-9);
        assert!((stats.crest_factor_db - 3.0103).abs() < 0.01);
        assert_eq!(stats.duration_sec, Some(1.0));
    }

    #[test]
    fn test_stats_dc() {
        let stats = SignalStats::compute(&[0.25; 100], None);
        assert!((stats.mean - 0.25).abs() < 1e-12);
        assert!((stats.mean_power - 0.0625).abs() < 1e-12);
        assert_eq!(stats.min, 0.25);
        assert_eq!(stats.max, 0.25);
    }

    #[test]
    fn test_reconstruction_error() {
        let reference = [1.0, -1.0, 1.0, -1.0];
        let reconstructed = [1.0, -1.0, 0.5, -1.0];
        let err = ReconstructionError::compute(&reference, &reconstructed);

        assert!((err.mse - 0.0625).abs() < 1e-12);
        assert!((err.max_abs_error - 0.5).abs() < 1e-12);
        assert!((err.snr_db - 10.0 * (1.0_f64 / 0.0625).log10()).abs() < 1e-9);

        let perfect = ReconstructionError::compute(&reference, &reference);
        assert_eq!(perfect.mse, 0.0);
        assert!(perfect.snr_db.is_infinite());
    }
}
