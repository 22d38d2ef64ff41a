//! Sampling Rate Bounds and Strided Sampling
//!
//! The allowed sampling-rate range is derived from the highest dominant
//! frequency `f_max`: rates run from 1 Hz up to `4·f_max`, and the lowest
//! rate that still satisfies Nyquist (plus one hertz of margin) is
//! `round(2·f_max + 1)`.
//!
//! The sampler itself works in the index domain: it keeps every `stride`-th
//! sample of the dense signal rather than resampling onto a new grid.

use crate::analysis::peaks::DominantFrequencySet;
use crate::error::{NyqError, NyqResult};
use crate::types::{Signal, SparseSample};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Lowest selectable sampling rate in Hz
pub const MIN_RATE_HZ: f64 = 1.0;

/// Upper bound of the rate range as a multiple of `f_max`
pub const MAX_RATE_FACTOR: f64 = 4.0;

/// `round(2·f_max + 1)`; `None` when `f_max` is zero, negative or not finite
pub fn minimum_valid_rate(max_dominant_frequency: f64) -> Option<f64> {
    if max_dominant_frequency.is_finite() && max_dominant_frequency > 0.0 {
        Some((2.0 * max_dominant_frequency + 1.0).round())
    } else {
        None
    }
}

/// Sampling-rate range derived from the dominant frequencies
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingBounds {
    /// Highest dominant frequency in Hz
    pub max_dominant_frequency: f64,
    /// Lower end of the range
    pub min_rate_hz: f64,
    /// Upper end of the range, `4·f_max`
    pub max_rate_hz: f64,
    /// Nyquist-plus-one rate
    pub minimum_valid_rate: f64,
}

impl SamplingBounds {
    /// Bounds for a known `f_max`
    pub fn from_max_frequency(max_dominant_frequency: f64) -> Option<Self> {
        let minimum_valid_rate = minimum_valid_rate(max_dominant_frequency)?;
        Some(Self {
            max_dominant_frequency,
            min_rate_hz: MIN_RATE_HZ,
            max_rate_hz: (MAX_RATE_FACTOR * max_dominant_frequency).max(MIN_RATE_HZ),
            minimum_valid_rate,
        })
    }

    /// Bounds for a dominant set; `None` when the set is empty
    pub fn from_dominant(dominant: &DominantFrequencySet) -> Option<Self> {
        dominant.max_frequency().and_then(Self::from_max_frequency)
    }

    /// Clamp a requested rate into the range
    pub fn clamp(&self, rate_hz: f64) -> f64 {
        rate_hz.clamp(self.min_rate_hz, self.max_rate_hz)
    }

    /// True when `rate_hz` reaches the Nyquist-plus-one rate
    pub fn satisfies_nyquist(&self, rate_hz: f64) -> bool {
        rate_hz >= self.minimum_valid_rate
    }

    /// Rate as a whole percentage of `f_max`
    pub fn rate_percent(&self, rate_hz: f64) -> f64 {
        (rate_hz / self.max_dominant_frequency * 100.0).round()
    }
}

/// The sampling rate selected for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfiguration {
    /// Target sampling rate in Hz
    pub target_rate_hz: f64,
}

impl SamplingConfiguration {
    /// Unbounded configuration; the rate must be positive and finite
    pub fn new(target_rate_hz: f64) -> NyqResult<Self> {
        if !(target_rate_hz.is_finite() && target_rate_hz > 0.0) {
            return Err(NyqError::invalid_parameter(
                "target_rate_hz",
                format!("must be positive, got {}", target_rate_hz),
            ));
        }
        Ok(Self { target_rate_hz })
    }

    /// Configuration clamped into `bounds`
    pub fn bounded(target_rate_hz: f64, bounds: &SamplingBounds) -> NyqResult<Self> {
        let requested = Self::new(target_rate_hz)?;
        let clamped = bounds.clamp(requested.target_rate_hz);
        if clamped != requested.target_rate_hz {
            warn!(
                "sampling rate {} Hz outside [{}, {}], using {} Hz",
                target_rate_hz, bounds.min_rate_hz, bounds.max_rate_hz, clamped
            );
        }
        Ok(Self {
            target_rate_hz: clamped,
        })
    }

    /// Snap to the Nyquist-plus-one rate
    pub fn at_minimum_valid(bounds: &SamplingBounds) -> Self {
        Self {
            target_rate_hz: bounds.clamp(bounds.minimum_valid_rate),
        }
    }
}

/// Strided downsampler
#[derive(Debug, Clone, Copy, Default)]
pub struct Sampler;

impl Sampler {
    /// Index stride `max(1, floor(1 / (rate·dt)))`
    pub fn stride(time_step: f64, target_rate_hz: f64) -> usize {
        let raw = (1.0 / (target_rate_hz * time_step)).floor();
        if raw.is_finite() && raw >= 1.0 {
            raw as usize
        } else if raw.is_infinite() && raw > 0.0 {
            usize::MAX
        } else {
            1
        }
    }

    /// Keep every `stride`-th sample of `signal`
    pub fn sample(&self, signal: &Signal, config: &SamplingConfiguration) -> NyqResult<SparseSample> {
        signal.ensure_usable("sampler")?;
        let config = SamplingConfiguration::new(config.target_rate_hz)?;

        let stride = Self::stride(signal.mean_time_step(), config.target_rate_hz);
        let sparse = SparseSample::strided(signal, stride);

        debug!(
            rate_hz = config.target_rate_hz,
            stride,
            kept = sparse.len(),
            "sampled signal"
        );
        Ok(sparse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{PeakFinder, SpectralAnalyzer};
    use crate::synth::SignalSynthesizer;
    use crate::types::SignalTerm;

    #[test]
    fn test_minimum_valid_rate() {
        assert_eq!(minimum_valid_rate(50.0), Some(101.0));
        assert_eq!(minimum_valid_rate(20.4), Some(42.0));
        assert_eq!(minimum_valid_rate(0.0), None);
        assert_eq!(minimum_valid_rate(f64::NAN), None);
    }

    #[test]
    fn test_bounds_from_dominant() {
        let signal = SignalSynthesizer::default()
            .synthesize(&[SignalTerm::new(5.0, 1.0), SignalTerm::new(50.0, 1.0)])
            .unwrap();
        let spectrum = SpectralAnalyzer::new().compute(&signal).unwrap();
        let dominant = PeakFinder::new().find_dominant(&spectrum);

        let bounds = SamplingBounds::from_dominant(&dominant).unwrap();
        assert!((bounds.max_rate_hz - 200.0).abs() < 1e-9);
        assert_eq!(bounds.minimum_valid_rate, 101.0);
        assert_eq!(bounds.min_rate_hz, 1.0);
        assert!(bounds.satisfies_nyquist(101.0));
        assert!(!bounds.satisfies_nyquist(100.0));
    }

    #[test]
    fn test_empty_dominant_has_no_bounds() {
        assert!(SamplingBounds::from_dominant(&DominantFrequencySet::default()).is_none());
    }

    #[test]
    fn test_bounded_configuration_clamps() {
        let bounds = SamplingBounds::from_max_frequency(50.0).unwrap();
        let config = SamplingConfiguration::bounded(1000.0, &bounds).unwrap();
        assert_eq!(config.target_rate_hz, 200.0);
        let config = SamplingConfiguration::bounded(0.25, &bounds).unwrap();
        assert_eq!(config.target_rate_hz, 1.0);
        assert!(SamplingConfiguration::bounded(-3.0, &bounds).is_err());

        let snapped = SamplingConfiguration::at_minimum_valid(&bounds);
        assert_eq!(snapped.target_rate_hz, 101.0);
        assert_eq!(bounds.rate_percent(101.0), 202.0);
    }

    #[test]
    fn test_stride() {
        assert_eq!(Sampler::stride(0.001, 1000.0), 1);
        assert_eq!(Sampler::stride(0.001, 2000.0), 1);
        assert_eq!(Sampler::stride(0.001, 41.0), 24);
        assert_eq!(Sampler::stride(0.001, 1.0), 1000);
    }

    #[test]
    fn test_sample_keeps_original_times() {
        let signal = Signal::from_uniform(1000.0, (0..1000).map(|i| i as f64).collect()).unwrap();
        let config = SamplingConfiguration::new(41.0).unwrap();
        let sparse = Sampler.sample(&signal, &config).unwrap();

        assert_eq!(sparse.stride(), 24);
        assert_eq!(sparse.len(), 42);
        for (i, (&t, &a)) in sparse.time().iter().zip(sparse.amplitude()).enumerate() {
            assert_eq!(t, signal.time()[i * 24]);
            assert_eq!(a, signal.amplitude()[i * 24]);
        }
    }

    #[test]
    fn test_low_rate_leaves_single_sample() {
        let signal = Signal::from_uniform(1000.0, vec![1.0; 1000]).unwrap();
        let config = SamplingConfiguration::new(0.9).unwrap();
        let sparse = Sampler.sample(&signal, &config).unwrap();
        assert_eq!(sparse.len(), 1);
        assert!(sparse.spacing().is_none());
    }
}
