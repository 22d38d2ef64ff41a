//! Sampling Experiment Pipeline
//!
//! Ties the engine together for one signal:
//!
//! ```text
//! Signal ─► analyze ─► bounds ─► rate
//!   │                              │
//!   ├─► NoiseModel ─► noisy        ▼
//!   └────────────────────────► Sampler ─► reconstruct ─► degrade ─► error
//! ```
//!
//! The analysis is computed once in [`Experiment::new`]; every run after that
//! is a pure function of the stored signal and the run parameters. A seeded
//! configuration reseeds the noise source per run, so repeated runs agree.
//!
//! ## Usage
//!
//! ```rust
//! use nyq_core::prelude::*;
//! use nyq_sim::pipeline::{Experiment, ExperimentConfig};
//!
//! let signal = SignalSynthesizer::default()
//!     .synthesize(&[SignalTerm::new(5.0, 1.0), SignalTerm::new(20.0, 0.5)])
//!     .unwrap();
//!
//! let experiment = Experiment::new(signal, ExperimentConfig::default()).unwrap();
//! let output = experiment.run().unwrap();
//! assert_eq!(output.sampling.target_rate_hz, 41.0);
//! ```

use crate::noise::{NoiseModel, NoiseSpec, NoiseStats};
use nyq_core::analysis::alias::DEFAULT_NUM_REPEATS;
use nyq_core::analysis::statistics::difference;
use nyq_core::analysis::{
    AliasBand, AliasBandProjector, DominantFrequencySet, PeakFinder, ReconstructionError,
    SpectralAnalyzer, SpectralProfile,
};
use nyq_core::error::{NyqError, NyqResult};
use nyq_core::reconstruct::{degradation_scale, reconstruct, ReconstructedSignal, ReconstructionMethod};
use nyq_core::sampling::{Sampler, SamplingBounds, SamplingConfiguration};
use nyq_core::types::{Signal, SparseSample};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Shortest signal the pipeline accepts
pub const MIN_SIGNAL_SAMPLES: usize = 10;

/// Dominant-frequency extraction settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum raw DFT magnitude of a peak
    pub threshold: f64,
    /// Keep only the strongest peaks
    pub max_frequencies: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let finder = PeakFinder::default();
        Self {
            threshold: finder.threshold,
            max_frequencies: finder.max_frequencies,
        }
    }
}

impl AnalysisConfig {
    /// Peak finder for these settings
    pub fn peak_finder(&self) -> PeakFinder {
        let finder = PeakFinder::new().with_threshold(self.threshold);
        match self.max_frequencies {
            Some(k) => finder.with_max_frequencies(k),
            None => finder,
        }
    }
}

/// Parameters of one experiment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Sampling rate in Hz; the Nyquist-plus-one rate when unset
    pub target_rate_hz: Option<f64>,
    /// Interpolation kernel
    pub method: ReconstructionMethod,
    /// Noise on the baseline signal
    pub noise: NoiseSpec,
    /// Noise seed; entropy-seeded when unset
    pub seed: Option<u64>,
    /// Alias replicas per side of the baseband
    pub alias_repeats: usize,
    /// Clamp the rate into `[1, 4·f_max]` instead of using it as given
    pub clamp_to_bounds: bool,
    /// Dominant-frequency settings
    pub analysis: AnalysisConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            target_rate_hz: None,
            method: ReconstructionMethod::default(),
            noise: NoiseSpec::disabled(),
            seed: None,
            alias_repeats: DEFAULT_NUM_REPEATS,
            clamp_to_bounds: true,
            analysis: AnalysisConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Set the sampling rate
    pub fn with_rate(mut self, rate_hz: f64) -> Self {
        self.target_rate_hz = Some(rate_hz);
        self
    }

    /// Set the reconstruction method
    pub fn with_method(mut self, method: ReconstructionMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the noise spec
    pub fn with_noise(mut self, noise: NoiseSpec) -> Self {
        self.noise = noise;
        self
    }

    /// Fix the noise seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Spectrum, dominant frequencies and rate bounds of a signal
#[derive(Debug, Clone, Serialize)]
pub struct SignalAnalysis {
    /// Full DFT magnitude spectrum
    pub profile: SpectralProfile,
    /// Peaks above threshold, strongest first
    pub dominant: DominantFrequencySet,
    /// Rate range; `None` when no dominant frequency was found
    pub bounds: Option<SamplingBounds>,
}

/// Analyze a signal
pub fn analyze(signal: &Signal, config: &AnalysisConfig) -> NyqResult<SignalAnalysis> {
    let profile = SpectralAnalyzer::new().compute(signal)?;
    let dominant = config.peak_finder().find_dominant(&profile);
    let bounds = SamplingBounds::from_dominant(&dominant);

    debug!(
        peaks = dominant.len(),
        max_frequency = ?dominant.max_frequency(),
        "analyzed signal"
    );

    Ok(SignalAnalysis {
        profile,
        dominant,
        bounds,
    })
}

/// Everything one run produces
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentOutput {
    /// Rate actually used
    pub sampling: SamplingConfiguration,
    /// Whether the rate reaches the Nyquist-plus-one rate
    pub satisfies_nyquist: bool,
    /// Baseline signal with noise
    pub noisy: Signal,
    /// Measured baseline noise
    pub noise_stats: NoiseStats,
    /// Samples taken from the clean signal
    pub sparse: SparseSample,
    /// Noiseless reconstruction on the original axis
    pub reconstructed: ReconstructedSignal,
    /// Reconstruction with the scaled noise added
    pub degraded: Signal,
    /// Scale applied to the baseline noise power
    pub noise_scale: f64,
    /// `noisy - degraded`
    pub difference: Vec<f64>,
    /// Error of `degraded` against `noisy`
    pub error: ReconstructionError,
    /// Error of the noiseless reconstruction against the clean signal
    pub clean_error: ReconstructionError,
    /// Spectral replicas at multiples of the rate
    pub alias_bands: Vec<AliasBand>,
}

/// One row of a rate sweep
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    /// Sampling rate in Hz
    pub rate_hz: f64,
    /// Index stride used
    pub stride: usize,
    /// Number of samples kept
    pub num_samples: usize,
    /// Whether the rate reaches the Nyquist-plus-one rate
    pub satisfies_nyquist: bool,
    /// True when the method fell back to zeros
    pub fallback: bool,
    /// Error against the noisy baseline
    pub error: ReconstructionError,
    /// Error of the noiseless reconstruction against the clean signal
    pub clean_error: ReconstructionError,
}

impl From<&ExperimentOutput> for SweepPoint {
    fn from(output: &ExperimentOutput) -> Self {
        Self {
            rate_hz: output.sampling.target_rate_hz,
            stride: output.sparse.stride(),
            num_samples: output.sparse.len(),
            satisfies_nyquist: output.satisfies_nyquist,
            fallback: output.reconstructed.is_fallback(),
            error: output.error.clone(),
            clean_error: output.clean_error.clone(),
        }
    }
}

/// `steps` rates evenly spaced over the bounds, inclusive
pub fn sweep_rates(bounds: &SamplingBounds, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![bounds.max_rate_hz],
        _ => {
            let span = bounds.max_rate_hz - bounds.min_rate_hz;
            (0..steps)
                .map(|i| bounds.min_rate_hz + span * i as f64 / (steps - 1) as f64)
                .collect()
        }
    }
}

/// A signal with its analysis, ready to be sampled and rebuilt
#[derive(Debug, Clone)]
pub struct Experiment {
    signal: Signal,
    analysis: SignalAnalysis,
    config: ExperimentConfig,
}

impl Experiment {
    /// Validate and analyze `signal`
    pub fn new(signal: Signal, config: ExperimentConfig) -> NyqResult<Self> {
        if signal.len() < MIN_SIGNAL_SAMPLES {
            return Err(NyqError::EmptySignal(format!(
                "signal is too short: {} samples, need at least {}",
                signal.len(),
                MIN_SIGNAL_SAMPLES
            )));
        }
        let analysis = analyze(&signal, &config.analysis)?;

        Ok(Self {
            signal,
            analysis,
            config,
        })
    }

    /// The clean signal
    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    /// Spectrum and bounds of the clean signal
    pub fn analysis(&self) -> &SignalAnalysis {
        &self.analysis
    }

    /// Rate bounds; `None` for a signal without dominant frequencies
    pub fn bounds(&self) -> Option<&SamplingBounds> {
        self.analysis.bounds.as_ref()
    }

    /// Configuration used by [`Experiment::run`]
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Turn a requested rate into the rate a run will use
    pub fn resolve_rate(&self, requested: Option<f64>) -> NyqResult<SamplingConfiguration> {
        match (requested, self.bounds()) {
            (Some(rate), Some(bounds)) if self.config.clamp_to_bounds => {
                SamplingConfiguration::bounded(rate, bounds)
            }
            (Some(rate), _) => SamplingConfiguration::new(rate),
            (None, Some(bounds)) => Ok(SamplingConfiguration::at_minimum_valid(bounds)),
            (None, None) => Err(NyqError::invalid_parameter(
                "target_rate_hz",
                "signal has no dominant frequency above threshold; give an explicit rate",
            )),
        }
    }

    /// Run with the stored configuration
    pub fn run(&self) -> NyqResult<ExperimentOutput> {
        self.run_with(self.config.target_rate_hz, self.config.method)
    }

    /// Run at another rate and method
    pub fn run_with(
        &self,
        target_rate_hz: Option<f64>,
        method: ReconstructionMethod,
    ) -> NyqResult<ExperimentOutput> {
        let sampling = self.resolve_rate(target_rate_hz)?;
        let rate = sampling.target_rate_hz;
        let mut noise = NoiseModel::from_optional_seed(self.config.noise, self.config.seed);

        let noisy = noise.apply(&self.signal)?;
        let noise_stats = NoiseStats::compute(self.signal.amplitude(), noisy.amplitude());

        let sparse = Sampler.sample(&self.signal, &sampling)?;
        let reconstructed = reconstruct(method, &sparse, self.signal.time());

        let noise_scale = self
            .bounds()
            .map_or(0.0, |b| degradation_scale(rate, b.max_rate_hz));
        let degraded = noise.degrade(&reconstructed.to_signal()?, noise_stats.noise_power, noise_scale)?;

        let difference = difference(noisy.amplitude(), degraded.amplitude());
        let error = ReconstructionError::compute(noisy.amplitude(), degraded.amplitude());
        let clean_error = ReconstructionError::compute(self.signal.amplitude(), &reconstructed.amplitude);

        let alias_bands =
            AliasBandProjector::new(self.config.alias_repeats).project(&self.analysis.profile, rate)?;

        let satisfies_nyquist = self.bounds().map_or(false, |b| b.satisfies_nyquist(rate));

        info!(
            "{} at {:.1} Hz: {} samples (stride {}), RMSE {:.4}",
            method.name(),
            rate,
            sparse.len(),
            sparse.stride(),
            error.rmse
        );

        Ok(ExperimentOutput {
            sampling,
            satisfies_nyquist,
            noisy,
            noise_stats,
            sparse,
            reconstructed,
            degraded,
            noise_scale,
            difference,
            error,
            clean_error,
            alias_bands,
        })
    }

    /// Run once per rate with the configured method
    pub fn sweep(&self, rates: &[f64]) -> NyqResult<Vec<SweepPoint>> {
        rates
            .iter()
            .map(|&rate| {
                self.run_with(Some(rate), self.config.method)
                    .map(|output| SweepPoint::from(&output))
            })
            .collect()
    }
}

/// One-shot convenience for [`Experiment::new`] followed by [`Experiment::run`]
pub fn run(signal: Signal, config: ExperimentConfig) -> NyqResult<ExperimentOutput> {
    Experiment::new(signal, config)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nyq_core::types::SignalTerm;
    use nyq_core::SignalSynthesizer;

    fn two_tone() -> Signal {
        SignalSynthesizer::default()
            .synthesize(&[SignalTerm::new(5.0, 1.0), SignalTerm::new(20.0, 0.5)])
            .unwrap()
    }

    #[test]
    fn test_default_rate_is_minimum_valid() {
        let experiment = Experiment::new(two_tone(), ExperimentConfig::default()).unwrap();
        let bounds = experiment.bounds().unwrap();
        assert_eq!(bounds.minimum_valid_rate, 41.0);
        assert!((bounds.max_rate_hz - 80.0).abs() < 1e-9);

        let output = experiment.run().unwrap();
        assert_eq!(output.sampling.target_rate_hz, 41.0);
        assert!(output.satisfies_nyquist);
        assert_eq!(output.reconstructed.amplitude.len(), 1000);
        assert_eq!(output.alias_bands.len(), 2 * DEFAULT_NUM_REPEATS);
    }

    #[test]
    fn test_rate_is_clamped() {
        let config = ExperimentConfig::default().with_rate(500.0);
        let output = run(two_tone(), config).unwrap();
        assert!((output.sampling.target_rate_hz - 80.0).abs() < 1e-9);
        assert_eq!(output.noise_scale, 0.0);

        let unclamped = ExperimentConfig {
            clamp_to_bounds: false,
            ..config
        };
        let output = run(two_tone(), unclamped).unwrap();
        assert_eq!(output.sampling.target_rate_hz, 500.0);
    }

    #[test]
    fn test_short_signal_rejected() {
        let signal = Signal::from_uniform(100.0, vec![0.0, 1.0, 0.0, -1.0, 0.0]).unwrap();
        assert!(matches!(
            Experiment::new(signal, ExperimentConfig::default()),
            Err(NyqError::EmptySignal(_))
        ));
    }

    #[test]
    fn test_flat_signal_needs_explicit_rate() {
        let flat = Signal::from_uniform(1000.0, vec![0.0; 1000]).unwrap();
        let experiment = Experiment::new(flat, ExperimentConfig::default()).unwrap();
        assert!(experiment.bounds().is_none());
        assert!(matches!(
            experiment.run(),
            Err(NyqError::InvalidParameter { .. })
        ));

        let output = experiment.run_with(Some(41.0), ReconstructionMethod::ZeroOrderHold).unwrap();
        assert_eq!(output.noise_scale, 0.0);
        assert!(!output.satisfies_nyquist);
        assert!(output.degraded.amplitude().iter().all(|&a| a == 0.0));
    }

    #[test]
    fn test_sweep_rates() {
        let bounds = SamplingBounds::from_max_frequency(25.0).unwrap();
        let rates = sweep_rates(&bounds, 5);
        assert_eq!(rates.len(), 5);
        assert_eq!(rates[0], 1.0);
        assert!((rates[4] - 100.0).abs() < 1e-9);
        assert!(sweep_rates(&bounds, 0).is_empty());
    }

    #[test]
    fn test_config_json_defaults() {
        let config: ExperimentConfig =
            serde_json::from_str(r#"{"target_rate_hz": 60.0, "seed": 3}"#).unwrap();
        assert_eq!(config.target_rate_hz, Some(60.0));
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.method, ReconstructionMethod::SincInterpolation);
        assert!(config.clamp_to_bounds);
        assert_eq!(config.alias_repeats, DEFAULT_NUM_REPEATS);
        assert_eq!(config.analysis, AnalysisConfig::default());
    }
}
