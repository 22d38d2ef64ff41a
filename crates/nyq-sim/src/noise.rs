//! Additive Gaussian Noise
//!
//! Noise is specified by a target SNR in dB and converted with the power
//! ratio convention everywhere:
//!
//! ```text
//! snr_linear  = 10^(snr_db / 10)
//! noise_power = signal_power / snr_linear
//! noise_std   = sqrt(noise_power)
//! ```
//!
//! so the noise standard deviation equals the signal RMS scaled by
//! `10^(-snr_db / 20)`. The same conversion feeds the post-reconstruction
//! noise, which is driven by a *measured* noise power rather than an SNR.
//!
//! ## Usage
//!
//! ```rust
//! use nyq_core::prelude::*;
//! use nyq_sim::noise::{NoiseModel, NoiseSpec};
//!
//! let clean = SignalSynthesizer::default()
//!     .synthesize(&[SignalTerm::new(5.0, 1.0)])
//!     .unwrap();
//!
//! let mut model = NoiseModel::with_seed(NoiseSpec::with_snr_db(20.0), 42);
//! let noisy = model.apply(&clean).unwrap();
//! assert_eq!(noisy.len(), clean.len());
//! ```

use nyq_core::analysis::statistics::mean_power;
use nyq_core::error::{NyqError, NyqResult};
use nyq_core::types::Signal;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Power ratio for an SNR in dB
#[inline]
pub fn snr_to_linear(snr_db: f64) -> f64 {
    10.0_f64.powf(snr_db / 10.0)
}

/// Noise power for a signal of `signal_power` at `snr_db`
#[inline]
pub fn noise_power(signal_power: f64, snr_db: f64) -> f64 {
    signal_power / snr_to_linear(snr_db)
}

/// Noise standard deviation for a signal of `signal_power` at `snr_db`
#[inline]
pub fn noise_std(signal_power: f64, snr_db: f64) -> f64 {
    noise_power(signal_power, snr_db).sqrt()
}

/// Target SNR of the injected noise
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSpec {
    /// SNR in dB; `None` disables noise
    pub snr_db: Option<f64>,
}

impl NoiseSpec {
    /// No noise
    pub fn disabled() -> Self {
        Self { snr_db: None }
    }

    /// Noise at `snr_db`
    pub fn with_snr_db(snr_db: f64) -> Self {
        Self {
            snr_db: Some(snr_db),
        }
    }

    /// True when noise will be added
    pub fn is_enabled(&self) -> bool {
        self.snr_db.is_some()
    }

    /// Noise power this spec produces for a signal of `signal_power`
    pub fn noise_power_for(&self, signal_power: f64) -> f64 {
        self.snr_db.map_or(0.0, |snr| noise_power(signal_power, snr))
    }

    fn validate(&self) -> NyqResult<()> {
        match self.snr_db {
            Some(snr) if snr.is_nan() || snr == f64::NEG_INFINITY => Err(
                NyqError::invalid_parameter("snr_db", format!("must be a number, got {}", snr)),
            ),
            _ => Ok(()),
        }
    }
}

/// Maps an SNR percentage onto a dB range.
///
/// `p%` selects `min_db + p/100 · (max_db − min_db)`; 100 % disables noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnrScale {
    /// SNR at 0 %
    pub min_db: f64,
    /// SNR approached as the percentage nears 100 %
    pub max_db: f64,
}

impl Default for SnrScale {
    fn default() -> Self {
        Self {
            min_db: 0.0,
            max_db: 100.0,
        }
    }
}

impl SnrScale {
    /// Create a scale, checking `min_db < max_db`
    pub fn new(min_db: f64, max_db: f64) -> NyqResult<Self> {
        if !(min_db.is_finite() && max_db.is_finite() && min_db < max_db) {
            return Err(NyqError::invalid_parameter(
                "snr_scale",
                format!("need finite min_db < max_db, got [{}, {}]", min_db, max_db),
            ));
        }
        Ok(Self { min_db, max_db })
    }

    /// Convert a percentage in `[0, 100]` to a noise spec
    pub fn spec_for_percent(&self, percent: f64) -> NyqResult<NoiseSpec> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(NyqError::invalid_parameter(
                "snr_percent",
                format!("must lie in [0, 100], got {}", percent),
            ));
        }
        if percent >= 100.0 {
            return Ok(NoiseSpec::disabled());
        }
        Ok(NoiseSpec::with_snr_db(
            self.min_db + percent / 100.0 * (self.max_db - self.min_db),
        ))
    }

    /// Percentage a spec corresponds to (100 for disabled noise)
    pub fn percent_for(&self, spec: &NoiseSpec) -> f64 {
        match spec.snr_db {
            None => 100.0,
            Some(snr) => ((snr - self.min_db) / (self.max_db - self.min_db) * 100.0).clamp(0.0, 100.0),
        }
    }
}

/// Seedable Gaussian noise source
#[derive(Debug)]
pub struct NoiseModel {
    spec: NoiseSpec,
    rng: StdRng,
}

impl NoiseModel {
    /// Noise model seeded from the OS entropy source
    pub fn new(spec: NoiseSpec) -> Self {
        Self {
            spec,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic noise model
    pub fn with_seed(spec: NoiseSpec, seed: u64) -> Self {
        Self {
            spec,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is given, entropy-seeded otherwise
    pub fn from_optional_seed(spec: NoiseSpec, seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(spec, seed),
            None => Self::new(spec),
        }
    }

    /// Current spec
    pub fn spec(&self) -> &NoiseSpec {
        &self.spec
    }

    /// Add noise at the configured SNR.
    ///
    /// Signal power is the mean of squared amplitudes of `signal` itself.
    pub fn apply(&mut self, signal: &Signal) -> NyqResult<Signal> {
        signal.ensure_usable("noise model")?;
        self.spec.validate()?;

        let Some(snr_db) = self.spec.snr_db else {
            return Ok(signal.clone());
        };

        let signal_power = mean_power(signal.amplitude());
        let power = noise_power(signal_power, snr_db);
        debug!(snr_db, signal_power, noise_power = power, "injecting noise");

        self.add_noise_with_power(signal, power)
    }

    /// Add zero-mean Gaussian noise of the given power
    pub fn add_noise_with_power(&mut self, signal: &Signal, power: f64) -> NyqResult<Signal> {
        if !(power.is_finite() && power >= 0.0) {
            return Err(NyqError::invalid_parameter(
                "noise_power",
                format!("must be finite and non-negative, got {}", power),
            ));
        }
        if power == 0.0 {
            return Ok(signal.clone());
        }

        let noise_dist = Normal::new(0.0, power.sqrt()).map_err(|e| {
            NyqError::invalid_parameter("noise_power", e.to_string())
        })?;

        let noisy = signal
            .amplitude()
            .iter()
            .map(|&a| a + noise_dist.sample(&mut self.rng))
            .collect();
        signal.with_amplitude(noisy)
    }

    /// Add the post-reconstruction noise, `scale · original_noise_power`
    pub fn degrade(
        &mut self,
        reconstructed: &Signal,
        original_noise_power: f64,
        scale: f64,
    ) -> NyqResult<Signal> {
        let scale = if scale.is_finite() { scale.clamp(0.0, 1.0) } else { 0.0 };
        let power = original_noise_power.max(0.0) * scale;
        debug!(original_noise_power, scale, noise_power = power, "degrading reconstruction");
        self.add_noise_with_power(reconstructed, power)
    }
}

/// Noise measured by differencing a clean and a noisy signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoiseStats {
    /// Mean power of the clean signal
    pub signal_power: f64,
    /// Mean power of `noisy - clean`
    pub noise_power: f64,
    /// Measured SNR in dB (infinite when no noise was found)
    pub measured_snr_db: f64,
}

impl NoiseStats {
    /// Compute statistics from a clean/noisy pair
    pub fn compute(clean: &[f64], noisy: &[f64]) -> Self {
        let signal_power = mean_power(clean);

        // Estimate noise by differencing
        let n = clean.len().min(noisy.len());
        let noise_power = if n == 0 {
            0.0
        } else {
            clean
                .iter()
                .zip(noisy)
                .map(|(c, x)| (x - c) * (x - c))
                .sum::<f64>()
                / n as f64
        };

        let measured_snr_db = if noise_power > 0.0 {
            10.0 * (signal_power / noise_power).log10()
        } else {
            f64::INFINITY
        };

        Self {
            signal_power,
            noise_power,
            measured_snr_db,
        }
    }
}
