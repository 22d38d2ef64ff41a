//! Signal Reconstruction
//!
//! Rebuilds a dense signal from a sparse sample set, evaluated on the
//! original time axis. Three kernels are available:
//!
//! | Method | Kernel | Support |
//! |--------|--------|---------|
//! | Sinc interpolation | `sinc(x)` | every sample |
//! | Zero-order hold | step | previous sample |
//! | Lanczos (a) | `sinc(x)·sinc(x/a)` | `|x| < a` |
//!
//! `x` is the distance to a sample measured in sparse spacings
//! `T = t[1] - t[0]`.
//!
//! Sinc and Lanczos need a spacing, so with fewer than two sparse samples
//! they degrade to an all-zero output and report `TooFewSamples` alongside
//! it instead of failing the whole pipeline.

use crate::error::{NyqError, NyqResult};
use crate::types::{Signal, SparseSample};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Default Lanczos window half-width
pub const DEFAULT_LANCZOS_WINDOW: u32 = 3;

/// Arguments closer to zero than this evaluate the kernel to exactly 1
const KERNEL_ORIGIN_EPS: f64 = 1e-10;

/// Normalized sinc, `sin(πx)/(πx)`
#[inline]
pub fn sinc(x: f64) -> f64 {
    if x.abs() < KERNEL_ORIGIN_EPS {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Lanczos kernel with half-width `a`
#[inline]
pub fn lanczos_kernel(x: f64, a: u32) -> f64 {
    let a = f64::from(a);
    if x.abs() < KERNEL_ORIGIN_EPS {
        1.0
    } else if x.abs() >= a {
        0.0
    } else {
        sinc(x) * sinc(x / a)
    }
}

/// Interpolation kernel used to rebuild the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method")]
pub enum ReconstructionMethod {
    /// Ideal band-limited interpolation
    SincInterpolation,
    /// Hold each sample until the next
    ZeroOrderHold,
    /// Windowed sinc with half-width `window`
    LanczosResampling {
        #[serde(default = "default_lanczos_window")]
        window: u32,
    },
}

fn default_lanczos_window() -> u32 {
    DEFAULT_LANCZOS_WINDOW
}

impl Default for ReconstructionMethod {
    fn default() -> Self {
        Self::SincInterpolation
    }
}

impl ReconstructionMethod {
    /// Lanczos with the default window
    pub fn lanczos() -> Self {
        Self::LanczosResampling {
            window: DEFAULT_LANCZOS_WINDOW,
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::SincInterpolation => "sinc interpolation",
            Self::ZeroOrderHold => "zero-order hold",
            Self::LanczosResampling { .. } => "lanczos resampling",
        }
    }

    /// All methods with default parameters
    pub fn all() -> [Self; 3] {
        [Self::SincInterpolation, Self::ZeroOrderHold, Self::lanczos()]
    }
}

impl fmt::Display for ReconstructionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SincInterpolation => write!(f, "sinc"),
            Self::ZeroOrderHold => write!(f, "zoh"),
            Self::LanczosResampling { window } => write!(f, "lanczos:{}", window),
        }
    }
}

impl FromStr for ReconstructionMethod {
    type Err = NyqError;

    /// Parse `sinc`, `zoh` or `lanczos[:a]`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let (name, arg) = match lower.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (lower.as_str(), None),
        };

        match (name, arg) {
            ("sinc" | "sinc-interpolation", None) => Ok(Self::SincInterpolation),
            ("zoh" | "zero-order-hold" | "hold", None) => Ok(Self::ZeroOrderHold),
            ("lanczos" | "lanczos-resampling", None) => Ok(Self::lanczos()),
            ("lanczos" | "lanczos-resampling", Some(a)) => match a.parse::<u32>() {
                Ok(window) if window > 0 => Ok(Self::LanczosResampling { window }),
                _ => Err(NyqError::invalid_parameter(
                    "window",
                    format!("Lanczos window must be a positive integer, got `{}`", a),
                )),
            },
            _ => Err(NyqError::invalid_parameter(
                "method",
                format!("unknown reconstruction method `{}`. Use sinc, zoh, or lanczos[:a]", s),
            )),
        }
    }
}

/// Output of a reconstruction, aligned to the target time axis
#[derive(Debug, Clone, Serialize)]
pub struct ReconstructedSignal {
    /// Method that produced this output
    pub method: ReconstructionMethod,
    /// Target time axis
    pub time: Vec<f64>,
    /// Reconstructed amplitudes
    pub amplitude: Vec<f64>,
    /// Why the method fell back to an all-zero output, if it did
    pub fallback: Option<String>,
}

impl ReconstructedSignal {
    /// True when the output is the all-zero fallback
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Convert into a [`Signal`] on the same axis
    pub fn to_signal(&self) -> NyqResult<Signal> {
        Signal::new(self.time.clone(), self.amplitude.clone())
    }
}

/// Evaluate `method` on `target_time`, failing on too few samples
pub fn try_reconstruct(
    method: ReconstructionMethod,
    sparse: &SparseSample,
    target_time: &[f64],
) -> NyqResult<Vec<f64>> {
    match method {
        ReconstructionMethod::SincInterpolation => sinc_interpolation(sparse, target_time),
        ReconstructionMethod::ZeroOrderHold => Ok(zero_order_hold(sparse, target_time)),
        ReconstructionMethod::LanczosResampling { window } => {
            lanczos_resampling(sparse, target_time, window)
        }
    }
}

/// Evaluate `method` on `target_time`, degrading to zeros on too few samples
pub fn reconstruct(
    method: ReconstructionMethod,
    sparse: &SparseSample,
    target_time: &[f64],
) -> ReconstructedSignal {
    let (amplitude, fallback) = match try_reconstruct(method, sparse, target_time) {
        Ok(amplitude) => (amplitude, None),
        Err(e) => {
            warn!("{}; reconstruction replaced with zeros", e);
            (vec![0.0; target_time.len()], Some(e.to_string()))
        }
    };

    ReconstructedSignal {
        method,
        time: target_time.to_vec(),
        amplitude,
        fallback,
    }
}

fn spacing(sparse: &SparseSample, method: &'static str) -> NyqResult<f64> {
    match sparse.spacing() {
        Some(t) if sparse.len() >= 2 => Ok(t),
        _ => Err(NyqError::TooFewSamples {
            method,
            got: sparse.len(),
        }),
    }
}

/// `Σ a_i · sinc((t − t_i)/T)`
pub fn sinc_interpolation(sparse: &SparseSample, target_time: &[f64]) -> NyqResult<Vec<f64>> {
    let period = spacing(sparse, "sinc interpolation")?;

    Ok(target_time
        .iter()
        .map(|&t| {
            sparse
                .time()
                .iter()
                .zip(sparse.amplitude())
                .map(|(&ti, &ai)| ai * sinc((t - ti) / period))
                .sum()
        })
        .collect())
}

/// Step function holding `a_i` on `[t_i, t_{i+1})` and the last value beyond.
///
/// Times before the first sample evaluate to zero.
pub fn zero_order_hold(sparse: &SparseSample, target_time: &[f64]) -> Vec<f64> {
    let times = sparse.time();
    let amplitudes = sparse.amplitude();

    target_time
        .iter()
        .map(|&t| {
            // Number of samples at or before t
            let held = times.partition_point(|&ti| ti <= t);
            if held == 0 {
                0.0
            } else {
                amplitudes[held - 1]
            }
        })
        .collect()
}

/// `Σ a_j · L((t − t_j)/T)` over the samples inside the window
pub fn lanczos_resampling(
    sparse: &SparseSample,
    target_time: &[f64],
    window: u32,
) -> NyqResult<Vec<f64>> {
    if window == 0 {
        return Err(NyqError::invalid_parameter("window", "must be at least 1"));
    }
    let period = spacing(sparse, "lanczos resampling")?;
    let times = sparse.time();
    let amplitudes = sparse.amplitude();
    let reach = f64::from(window) * period.abs();

    Ok(target_time
        .iter()
        .map(|&t| {
            // Only samples with |t - t_j| < a·T contribute
            let start = times.partition_point(|&tj| tj <= t - reach);
            let end = times.partition_point(|&tj| tj < t + reach);
            (start..end)
                .map(|j| amplitudes[j] * lanczos_kernel((t - times[j]) / period, window))
                .sum()
        })
        .collect())
}

/// Scale for the post-reconstruction noise: `1 − rate/max_rate`, clamped to `[0, 1]`.
///
/// Zero at the top of the rate range, one as the rate approaches zero.
pub fn degradation_scale(target_rate_hz: f64, max_rate_hz: f64) -> f64 {
    if !(max_rate_hz.is_finite() && max_rate_hz > 0.0) || !target_rate_hz.is_finite() {
        return 0.0;
    }
    (1.0 - target_rate_hz / max_rate_hz).clamp(0.0, 1.0)
}
