//! Alias Band Projection
//!
//! Sampling at `fs` replicates the spectrum at every multiple of `fs`. The
//! projector produces those replicas as plain shifted copies so a plot can
//! show where they overlap the baseband.

use crate::analysis::spectrum::SpectralProfile;
use crate::error::{NyqError, NyqResult};
use serde::Serialize;

/// Default number of replicas on each side of the baseband
pub const DEFAULT_NUM_REPEATS: usize = 10;

/// One shifted copy of the magnitude spectrum
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AliasBand {
    /// Signed replica index `k`; the band is shifted by `k·fs`
    pub index: i64,
    /// Shift in Hz
    pub shift_hz: f64,
    /// Shifted frequency axis (FFT order, same as the source profile)
    pub frequencies: Vec<f64>,
    /// Normalized magnitudes `|X|/N`
    pub magnitudes: Vec<f64>,
}

/// Produces spectral replicas at multiples of the sampling rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AliasBandProjector {
    num_repeats: usize,
}

impl Default for AliasBandProjector {
    fn default() -> Self {
        Self {
            num_repeats: DEFAULT_NUM_REPEATS,
        }
    }
}

impl AliasBandProjector {
    /// Projector with `num_repeats` replicas per side
    pub fn new(num_repeats: usize) -> Self {
        Self { num_repeats }
    }

    /// Replicas per side
    pub fn num_repeats(&self) -> usize {
        self.num_repeats
    }

    /// Build `2 × num_repeats` bands ordered `+1, -1, +2, -2, …`
    pub fn project(&self, profile: &SpectralProfile, target_rate_hz: f64) -> NyqResult<Vec<AliasBand>> {
        if !(target_rate_hz.is_finite() && target_rate_hz > 0.0) {
            return Err(NyqError::invalid_parameter(
                "target_rate_hz",
                format!("must be positive, got {}", target_rate_hz),
            ));
        }

        let magnitudes = profile.normalized_magnitudes();
        let mut bands = Vec::with_capacity(2 * self.num_repeats);

        for k in 1..=self.num_repeats as i64 {
            for index in [k, -k] {
                let shift_hz = index as f64 * target_rate_hz;
                bands.push(AliasBand {
                    index,
                    shift_hz,
                    frequencies: profile.frequencies.iter().map(|f| f + shift_hz).collect(),
                    magnitudes: magnitudes.clone(),
                });
            }
        }

        Ok(bands)
    }
}

/// Apparent frequency of a tone `frequency_hz` after sampling at `sample_rate_hz`.
///
/// Folds into `[0, fs/2]`.
pub fn folded_frequency(frequency_hz: f64, sample_rate_hz: f64) -> f64 {
    if sample_rate_hz <= 0.0 {
        return frequency_hz.abs();
    }
    let f = frequency_hz.abs() % sample_rate_hz;
    if f > sample_rate_hz / 2.0 {
        sample_rate_hz - f
    } else {
        f
    }
}
