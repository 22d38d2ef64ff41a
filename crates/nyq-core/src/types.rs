//! Core Data Types
//!
//! Value types passed between pipeline stages. Every stage produces a new
//! value; nothing here is mutated in place once built.

use crate::error::{NyqError, NyqResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A real-valued signal on a time axis.
///
/// Invariants (enforced by [`Signal::new`]): time and amplitude have the same
/// length, there are at least two samples, every value is finite and time is
/// strictly increasing. The only exception is the [`Signal::empty`] sentinel.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Signal {
    time: Vec<f64>,
    amplitude: Vec<f64>,
}

impl Signal {
    /// Build a signal from a time axis and matching amplitudes
    pub fn new(time: Vec<f64>, amplitude: Vec<f64>) -> NyqResult<Self> {
        if time.len() != amplitude.len() {
            return Err(NyqError::malformed(format!(
                "time has {} entries but amplitude has {}",
                time.len(),
                amplitude.len()
            )));
        }
        if time.len() < 2 {
            return Err(NyqError::EmptySignal(format!(
                "a signal needs at least 2 samples, got {}",
                time.len()
            )));
        }
        check_time_axis(&time)?;
        if let Some(i) = amplitude.iter().position(|a| !a.is_finite()) {
            return Err(NyqError::malformed(format!(
                "amplitude at index {} is not finite",
                i
            )));
        }

        Ok(Self { time, amplitude })
    }

    /// Build a signal sampled uniformly from t = 0 at the given rate
    pub fn from_uniform(sample_rate: f64, amplitude: Vec<f64>) -> NyqResult<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(NyqError::invalid_parameter(
                "sample_rate",
                format!("must be positive, got {}", sample_rate),
            ));
        }
        let time = (0..amplitude.len())
            .map(|i| i as f64 / sample_rate)
            .collect();
        Self::new(time, amplitude)
    }

    /// The empty-result sentinel
    pub fn empty() -> Self {
        Self::default()
    }

    /// Time axis in seconds
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Amplitude values
    pub fn amplitude(&self) -> &[f64] {
        &self.amplitude
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// True for the empty sentinel
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Iterate over `(time, amplitude)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time.iter().copied().zip(self.amplitude.iter().copied())
    }

    /// Mean of consecutive time differences (0.0 for the empty sentinel)
    ///
    /// The mean of a telescoping sum reduces to the span divided by the
    /// number of steps.
    pub fn mean_time_step(&self) -> f64 {
        match (self.time.first(), self.time.last()) {
            (Some(first), Some(last)) if self.time.len() > 1 => {
                (last - first) / (self.time.len() - 1) as f64
            }
            _ => 0.0,
        }
    }

    /// Effective sample rate in Hz derived from the mean time step
    pub fn sample_rate(&self) -> f64 {
        let dt = self.mean_time_step();
        if dt > 0.0 {
            1.0 / dt
        } else {
            0.0
        }
    }

    /// Time span covered by the samples in seconds
    pub fn duration(&self) -> f64 {
        match (self.time.first(), self.time.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Same time axis, new amplitudes
    pub fn with_amplitude(&self, amplitude: Vec<f64>) -> NyqResult<Self> {
        self.ensure_usable("signal")?;
        Self::new(self.time.clone(), amplitude)
    }

    /// Fail with `EmptySignal` when this is the sentinel
    pub fn ensure_usable(&self, stage: &str) -> NyqResult<()> {
        if self.len() < 2 {
            Err(NyqError::EmptySignal(format!(
                "{} received a signal with {} samples",
                stage,
                self.len()
            )))
        } else {
            Ok(())
        }
    }
}

fn check_time_axis(time: &[f64]) -> NyqResult<()> {
    if let Some(i) = time.iter().position(|t| !t.is_finite()) {
        return Err(NyqError::malformed(format!(
            "time at index {} is not finite",
            i
        )));
    }
    if let Some(i) = time.windows(2).position(|w| w[1] <= w[0]) {
        return Err(NyqError::malformed(format!(
            "time is not strictly increasing at index {} ({} -> {})",
            i + 1,
            time[i],
            time[i + 1]
        )));
    }
    Ok(())
}

/// One sinusoidal contributor to a synthesized signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalTerm {
    /// Frequency in Hz
    pub frequency_hz: f64,
    /// Peak amplitude
    pub amplitude: f64,
    /// Phase offset in radians
    #[serde(default)]
    pub phase_radians: f64,
}

impl SignalTerm {
    /// Create a zero-phase term
    pub fn new(frequency_hz: f64, amplitude: f64) -> Self {
        Self {
            frequency_hz,
            amplitude,
            phase_radians: 0.0,
        }
    }

    /// Set the phase from degrees
    pub fn with_phase_degrees(mut self, degrees: f64) -> Self {
        self.phase_radians = degrees.to_radians();
        self
    }

    /// Value of this term at time `t`
    #[inline]
    pub fn evaluate(&self, t: f64) -> f64 {
        self.amplitude * (2.0 * PI * self.frequency_hz * t + self.phase_radians).sin()
    }
}

/// The strided subset of a signal kept by the sampler.
///
/// Times are the original time values, not a resampled grid.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SparseSample {
    time: Vec<f64>,
    amplitude: Vec<f64>,
    stride: usize,
}

impl SparseSample {
    /// Build a sparse set from explicit points (may hold 0 or 1 points)
    pub fn new(time: Vec<f64>, amplitude: Vec<f64>) -> NyqResult<Self> {
        if time.len() != amplitude.len() {
            return Err(NyqError::malformed(format!(
                "sparse time has {} entries but amplitude has {}",
                time.len(),
                amplitude.len()
            )));
        }
        check_time_axis(&time)?;
        Ok(Self {
            time,
            amplitude,
            stride: 1,
        })
    }

    /// Take every `stride`-th sample of `signal`, starting at index 0
    pub(crate) fn strided(signal: &Signal, stride: usize) -> Self {
        let stride = stride.max(1);
        Self {
            time: signal.time().iter().copied().step_by(stride).collect(),
            amplitude: signal.amplitude().iter().copied().step_by(stride).collect(),
            stride,
        }
    }

    /// Sample times
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Sampled amplitudes
    pub fn amplitude(&self) -> &[f64] {
        &self.amplitude
    }

    /// Index stride used to pick these samples
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of sparse points
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// True when no points were kept
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Spacing between the first two points, the `T` of the interpolators
    pub fn spacing(&self) -> Option<f64> {
        match self.time.as_slice() {
            [t0, t1, ..] => Some(t1 - t0),
            _ => None,
        }
    }

    /// Effective sampling rate implied by the first spacing
    pub fn effective_rate(&self) -> Option<f64> {
        self.spacing().map(|t| 1.0 / t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_rejects_bad_shapes() {
        assert!(matches!(
            Signal::new(vec![0.0, 1.0], vec![1.0]),
            Err(NyqError::MalformedInput { .. })
        ));
        assert!(matches!(
            Signal::new(vec![0.0], vec![1.0]),
            Err(NyqError::EmptySignal(_))
        ));
        assert!(matches!(
            Signal::new(vec![0.0, 0.0, 1.0], vec![1.0, 2.0, 3.0]),
            Err(NyqError::MalformedInput { .. })
        ));
        assert!(matches!(
            Signal::new(vec![0.0, 1.0], vec![1.0, f64::NAN]),
            Err(NyqError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_mean_time_step() {
        let signal = Signal::from_uniform(1000.0, vec![0.0; 1000]).unwrap();
        assert!((signal.mean_time_step() - 0.001).abs() < 1e-12);
        assert!((signal.sample_rate() - 1000.0).abs() < 1e-6);
        assert_eq!(Signal::empty().mean_time_step(), 0.0);
    }

    #[test]
    fn test_with_amplitude_keeps_axis() {
        let signal = Signal::new(vec![0.0, 0.5, 1.0], vec![1.0, 2.0, 3.0]).unwrap();
        let doubled = signal
            .with_amplitude(signal.amplitude().iter().map(|a| a * 2.0).collect())
            .unwrap();
        assert_eq!(doubled.time(), signal.time());
        assert_eq!(doubled.amplitude(), &[2.0, 4.0, 6.0]);
        assert!(signal.with_amplitude(vec![1.0]).is_err());
    }

    #[test]
    fn test_term_phase_conversion() {
        let term = SignalTerm::new(1.0, 2.0).with_phase_degrees(90.0);
        assert!((term.phase_radians - PI / 2.0).abs() < 1e-12);
        assert!((term.evaluate(0.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_sparse_spacing() {
        let signal = Signal::from_uniform(100.0, (0..10).map(|i| i as f64).collect()).unwrap();
        let sparse = SparseSample::strided(&signal, 3);
        assert_eq!(sparse.amplitude(), &[0.0, 3.0, 6.0, 9.0]);
        assert!((sparse.spacing().unwrap() - 0.03).abs() < 1e-12);
        assert_eq!(sparse.stride(), 3);

        let single = SparseSample::new(vec![0.0], vec![1.0]).unwrap();
        assert_eq!(single.spacing(), None);
    }
}
