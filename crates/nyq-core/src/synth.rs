//! Test Signal Synthesis
//!
//! Builds clean test signals as a sum of sinusoids. Terms usually arrive as
//! raw text from a composer form, so validation happens here: frequency and
//! amplitude are required, phase is optional and given in degrees.
//!
//! ## Usage
//!
//! ```rust
//! use nyq_core::synth::{SignalSynthesizer, TermSpec};
//!
//! let specs = vec![TermSpec::parse("5:1.0"), TermSpec::parse("20:0.5:90")];
//! let signal = SignalSynthesizer::default().compose(&specs).unwrap();
//! assert_eq!(signal.len(), 1000);
//! ```

use crate::error::{NyqError, NyqResult};
use crate::types::{Signal, SignalTerm};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default synthesis sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: f64 = 1000.0;

/// Default synthesis duration in seconds
pub const DEFAULT_DURATION: f64 = 1.0;

/// Unvalidated synthesis term as entered by a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSpec {
    pub frequency: Option<String>,
    pub amplitude: Option<String>,
    #[serde(default)]
    pub phase_degrees: Option<String>,
}

impl TermSpec {
    /// Term with frequency and amplitude text
    pub fn new(frequency: impl Into<String>, amplitude: impl Into<String>) -> Self {
        Self {
            frequency: Some(frequency.into()),
            amplitude: Some(amplitude.into()),
            phase_degrees: None,
        }
    }

    /// Attach a phase in degrees
    pub fn with_phase(mut self, phase_degrees: impl Into<String>) -> Self {
        self.phase_degrees = Some(phase_degrees.into());
        self
    }

    /// Split `frequency:amplitude[:phase_degrees]` into fields.
    ///
    /// Empty fields become `None`; nothing is validated until
    /// [`TermSpec::validate`].
    pub fn parse(text: &str) -> Self {
        let mut fields = text.split(':').map(|f| {
            let f = f.trim();
            if f.is_empty() {
                None
            } else {
                Some(f.to_string())
            }
        });

        Self {
            frequency: fields.next().flatten(),
            amplitude: fields.next().flatten(),
            phase_degrees: fields.next().flatten(),
        }
    }

    /// Check the fields and convert to a [`SignalTerm`]
    pub fn validate(&self, index: usize) -> NyqResult<SignalTerm> {
        let frequency = required_number(index, "frequency", self.frequency.as_deref())?;
        let amplitude = required_number(index, "amplitude", self.amplitude.as_deref())?;
        let phase = match self.phase_degrees.as_deref() {
            Some(text) => parse_number(index, "phase", text)?,
            None => 0.0,
        };

        Ok(SignalTerm::new(frequency, amplitude).with_phase_degrees(phase))
    }
}

fn required_number(index: usize, field: &str, text: Option<&str>) -> NyqResult<f64> {
    match text {
        Some(t) => parse_number(index, field, t),
        None => Err(NyqError::InvalidTerm {
            index,
            reason: format!("{} is missing", field),
        }),
    }
}

fn parse_number(index: usize, field: &str, text: &str) -> NyqResult<f64> {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(NyqError::InvalidTerm {
            index,
            reason: format!("{} `{}` is not a valid number", field, text),
        }),
    }
}

/// Validate an ordered list of term specs
pub fn validate_terms(specs: &[TermSpec]) -> NyqResult<Vec<SignalTerm>> {
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| spec.validate(i))
        .collect()
}

/// Sum-of-sinusoids generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSynthesizer {
    /// Samples per second
    pub sample_rate: f64,
    /// Length of the generated signal in seconds
    pub duration: f64,
}

impl Default for SignalSynthesizer {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration: DEFAULT_DURATION,
        }
    }
}

impl SignalSynthesizer {
    /// Create a synthesizer for the given rate and duration
    pub fn new(sample_rate: f64, duration: f64) -> Self {
        Self {
            sample_rate,
            duration,
        }
    }

    /// Number of points: `floor(sample_rate * duration)`
    pub fn num_samples(&self) -> usize {
        let n = (self.sample_rate * self.duration).floor();
        if n.is_finite() && n > 0.0 {
            n as usize
        } else {
            0
        }
    }

    /// Sum the terms on `[0, duration)`
    pub fn synthesize(&self, terms: &[SignalTerm]) -> NyqResult<Signal> {
        for (index, term) in terms.iter().enumerate() {
            if !(term.frequency_hz.is_finite()
                && term.amplitude.is_finite()
                && term.phase_radians.is_finite())
            {
                return Err(NyqError::InvalidTerm {
                    index,
                    reason: "term contains a non-finite value".to_string(),
                });
            }
        }

        let n = self.num_samples();
        if n < 2 {
            return Err(NyqError::EmptySignal(format!(
                "{} Hz for {} s yields {} samples",
                self.sample_rate, self.duration, n
            )));
        }

        let step = self.duration / n as f64;
        let time: Vec<f64> = (0..n).map(|i| i as f64 * step).collect();
        let amplitude = time
            .iter()
            .map(|&t| terms.iter().map(|term| term.evaluate(t)).sum())
            .collect();

        debug!(terms = terms.len(), samples = n, "synthesized signal");
        Signal::new(time, amplitude)
    }

    /// Validate raw specs and synthesize
    pub fn compose(&self, specs: &[TermSpec]) -> NyqResult<Signal> {
        let terms = validate_terms(specs)?;
        self.synthesize(&terms)
    }

    /// Like [`compose`](Self::compose) but returns the empty sentinel on failure
    pub fn compose_or_empty(&self, specs: &[TermSpec]) -> Signal {
        match self.compose(specs) {
            Ok(signal) => signal,
            Err(e) => {
                warn!("signal synthesis failed: {}", e);
                Signal::empty()
            }
        }
    }
}

/// File name used when saving a composed signal, e.g. `generated_signal_5.0Hz_20.0Hz.csv`
///
/// Whole-number frequencies keep their decimal point (`5.0Hz`).
pub fn generated_file_name(terms: &[SignalTerm]) -> String {
    let freqs: Vec<String> = terms
        .iter()
        .map(|t| format!("{:?}Hz", t.frequency_hz))
        .collect();
    format!("generated_signal_{}.csv", freqs.join("_"))
}
