//! Error Types
//!
//! Every stage reports the first problem it observes through [`NyqError`].
//! None of these are fatal: callers recover by supplying corrected input.

use thiserror::Error;

/// Errors produced by the sampling/reconstruction engine
#[derive(Debug, Error)]
pub enum NyqError {
    /// A synthesis term is missing a field or holds a non-numeric value
    #[error("invalid signal term {index}: {reason}")]
    InvalidTerm { index: usize, reason: String },

    /// A signal table or signal buffer does not have the expected shape
    #[error("malformed input{}: {reason}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    MalformedInput { line: Option<usize>, reason: String },

    /// Interpolation needs at least two sparse samples to define a spacing
    #[error("too few samples for {method}: got {got}, need at least 2")]
    TooFewSamples { method: &'static str, got: usize },

    /// A stage received an empty or degenerate signal
    #[error("empty signal: {0}")]
    EmptySignal(String),

    /// A numeric parameter is outside its valid domain
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Reading or writing a signal table failed
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl NyqError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            line: None,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_at(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            line: Some(line),
            reason: reason.into(),
        }
    }

    /// Build an `InvalidParameter` error
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the engine
pub type NyqResult<T> = Result<T, NyqError>;
