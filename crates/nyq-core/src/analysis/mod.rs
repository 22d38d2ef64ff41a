//! Signal Analysis Module
//!
//! Frequency- and time-domain analysis of real signals.
//!
//! ## Features
//!
//! - **Spectrum Analysis**: full-length DFT magnitude spectrum
//! - **Dominant Frequencies**: local maxima above a threshold, strongest first
//! - **Signal Statistics**: power, RMS, crest factor, reconstruction error
//! - **Alias Bands**: spectral replicas at multiples of the sampling rate
//!
//! ## Example
//!
//! ```rust
//! use nyq_core::analysis::{PeakFinder, SpectralAnalyzer};
//! use nyq_core::synth::SignalSynthesizer;
//! use nyq_core::types::SignalTerm;
//!
//! let signal = SignalSynthesizer::default()
//!     .synthesize(&[SignalTerm::new(5.0, 1.0), SignalTerm::new(50.0, 1.0)])
//!     .unwrap();
//!
//! let spectrum = SpectralAnalyzer::new().compute(&signal).unwrap();
//! let dominant = PeakFinder::new().find_dominant(&spectrum);
//! assert_eq!(dominant.len(), 2);
//! ```

pub mod alias;
pub mod peaks;
pub mod spectrum;
pub mod statistics;

pub use alias::{folded_frequency, AliasBand, AliasBandProjector};
pub use peaks::{DominantFrequencySet, PeakFinder, SpectralPeak};
pub use spectrum::{SpectralAnalyzer, SpectralProfile};
pub use statistics::{ReconstructionError, SignalStats};
