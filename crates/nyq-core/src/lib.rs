//! # Nyq Core
//!
//! Numeric engine for exploring the sampling theorem: synthesize or load a
//! signal, find its dominant frequencies, sample it at a chosen rate and
//! rebuild it with one of several interpolation kernels.
//!
//! ## Pipeline
//!
//! ```text
//! TermSpec ──► SignalSynthesizer ──► Signal ◄── io::read_signal
//!                                      │
//!                       SpectralAnalyzer ──► SpectralProfile ──► PeakFinder
//!                                      │                            │
//!                                      │                    DominantFrequencySet
//!                                      │                            │
//!                                      │                     SamplingBounds
//!                                      ▼                            │
//!                                   Sampler ◄── SamplingConfiguration
//!                                      │
//!                                 SparseSample ──► reconstruct() ──► ReconstructedSignal
//! ```
//!
//! Noise injection and the end-to-end experiment live in `nyq-sim`.
//!
//! ## Usage
//!
//! ```rust
//! use nyq_core::prelude::*;
//!
//! let signal = SignalSynthesizer::default()
//!     .synthesize(&[SignalTerm::new(5.0, 1.0)])
//!     .unwrap();
//!
//! let spectrum = SpectralAnalyzer::new().compute(&signal).unwrap();
//! let dominant = PeakFinder::new().find_dominant(&spectrum);
//! let bounds = SamplingBounds::from_dominant(&dominant).unwrap();
//! assert_eq!(bounds.minimum_valid_rate, 11.0);
//!
//! let config = SamplingConfiguration::at_minimum_valid(&bounds);
//! let sparse = Sampler.sample(&signal, &config).unwrap();
//! let rebuilt = reconstruct(ReconstructionMethod::SincInterpolation, &sparse, signal.time());
//! assert_eq!(rebuilt.amplitude.len(), signal.len());
//! ```

pub mod analysis;
pub mod error;
pub mod fft_utils;
pub mod io;
pub mod reconstruct;
pub mod sampling;
pub mod synth;
pub mod types;

pub use error::{NyqError, NyqResult};
pub use reconstruct::{reconstruct, try_reconstruct, ReconstructedSignal, ReconstructionMethod};
pub use sampling::{Sampler, SamplingBounds, SamplingConfiguration};
pub use synth::{SignalSynthesizer, TermSpec};
pub use types::{Signal, SignalTerm, SparseSample};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analysis::{
        AliasBandProjector, DominantFrequencySet, PeakFinder, SpectralAnalyzer, SpectralProfile,
    };
    pub use crate::error::{NyqError, NyqResult};
    pub use crate::reconstruct::{reconstruct, ReconstructedSignal, ReconstructionMethod};
    pub use crate::sampling::{Sampler, SamplingBounds, SamplingConfiguration};
    pub use crate::synth::{SignalSynthesizer, TermSpec};
    pub use crate::types::{Signal, SignalTerm, SparseSample};
}
