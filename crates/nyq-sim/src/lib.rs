//! # Nyq Simulation
//!
//! The stochastic half of the sampling explorer: Gaussian noise injection
//! and the experiment pipeline that runs a signal through analysis,
//! sampling, reconstruction and error measurement.
//!
//! ## Usage
//!
//! ```rust
//! use nyq_core::prelude::*;
//! use nyq_sim::prelude::*;
//!
//! let signal = SignalSynthesizer::default()
//!     .synthesize(&[SignalTerm::new(5.0, 1.0)])
//!     .unwrap();
//!
//! let config = ExperimentConfig::default()
//!     .with_method(ReconstructionMethod::ZeroOrderHold)
//!     .with_noise(NoiseSpec::with_snr_db(30.0))
//!     .with_seed(7);
//!
//! let output = Experiment::new(signal, config).unwrap().run().unwrap();
//! assert_eq!(output.degraded.len(), 1000);
//! ```

pub mod noise;
pub mod pipeline;

// Re-exports
pub use noise::{NoiseModel, NoiseSpec, NoiseStats, SnrScale};
pub use pipeline::{
    analyze, run, sweep_rates, AnalysisConfig, Experiment, ExperimentConfig, ExperimentOutput,
    SignalAnalysis, SweepPoint,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::noise::{NoiseModel, NoiseSpec, SnrScale};
    pub use crate::pipeline::{Experiment, ExperimentConfig, ExperimentOutput};
}
