//! BB84 quantum key distribution simulation engine.
//!
//! Photon polarizations, the measurement-collapse rule, intercept-resend eavesdropping,
//! basis sifting and error-rate analysis. Rendering is left to the caller; every result
//! type is plain serde data.

mod core;
pub mod protocols;
mod sampler;
pub mod session;

pub use crate::core::{
    Basis, Measurement, PolarizationState, RandomSource, ScriptedSource, errors, measure,
    outcome_probabilities, state_for, utils,
};
pub use crate::protocols::bb84::{RunConfig, RunResult, Security, run_protocol};
pub use crate::sampler::{RunStatistics, Sampler};
pub use crate::session::{Session, Stage};
