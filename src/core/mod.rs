pub mod errors;
mod measurements;
mod polarization;
mod random;
pub mod utils;

pub use measurements::{Measurement, measure, outcome_probabilities};
pub use polarization::{Basis, PolarizationState, state_for};
pub use random::{RandomSource, ScriptedSource};
