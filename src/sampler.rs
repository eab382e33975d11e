use crate::{Basis, Measurement, PolarizationState, RandomSource, errors::ProtocolError};
use crate::protocols::bb84::{RunConfig, Security, run_protocol};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregated statistics over many independent protocol runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub runs: usize,
    pub total_sifted: usize,
    pub total_errors: usize,
    /// Errors over all sifted positions of all runs.
    pub pooled_error_rate: f64,
    pub secure_runs: usize,
    pub compromised_runs: usize,
    pub insufficient_runs: usize,
}

/// Repeats measurements or whole runs to estimate their distributions.
///
/// Useful to show that intercept-resend pushes the sifted error rate towards 25%
/// while an undisturbed channel stays at zero.
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    /// Configuration used by [`Sampler::sample_runs`].
    pub config: RunConfig,
}

impl Sampler {
    /// Creates a new `Sampler` with the default run configuration.
    pub fn new() -> Self {
        Self {
            config: RunConfig::default(),
        }
    }

    /// Sets the run configuration for the sampler.
    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Measures `state` in `basis` `num_shots` times, counting each outcome state.
    ///
    /// # Arguments
    ///
    /// * `state` - The incoming polarization.
    /// * `basis` - The measurement basis.
    /// * `num_shots` - The number of times to repeat the measurement.
    /// * `rng` - Source of the collapse draws.
    pub fn sample_measurement<R: RandomSource + ?Sized>(
        &self,
        state: PolarizationState,
        basis: Basis,
        num_shots: usize,
        rng: &mut R,
    ) -> Result<HashMap<PolarizationState, usize>, ProtocolError> {
        if num_shots == 0 {
            return Err(ProtocolError::InvalidSampleCount);
        }

        let measurement = Measurement::new(basis);
        let mut counts = HashMap::new();
        for _ in 0..num_shots {
            let outcome = measurement.apply(state, rng)?;
            *counts.entry(outcome).or_insert(0) += 1;
        }

        Ok(counts)
    }

    /// Runs the configured protocol `runs` times and pools the results.
    pub fn sample_runs<R: RandomSource + ?Sized>(
        &self,
        runs: usize,
        rng: &mut R,
    ) -> Result<RunStatistics, ProtocolError> {
        if runs == 0 {
            return Err(ProtocolError::InvalidSampleCount);
        }

        let mut stats = RunStatistics {
            runs,
            total_sifted: 0,
            total_errors: 0,
            pooled_error_rate: 0.0,
            secure_runs: 0,
            compromised_runs: 0,
            insufficient_runs: 0,
        };

        for _ in 0..runs {
            let result = run_protocol(&self.config, rng)?;
            stats.total_sifted += result.sifted_count;
            stats.total_errors += result.error_count;
            match result.security {
                Security::Secure => stats.secure_runs += 1,
                Security::Compromised => stats.compromised_runs += 1,
                Security::InsufficientData => stats.insufficient_runs += 1,
            }
        }

        if stats.total_sifted > 0 {
            stats.pooled_error_rate = stats.total_errors as f64 / stats.total_sifted as f64;
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn zero_samples_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let sampler = Sampler::new();
        assert_eq!(
            sampler.sample_runs(0, &mut rng),
            Err(ProtocolError::InvalidSampleCount)
        );
        assert_eq!(
            sampler.sample_measurement(PolarizationState::Horizontal, Basis::Diagonal, 0, &mut rng),
            Err(ProtocolError::InvalidSampleCount)
        );
    }

    #[test]
    fn matching_basis_always_yields_same_state() {
        let mut rng = StdRng::seed_from_u64(3);
        let counts = Sampler::new()
            .sample_measurement(PolarizationState::Minus45, Basis::Diagonal, 500, &mut rng)
            .unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[&PolarizationState::Minus45], 500);
    }

    #[test]
    fn undisturbed_channel_is_error_free() {
        let mut rng = StdRng::seed_from_u64(11);
        let stats = Sampler::new()
            .with_config(RunConfig::new(32))
            .sample_runs(50, &mut rng)
            .unwrap();
        assert_eq!(stats.total_errors, 0);
        assert_eq!(stats.compromised_runs, 0);
        assert_eq!(stats.secure_runs + stats.insufficient_runs, 50);
    }
}
