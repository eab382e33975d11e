use crate::core::errors::RandomError;
use crate::core::polarization::{Basis, PolarizationState};
use crate::core::random::RandomSource;
use crate::core::utils;
use ndarray::Array2;
use num_complex::Complex64;
use tracing::trace;

/// Projective measurement in one of the two BB84 bases.
#[derive(Clone, Debug)]
pub struct Measurement {
    /// Basis the device is aligned to
    pub basis: Basis,
    /// Projectors onto the bit-0 and bit-1 states of `basis`
    pub operators: [Array2<Complex64>; 2],
}

impl Measurement {
    pub fn new(basis: Basis) -> Self {
        let [zero, one] = basis.states();
        Self {
            basis,
            operators: [
                utils::projector(&zero.jones()),
                utils::projector(&one.jones()),
            ],
        }
    }

    /// Rectilinear (H/V) polarizer.
    pub fn rectilinear() -> Self {
        Self::new(Basis::Rectilinear)
    }

    /// Diagonal (+45/-45) polarizer.
    pub fn diagonal() -> Self {
        Self::new(Basis::Diagonal)
    }

    /// Born-rule probability of each outcome, indexed by bit value.
    pub fn probabilities(&self, incoming: PolarizationState) -> [f64; 2] {
        let psi = incoming.jones();
        let p0 = utils::born_probability(&self.operators[0], &psi);
        let p1 = utils::born_probability(&self.operators[1], &psi);

        // Due to float, renormalize so the pair sums to one
        let total = p0 + p1;
        [p0 / total, p1 / total]
    }

    /// Measures `incoming`, collapsing it onto one of this basis' states.
    pub fn apply<R: RandomSource + ?Sized>(
        &self,
        incoming: PolarizationState,
        rng: &mut R,
    ) -> Result<PolarizationState, RandomError> {
        if incoming.basis() == self.basis {
            return Ok(incoming);
        }

        // Conjugate bases: both outcomes are equally likely and independent of the
        // incoming bit, so the outcome is a fresh uniform draw.
        let bit = rng.next_bool()?;
        let collapsed = self.basis.states()[usize::from(bit)];
        trace!(%incoming, basis = %self.basis, %collapsed, "polarization collapsed");

        Ok(collapsed)
    }
}

/// Measures `incoming` in `basis`.
///
/// Matching bases return `incoming` unchanged without consuming randomness; a mismatch
/// draws exactly one uniform boolean for the outcome bit.
pub fn measure<R: RandomSource + ?Sized>(
    incoming: PolarizationState,
    basis: Basis,
    rng: &mut R,
) -> Result<PolarizationState, RandomError> {
    Measurement::new(basis).apply(incoming, rng)
}

/// Born-rule outcome probabilities of measuring `incoming` in `basis`.
pub fn outcome_probabilities(incoming: PolarizationState, basis: Basis) -> [f64; 2] {
    Measurement::new(basis).probabilities(incoming)
}
