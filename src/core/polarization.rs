//! Polarization states of a single photon and the bases used to prepare and measure them.

use ndarray::{Array1, array};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Orientation used to encode or measure a bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// "+" basis: horizontal / vertical.
    Rectilinear,
    /// "x" basis: +45° / -45°.
    Diagonal,
}

impl Basis {
    pub const ALL: [Basis; 2] = [Basis::Rectilinear, Basis::Diagonal];

    /// Maps a uniform boolean draw to a basis (`true` -> Diagonal).
    pub fn from_bool(diagonal: bool) -> Self {
        if diagonal {
            Basis::Diagonal
        } else {
            Basis::Rectilinear
        }
    }

    /// Display symbol: `'+'` or `'x'`.
    pub fn symbol(self) -> char {
        match self {
            Basis::Rectilinear => '+',
            Basis::Diagonal => 'x',
        }
    }

    /// The conjugate basis.
    pub fn other(self) -> Self {
        match self {
            Basis::Rectilinear => Basis::Diagonal,
            Basis::Diagonal => Basis::Rectilinear,
        }
    }

    /// The two states of this basis, indexed by bit value.
    pub fn states(self) -> [PolarizationState; 2] {
        [state_for(false, self), state_for(true, self)]
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One of the four BB84 photon polarizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolarizationState {
    #[serde(rename = "H")]
    Horizontal,
    #[serde(rename = "V")]
    Vertical,
    #[serde(rename = "+45")]
    Plus45,
    #[serde(rename = "-45")]
    Minus45,
}

impl PolarizationState {
    pub const ALL: [PolarizationState; 4] = [
        PolarizationState::Horizontal,
        PolarizationState::Vertical,
        PolarizationState::Plus45,
        PolarizationState::Minus45,
    ];

    pub fn basis(self) -> Basis {
        match self {
            PolarizationState::Horizontal | PolarizationState::Vertical => Basis::Rectilinear,
            PolarizationState::Plus45 | PolarizationState::Minus45 => Basis::Diagonal,
        }
    }

    /// Bit value relative to the state's own basis.
    pub fn bit(self) -> bool {
        matches!(self, PolarizationState::Vertical | PolarizationState::Minus45)
    }

    /// Inverse of [`state_for`].
    pub fn decode(self) -> (bool, Basis) {
        (self.bit(), self.basis())
    }

    /// Display angle in degrees.
    pub fn angle(self) -> u16 {
        match self {
            PolarizationState::Horizontal => 0,
            PolarizationState::Plus45 => 45,
            PolarizationState::Vertical => 90,
            PolarizationState::Minus45 => 135,
        }
    }

    pub fn arrow(self) -> char {
        match self {
            PolarizationState::Horizontal => '→',
            PolarizationState::Vertical => '↑',
            PolarizationState::Plus45 => '↗',
            PolarizationState::Minus45 => '↖',
        }
    }

    /// Normalized Jones vector of the state.
    pub fn jones(self) -> Array1<Complex64> {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let inv_sqrt2 = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);

        match self {
            PolarizationState::Horizontal => array![one, zero],
            PolarizationState::Vertical => array![zero, one],
            PolarizationState::Plus45 => array![inv_sqrt2, inv_sqrt2],
            PolarizationState::Minus45 => array![inv_sqrt2, -inv_sqrt2],
        }
    }
}

impl fmt::Display for PolarizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PolarizationState::Horizontal => "H",
            PolarizationState::Vertical => "V",
            PolarizationState::Plus45 => "+45°",
            PolarizationState::Minus45 => "-45°",
        };
        f.write_str(label)
    }
}

/// Encodes a (bit, basis) pair as a polarization state.
pub fn state_for(bit: bool, basis: Basis) -> PolarizationState {
    match (basis, bit) {
        (Basis::Rectilinear, false) => PolarizationState::Horizontal,
        (Basis::Rectilinear, true) => PolarizationState::Vertical,
        (Basis::Diagonal, false) => PolarizationState::Plus45,
        (Basis::Diagonal, true) => PolarizationState::Minus45,
    }
}
