//! Linear-algebra helpers for single-photon polarization states.
//!
//! Jones vectors are `Array1<Complex64>` of length 2 and operators are
//! `Array2<Complex64>` of shape 2x2.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Computes the outer product of two vectors $|a\rangle\langle b|$.
pub fn outer_product(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Array2<Complex64> {
    let n = a.len();
    let m = b.len();
    let mut res = Array2::zeros((n, m));

    for i in 0..n {
        for j in 0..m {
            res[[i, j]] = a[i] * b[j].conj();
        }
    }
    res
}

/// Computes the trace of a matrix (sum of diagonal elements).
pub fn trace(matrix: &Array2<Complex64>) -> Complex64 {
    matrix.diag().sum()
}

/// Projector $|v\rangle\langle v|$ onto a pure state.
pub fn projector(v: &Array1<Complex64>) -> Array2<Complex64> {
    outer_product(v, v)
}

/// Born-rule probability $\mathrm{Tr}(P \rho)$ of projector `p` on the pure state `psi`.
///
/// Negative round-off is clamped to zero.
pub fn born_probability(p: &Array2<Complex64>, psi: &Array1<Complex64>) -> f64 {
    let rho = projector(psi);
    trace(&p.dot(&rho)).re.max(0.0)
}

/// Checks completeness relation $\sum P_k = I$ for a set of projectors.
pub fn check_completeness(ops: &[Array2<Complex64>], dim: usize) -> bool {
    let mut sum = Array2::<Complex64>::zeros((dim, dim));
    for op in ops {
        sum += op;
    }
    let identity = Array2::<Complex64>::eye(dim);
    (sum - identity).iter().all(|x| x.norm() < 1e-9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn outer_product_of_basis_vector_is_projector() {
        let v = array![c(1.0), c(0.0)];
        let p = outer_product(&v, &v);
        assert_eq!(p[[0, 0]], c(1.0));
        assert_eq!(p[[1, 1]], c(0.0));
        assert_eq!(trace(&p), c(1.0));
    }

    #[test]
    fn born_probability_of_conjugate_states_is_half() {
        let h = array![c(1.0), c(0.0)];
        let s = 1.0 / 2.0_f64.sqrt();
        let diag = array![c(s), c(s)];
        let p = born_probability(&projector(&h), &diag);
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn computational_projectors_are_complete() {
        let p0 = projector(&array![c(1.0), c(0.0)]);
        let p1 = projector(&array![c(0.0), c(1.0)]);
        assert!(check_completeness(&[p0.clone(), p1], 2));
        assert!(!check_completeness(&[p0], 2));
    }
}
