//! inference::hessian — numerical Hessian and eigen-based covariance.
//!
//! Purpose
//! -------
//! Turn a scalar objective (the total negative log-likelihood) into a
//! covariance matrix and standard errors at a fitted point, without
//! raising on singular or indefinite curvature.
//!
//! Key behaviors
//! -------------
//! - [`numerical_hessian`] uses central differences with a parameter-scaled
//!   step `hᵢ = rel_step · max(|xᵢ|, 1)`: the standard three-point second
//!   difference on the diagonal and the four-point stencil
//!   `(f₊₊ − f₊₋ − f₋₊ + f₋₋) / (4 hᵢ hⱼ)` off the diagonal.
//! - [`covariance_from_hessian`] forms the Moore–Penrose pseudo-inverse
//!   from a symmetric eigendecomposition (`nalgebra::SymmetricEigen`),
//!   dropping eigenvalues at or below `eigen_tol · λ_max`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The input matrix is symmetrized as `(H + Hᵀ)/2` before decomposition.
//! - A parameter whose squared loadings on dropped directions sum to more
//!   than [`LOADING_TOL`] lies materially in the unidentified subspace and
//!   gets a NaN standard error. Parameters with only a small coupling to a
//!   dropped direction (typical when another estimate sits on a bound)
//!   keep the standard error implied by the kept directions.
//! - Any dropped direction, or any non-finite Hessian entry, marks the
//!   covariance as unreliable. Point estimates are never touched here.
//!
//! Conventions
//! -----------
//! - The objective is a *negative* log-likelihood on the total (not
//!   average) scale, so its Hessian is the observed information and the
//!   covariance is its inverse without rescaling by `n`.
//! - No explicit matrix inverse is formed.
//!
//! Testing notes
//! -------------
//! - Unit tests cover exact recovery on quadratics, the coupled off-diagonal
//!   stencil, and NaN propagation for a flat direction.
use crate::inference::errors::{InferenceError, InferenceResult};
use crate::optimization::numerical_stability::transformations::EIGEN_EPS;
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

/// Share of a parameter's unit eigen-loading on dropped directions above
/// which its variance is reported as undefined. A column repeated up to
/// nineteen times still marks every copy.
pub const LOADING_TOL: f64 = 0.05;

/// Settings for the numerical Hessian and its pseudo-inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HessianOptions {
    /// Relative finite-difference step.
    pub rel_step: f64,
    /// Relative eigenvalue cutoff for the pseudo-inverse.
    pub eigen_tol: f64,
}

impl Default for HessianOptions {
    fn default() -> Self {
        Self { rel_step: 1e-5, eigen_tol: EIGEN_EPS }
    }
}

/// Covariance of the estimates and per-parameter standard errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Covariance {
    pub matrix: Array2<f64>,
    pub std_errors: Array1<f64>,
    /// `true` for parameters whose standard error is undefined.
    pub singular: Vec<bool>,
    /// Number of eigen-directions dropped by the cutoff.
    pub dropped_directions: usize,
    pub unreliable: bool,
}

impl Covariance {
    /// Covariance with every entry undefined.
    pub fn undefined(dim: usize) -> Self {
        Self {
            matrix: Array2::from_elem((dim, dim), f64::NAN),
            std_errors: Array1::from_elem(dim, f64::NAN),
            singular: vec![true; dim],
            dropped_directions: dim,
            unreliable: true,
        }
    }
}

/// Central-difference Hessian of `f` at `x`.
///
/// Costs `1 + 2p + 4·p(p−1)/2` evaluations for `p = x.len()`.
///
/// # Errors
/// - `InvalidStep` if `rel_step` is not finite and positive.
/// - `EmptyParameterVector` if `x` is empty.
/// - `NonFiniteObjective` if `f(x)` is not finite.
pub fn numerical_hessian<F>(f: F, x: &Array1<f64>, rel_step: f64) -> InferenceResult<Array2<f64>>
where
    F: Fn(&Array1<f64>) -> f64,
{
    if !(rel_step.is_finite() && rel_step > 0.0) {
        return Err(InferenceError::InvalidStep { step: rel_step });
    }
    let p = x.len();
    if p == 0 {
        return Err(InferenceError::EmptyParameterVector);
    }
    let f0 = f(x);
    if !f0.is_finite() {
        return Err(InferenceError::NonFiniteObjective { value: f0 });
    }
    let h: Array1<f64> = x.mapv(|xi| rel_step * xi.abs().max(1.0));
    let eval = |shifts: &[(usize, f64)]| {
        let mut y = x.clone();
        for &(i, d) in shifts {
            y[i] += d;
        }
        f(&y)
    };

    let mut hess = Array2::<f64>::zeros((p, p));
    for i in 0..p {
        let fp = eval(&[(i, h[i])]);
        let fm = eval(&[(i, -h[i])]);
        hess[[i, i]] = (fp - 2.0 * f0 + fm) / (h[i] * h[i]);
        for j in 0..i {
            let fpp = eval(&[(i, h[i]), (j, h[j])]);
            let fpm = eval(&[(i, h[i]), (j, -h[j])]);
            let fmp = eval(&[(i, -h[i]), (j, h[j])]);
            let fmm = eval(&[(i, -h[i]), (j, -h[j])]);
            let hij = (fpp - fpm - fmp + fmm) / (4.0 * h[i] * h[j]);
            hess[[i, j]] = hij;
            hess[[j, i]] = hij;
        }
    }
    Ok(hess)
}

/// Pseudo-inverse covariance from a Hessian of the negative log-likelihood.
///
/// Eigenvalues `λₖ ≤ eigen_tol · λ_max` (including every non-positive
/// eigenvalue) are dropped. For each parameter `i`:
///
/// - `Var(i) = Σ_{kept k} Q[i,k]² / λₖ`;
/// - if `Σ_{dropped k} Q[i,k]² > LOADING_TOL`, the variance is undefined
///   and the standard error is NaN.
///
/// A Hessian with non-finite entries yields [`Covariance::undefined`].
///
/// # Errors
/// - `DimensionMismatch` if `hessian` is not square.
pub fn covariance_from_hessian(
    hessian: &Array2<f64>, eigen_tol: f64,
) -> InferenceResult<Covariance> {
    let (rows, cols) = hessian.dim();
    if rows != cols {
        return Err(InferenceError::DimensionMismatch { expected: rows, found: (rows, cols) });
    }
    let p = rows;
    if hessian.iter().any(|v| !v.is_finite()) {
        return Ok(Covariance::undefined(p));
    }
    let sym = DMatrix::<f64>::from_fn(p, p, |i, j| 0.5 * (hessian[[i, j]] + hessian[[j, i]]));
    let eigen = sym.symmetric_eigen();
    let q = eigen.eigenvectors;
    let lambdas = eigen.eigenvalues;
    let lambda_max = lambdas.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let cutoff = eigen_tol * lambda_max.max(0.0);
    let kept: Vec<bool> = lambdas.iter().map(|&l| l > 0.0 && l > cutoff).collect();
    let dropped_directions = kept.iter().filter(|&&k| !k).count();

    let mut matrix = Array2::<f64>::zeros((p, p));
    for (k, &lambda) in lambdas.iter().enumerate() {
        if !kept[k] {
            continue;
        }
        for i in 0..p {
            for j in 0..p {
                matrix[[i, j]] += q[(i, k)] * q[(j, k)] / lambda;
            }
        }
    }

    let singular: Vec<bool> = (0..p)
        .map(|i| {
            let loading: f64 =
                (0..p).filter(|&k| !kept[k]).map(|k| q[(i, k)] * q[(i, k)]).sum();
            loading > LOADING_TOL
        })
        .collect();
    for i in 0..p {
        if singular[i] {
            matrix.row_mut(i).fill(f64::NAN);
            matrix.column_mut(i).fill(f64::NAN);
        }
    }
    let std_errors = Array1::from_shape_fn(p, |i| {
        if singular[i] { f64::NAN } else { matrix[[i, i]].max(0.0).sqrt() }
    });

    Ok(Covariance {
        matrix,
        std_errors,
        singular,
        dropped_directions,
        unreliable: dropped_directions > 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Recovery of a known Hessian from a quadratic objective.
    // - Covariance and standard errors for a positive-definite Hessian.
    // - NaN standard errors confined to a flat direction.
    // - Finite standard errors for parameters weakly coupled to a dropped
    //   direction.
    // - Input validation.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Recover the Hessian of a coupled quadratic.
    //
    // Given
    // -----
    // - f(x) = ½ xᵀ A x with A = [[4, 1], [1, 2]], evaluated at (3, -2).
    //
    // Expect
    // ------
    // - The numerical Hessian equals A to 1e-4.
    fn numerical_hessian_recovers_quadratic_form() {
        // Arrange
        let a = array![[4.0, 1.0], [1.0, 2.0]];
        let f = |x: &Array1<f64>| 0.5 * x.dot(&a.dot(x));
        let x = array![3.0, -2.0];

        // Act
        let hess = numerical_hessian(f, &x, 1e-4).expect("hessian should evaluate");

        // Assert
        for (h, e) in hess.iter().zip(a.iter()) {
            assert_relative_eq!(*h, *e, epsilon = 1e-4);
        }
    }

    #[test]
    // Purpose
    // -------
    // A positive-definite Hessian inverts exactly.
    //
    // Given
    // -----
    // - H = [[4, 1], [1, 2]], whose inverse is [[2, -1], [-1, 4]] / 7.
    //
    // Expect
    // ------
    // - Matching covariance, SE = sqrt of its diagonal, reliable.
    fn covariance_inverts_positive_definite_hessian() {
        // Arrange
        let h = array![[4.0, 1.0], [1.0, 2.0]];

        // Act
        let cov = covariance_from_hessian(&h, EIGEN_EPS).expect("square input");

        // Assert
        assert_relative_eq!(cov.matrix[[0, 0]], 2.0 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(cov.matrix[[0, 1]], -1.0 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(cov.std_errors[1], (4.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
        assert!(!cov.unreliable);
        assert_eq!(cov.dropped_directions, 0);
    }

    #[test]
    // Purpose
    // -------
    // A flat direction only poisons the parameters that load on it.
    //
    // Given
    // -----
    // - H = diag(2, 0, 8).
    //
    // Expect
    // ------
    // - SE = (√0.5, NaN, √0.125); the result is flagged unreliable.
    fn flat_direction_yields_nan_only_for_its_parameter() {
        // Arrange
        let h = array![[2.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 8.0]];

        // Act
        let cov = covariance_from_hessian(&h, EIGEN_EPS).expect("square input");

        // Assert
        assert_relative_eq!(cov.std_errors[0], 0.5_f64.sqrt(), epsilon = 1e-12);
        assert!(cov.std_errors[1].is_nan());
        assert_relative_eq!(cov.std_errors[2], 0.125_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(cov.singular, vec![false, true, false]);
        assert!(cov.unreliable);
    }

    #[test]
    // Purpose
    // -------
    // A well-identified parameter keeps its standard error when it is only
    // weakly coupled to a direction with negative curvature, as happens when
    // another estimate sits on its bound.
    //
    // Given
    // -----
    // - H = [[378, 1], [1, −7.6]]: the dropped eigenvector carries a squared
    //   loading of about 7e-6 on the first parameter.
    //
    // Expect
    // ------
    // - SE₀ ≈ 1/√378; SE₁ is NaN; one direction dropped; unreliable.
    fn weak_coupling_to_dropped_direction_keeps_standard_error() {
        // Arrange
        let h = array![[378.0, 1.0], [1.0, -7.6]];

        // Act
        let cov = covariance_from_hessian(&h, EIGEN_EPS).expect("square input");

        // Assert
        assert_relative_eq!(cov.std_errors[0], (1.0_f64 / 378.0).sqrt(), max_relative = 1e-4);
        assert!(cov.std_errors[1].is_nan());
        assert_eq!(cov.singular, vec![false, true]);
        assert_eq!(cov.dropped_directions, 1);
        assert!(cov.unreliable);
    }

    #[test]
    // Purpose
    // -------
    // Reject malformed inputs.
    //
    // Given
    // -----
    // - A zero step, an empty vector, and a 2×3 matrix.
    //
    // Expect
    // ------
    // - `InvalidStep`, `EmptyParameterVector`, `DimensionMismatch`.
    fn inputs_are_validated() {
        // Arrange
        let f = |x: &Array1<f64>| x.sum();

        // Act / Assert
        assert_eq!(
            numerical_hessian(f, &array![1.0], 0.0),
            Err(InferenceError::InvalidStep { step: 0.0 })
        );
        assert_eq!(
            numerical_hessian(f, &Array1::zeros(0), 1e-5),
            Err(InferenceError::EmptyParameterVector)
        );
        assert!(matches!(
            covariance_from_hessian(&Array2::zeros((2, 3)), EIGEN_EPS),
            Err(InferenceError::DimensionMismatch { .. })
        ));
    }
}
