//! Validated input container for TARCH-X estimation.
//!
//! Purpose
//! -------
//! Bundle a cleaned return series with its aligned exogenous design and the
//! summary statistics the model needs (sample mean and variance), enforcing
//! the input contract once at the boundary so the filter and likelihood can
//! assume well-formed data.
//!
//! Invariants & assumptions
//! ------------------------
//! - Returns are finite and at least [`MIN_OBSERVATIONS`] long.
//! - The exogenous design has exactly one row per return.
//! - The sample variance (ddof = 1) is finite and non-degenerate; it seeds
//!   the variance recursion at `t = 0` and is never re-estimated.
//! - Inputs are immutable once wrapped; every estimation reads them only.
use crate::volatility::{
    core::exog::ExogMatrix,
    errors::{TarchError, TarchResult},
};
use ndarray::Array1;

/// Smallest series accepted for estimation.
pub const MIN_OBSERVATIONS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct TarchData {
    pub returns: Array1<f64>,
    pub exog: ExogMatrix,
    pub sample_mean: f64,
    pub sample_var: f64,
}

impl TarchData {
    /// Validate returns against the exogenous design and precompute moments.
    ///
    /// Errors
    /// ------
    /// - `EmptySeries`, `NonFiniteReturn`, `TooFewObservations`.
    /// - `ExogLengthMismatch` if `exog.n_obs() != returns.len()`.
    /// - `DegenerateVariance` for a constant series.
    pub fn new(returns: Array1<f64>, exog: ExogMatrix) -> TarchResult<Self> {
        if returns.is_empty() {
            return Err(TarchError::EmptySeries);
        }
        for (index, &value) in returns.iter().enumerate() {
            if !value.is_finite() {
                return Err(TarchError::NonFiniteReturn { index, value });
            }
        }
        let n = returns.len();
        if n < MIN_OBSERVATIONS {
            return Err(TarchError::TooFewObservations { n_obs: n, min: MIN_OBSERVATIONS });
        }
        if exog.n_obs() != n {
            return Err(TarchError::ExogLengthMismatch {
                column: "<design>".to_string(),
                expected: n,
                found: exog.n_obs(),
            });
        }
        let sample_mean = returns.sum() / n as f64;
        let sample_var =
            returns.iter().map(|r| (r - sample_mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        // Rounding leaves a constant series with a variance of order ε·mean².
        if !(sample_var.is_finite() && sample_var > f64::EPSILON * sample_mean * sample_mean) {
            return Err(TarchError::DegenerateVariance { variance: sample_var });
        }
        Ok(Self { returns, exog, sample_mean, sample_var })
    }

    /// Returns without exogenous regressors.
    pub fn without_exog(returns: Array1<f64>) -> TarchResult<Self> {
        let n = returns.len();
        Self::new(returns, ExogMatrix::empty(n))
    }

    pub fn n_obs(&self) -> usize {
        self.returns.len()
    }

    /// Same returns with a different design (used by the exogenous fallback).
    pub fn with_exog(&self, exog: ExogMatrix) -> TarchResult<Self> {
        Self::new(self.returns.clone(), exog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volatility::core::exog::{ExogColumn, ExogTag};
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover construction and rejection paths of `TarchData::new`
    // and the precomputed sample moments.
    // -------------------------------------------------------------------------

    fn series() -> Array1<f64> {
        array![0.5, -1.0, 0.25, 2.0, -0.75, 0.0, 1.5, -2.5, 0.3, -0.3, 0.8, -0.1]
    }

    #[test]
    // Purpose
    // -------
    // Precompute mean and ddof = 1 variance.
    //
    // Given
    // -----
    // - A 12-point series with no exogenous columns.
    //
    // Expect
    // ------
    // - Moments match a direct computation.
    fn new_computes_sample_moments() {
        // Arrange
        let r = series();
        let mean = r.sum() / 12.0;
        let var = r.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / 11.0;

        // Act
        let data = TarchData::without_exog(r).expect("data should validate");

        // Assert
        assert!((data.sample_mean - mean).abs() < 1e-15);
        assert!((data.sample_var - var).abs() < 1e-15);
        assert_eq!(data.exog.k(), 0);
    }

    #[test]
    // Purpose
    // -------
    // Fail fast on malformed inputs.
    //
    // Given
    // -----
    // - Empty, non-finite, short, constant, and misaligned inputs.
    //
    // Expect
    // ------
    // - The matching `TarchError` for each.
    fn new_rejects_malformed_inputs() {
        // Arrange
        let mut with_inf = series();
        with_inf[3] = f64::INFINITY;
        let misaligned = ExogMatrix::new(
            5,
            vec![ExogColumn::new("e", ExogTag::Event, Array1::zeros(5))],
        )
        .expect("matrix should build");

        // Act / Assert
        assert_eq!(TarchData::without_exog(Array1::zeros(0)), Err(TarchError::EmptySeries));
        assert!(matches!(
            TarchData::without_exog(with_inf),
            Err(TarchError::NonFiniteReturn { index: 3, .. })
        ));
        assert_eq!(
            TarchData::without_exog(array![0.1, 0.2, 0.3]),
            Err(TarchError::TooFewObservations { n_obs: 3, min: MIN_OBSERVATIONS })
        );
        assert!(matches!(
            TarchData::without_exog(Array1::from_elem(20, 0.7)),
            Err(TarchError::DegenerateVariance { .. })
        ));
        assert!(matches!(
            TarchData::new(series(), misaligned),
            Err(TarchError::ExogLengthMismatch { expected: 12, found: 5, .. })
        ));
    }
}
