//! Two-sided t-tests for fitted coefficients.
//!
//! `t = estimate / se` and `p = 2 · P(T > |t|)` with `T ~ t(df)`,
//! `df = n_obs − n_params`. NaN standard errors propagate to NaN t-statistics
//! and p-values instead of failing the whole vector.
use crate::inference::errors::{InferenceError, InferenceResult};
use ndarray::Array1;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// t-statistics and two-sided p-values.
#[derive(Debug, Clone, PartialEq)]
pub struct Significance {
    pub t_stats: Array1<f64>,
    pub p_values: Array1<f64>,
}

/// Element-wise t-tests against zero.
///
/// # Errors
/// - `InvalidDegreesOfFreedom` if `df ≤ 0` or is not finite.
/// - `DimensionMismatch` if the two vectors differ in length.
pub fn t_tests(
    estimates: &Array1<f64>, std_errors: &Array1<f64>, df: f64,
) -> InferenceResult<Significance> {
    if estimates.len() != std_errors.len() {
        return Err(InferenceError::DimensionMismatch {
            expected: estimates.len(),
            found: (std_errors.len(), 1),
        });
    }
    if !(df.is_finite() && df > 0.0) {
        return Err(InferenceError::InvalidDegreesOfFreedom { df });
    }
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|_| InferenceError::InvalidDegreesOfFreedom { df })?;
    let t_stats: Array1<f64> =
        estimates.iter().zip(std_errors.iter()).map(|(&b, &se)| b / se).collect();
    let p_values = t_stats.mapv(|t| two_sided_p_value(&dist, t));
    Ok(Significance { t_stats, p_values })
}

/// `2 · sf(|t|)`, NaN for NaN input.
pub fn two_sided_p_value(dist: &StudentsT, t: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    (2.0 * dist.sf(t.abs())).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover p-values at known quantiles, NaN propagation, and
    // rejection of invalid degrees of freedom.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Match known Student-t quantiles.
    //
    // Given
    // -----
    // - df = 10; t = 2.228138851986 is the 0.975 quantile.
    // - A zero estimate and a NaN standard error.
    //
    // Expect
    // ------
    // - p ≈ 0.05 for the quantile, 1 for t = 0, NaN for the NaN entry.
    fn t_tests_match_quantiles_and_propagate_nan() {
        // Arrange
        let est = array![2.228138851986, 0.0, 0.4];
        let se = array![1.0, 0.3, f64::NAN];

        // Act
        let sig = t_tests(&est, &se, 10.0).expect("valid request");

        // Assert
        assert_relative_eq!(sig.p_values[0], 0.05, epsilon = 1e-9);
        assert_relative_eq!(sig.p_values[1], 1.0, epsilon = 1e-12);
        assert!(sig.t_stats[2].is_nan());
        assert!(sig.p_values[2].is_nan());
    }

    #[test]
    // Purpose
    // -------
    // Reject non-positive degrees of freedom.
    //
    // Given
    // -----
    // - df = 0.
    //
    // Expect
    // ------
    // - `InvalidDegreesOfFreedom`.
    fn t_tests_reject_zero_df() {
        // Act
        let res = t_tests(&array![1.0], &array![1.0], 0.0);

        // Assert
        assert_eq!(res, Err(InferenceError::InvalidDegreesOfFreedom { df: 0.0 }));
    }
}
