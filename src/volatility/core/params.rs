//! Fixed-schema parameter vector for the TARCH-X model.
//!
//! Layout (length `6 + k`):
//!
//! | index | field   | meaning                              |
//! |-------|---------|--------------------------------------|
//! | 0     | `mean`  | constant mean of returns             |
//! | 1     | `omega` | variance intercept ω                 |
//! | 2     | `alpha` | shock response α                     |
//! | 3     | `gamma` | leverage / asymmetry γ               |
//! | 4     | `beta`  | variance persistence β               |
//! | 5     | `nu`    | Student-t degrees of freedom ν       |
//! | 6..   | `delta` | one δⱼ per exogenous column          |
use crate::volatility::errors::{TarchError, TarchResult};
use ndarray::{Array1, ArrayView1, s};

pub const MEAN: usize = 0;
pub const OMEGA: usize = 1;
pub const ALPHA: usize = 2;
pub const GAMMA: usize = 3;
pub const BETA: usize = 4;
pub const NU: usize = 5;
/// Number of parameters that do not depend on the exogenous design.
pub const N_CORE: usize = 6;

/// Names of the core parameters, in layout order.
pub const CORE_NAMES: [&str; N_CORE] = ["mean", "omega", "alpha", "gamma", "beta", "nu"];

/// Model-space parameters `(μ, ω, α, γ, β, ν, δ₁…δₖ)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TarchParams {
    pub mean: f64,
    pub omega: f64,
    pub alpha: f64,
    pub gamma: f64,
    pub beta: f64,
    pub nu: f64,
    pub delta: Array1<f64>,
}

impl TarchParams {
    /// Total parameter count for `k` exogenous columns.
    pub fn dim(k: usize) -> usize {
        N_CORE + k
    }

    pub fn k(&self) -> usize {
        self.delta.len()
    }

    /// Unpack a flat vector laid out as in the module table.
    ///
    /// # Errors
    /// - `TarchError::ThetaLengthMismatch` if `values.len() != 6 + k`.
    pub fn from_slice(values: ArrayView1<f64>, k: usize) -> TarchResult<Self> {
        let expected = Self::dim(k);
        if values.len() != expected {
            return Err(TarchError::ThetaLengthMismatch { expected, actual: values.len() });
        }
        Ok(Self {
            mean: values[MEAN],
            omega: values[OMEGA],
            alpha: values[ALPHA],
            gamma: values[GAMMA],
            beta: values[BETA],
            nu: values[NU],
            delta: values.slice(s![N_CORE..]).to_owned(),
        })
    }

    /// Flatten into the layout described in the module table.
    pub fn to_array(&self) -> Array1<f64> {
        let mut out = Array1::zeros(Self::dim(self.k()));
        out[MEAN] = self.mean;
        out[OMEGA] = self.omega;
        out[ALPHA] = self.alpha;
        out[GAMMA] = self.gamma;
        out[BETA] = self.beta;
        out[NU] = self.nu;
        out.slice_mut(s![N_CORE..]).assign(&self.delta);
        out
    }

    /// Persistence `α + β + |γ|/2` entering the stationarity constraint.
    pub fn persistence(&self) -> f64 {
        persistence(self.alpha, self.gamma, self.beta)
    }

    /// Parameter labels in layout order; δ labels carry the column name.
    pub fn names(exog_names: &[String]) -> Vec<String> {
        CORE_NAMES
            .iter()
            .map(|s| s.to_string())
            .chain(exog_names.iter().map(|name| format!("delta[{name}]")))
            .collect()
    }
}

/// Persistence `α + β + |γ|/2` of the asymmetric recursion.
pub fn persistence(alpha: f64, gamma: f64, beta: f64) -> f64 {
    alpha + beta + gamma.abs() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover layout packing, length validation, persistence, and
    // labeling.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Unpack a flat vector and flatten it back.
    //
    // Given
    // -----
    // - A length-8 vector with k = 2.
    //
    // Expect
    // ------
    // - Fields land at their documented indices and `to_array` is the inverse.
    fn from_slice_and_to_array_follow_layout() {
        // Arrange
        let flat = array![0.01, 0.02, 0.05, -0.1, 0.85, 6.0, 0.3, -0.2];

        // Act
        let params = TarchParams::from_slice(flat.view(), 2).expect("layout should match");

        // Assert
        assert_eq!(params.omega, 0.02);
        assert_eq!(params.gamma, -0.1);
        assert_eq!(params.nu, 6.0);
        assert_eq!(params.delta, array![0.3, -0.2]);
        assert_eq!(params.to_array(), flat);
        assert!((params.persistence() - 0.95).abs() < 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Reject vectors whose length does not match 6 + k.
    //
    // Given
    // -----
    // - A length-6 vector with k = 1.
    //
    // Expect
    // ------
    // - `ThetaLengthMismatch { expected: 7, actual: 6 }`.
    fn from_slice_rejects_wrong_length() {
        // Arrange
        let flat = array![0.0, 0.1, 0.05, 0.0, 0.9, 5.0];

        // Act
        let res = TarchParams::from_slice(flat.view(), 1);

        // Assert
        assert_eq!(res, Err(TarchError::ThetaLengthMismatch { expected: 7, actual: 6 }));
    }

    #[test]
    // Purpose
    // -------
    // Label parameters in layout order.
    //
    // Given
    // -----
    // - One exogenous column named "halving".
    //
    // Expect
    // ------
    // - Seven names ending in "delta[halving]".
    fn names_follow_layout() {
        // Act
        let names = TarchParams::names(&["halving".to_string()]);

        // Assert
        assert_eq!(names.len(), 7);
        assert_eq!(names[BETA], "beta");
        assert_eq!(names[6], "delta[halving]");
    }
}
