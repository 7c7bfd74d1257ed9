//! Mapping between unconstrained optimizer coordinates θ and model parameters.
//!
//! Purpose
//! -------
//! Let the optimizer search over all of ℝ^(6+k) while every point it visits
//! maps to parameters that satisfy the box bounds and the stationarity
//! inequality `α + β + |γ|/2 < S`. Constraints are therefore satisfied by
//! construction instead of by penalty.
//!
//! Key behaviors
//! -------------
//! - μ is the identity; ω is `ω_min + softplus(θ₁)`.
//! - γ, ν, and every δⱼ are scaled logistics over their intervals.
//! - α and β share the persistence budget `B(γ) = S − margin − |γ|/2`:
//!   α's effective ceiling is `min(α_hi, B − β_lo)` and β's effective
//!   ceiling is `min(β_hi, B − α)`. Both ceilings are strictly above the
//!   matching floor whenever the bounds passed their feasibility check.
//! - [`ParamTransform::to_params_with_jacobian`] also returns the exact
//!   Jacobian `∂params/∂θ` so the θ-gradient is `Jᵀ ∇params`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every mapped point satisfies `α + β + |γ|/2 ≤ S − STATIONARITY_MARGIN`
//!   up to the logistic clamp, regardless of θ.
//! - Logistic outputs are clamped to `[LOGIT_EPS, 1 − LOGIT_EPS]`; where the
//!   clamp is active the Jacobian entry is zero.
//! - [`ParamTransform::to_theta`] only accepts points strictly inside the
//!   admissible region.
use crate::optimization::numerical_stability::transformations::{
    clamped_logistic, safe_logistic, safe_softplus, safe_softplus_inv, scaled_logistic,
    scaled_logit,
};
use crate::volatility::{
    core::{
        bounds::ParamBounds,
        options::check_interior,
        params::{ALPHA, BETA, GAMMA, MEAN, N_CORE, NU, OMEGA, TarchParams},
    },
    errors::{TarchError, TarchResult},
};
use ndarray::{Array1, Array2};

/// θ ↔ parameter map for a fixed set of bounds and `k` exogenous columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamTransform {
    pub bounds: ParamBounds,
    pub k: usize,
}

impl ParamTransform {
    pub fn new(bounds: ParamBounds, k: usize) -> Self {
        Self { bounds, k }
    }

    pub fn dim(&self) -> usize {
        N_CORE + self.k
    }

    /// Reject θ vectors with the wrong length or non-finite entries.
    pub fn validate_theta(&self, theta: &Array1<f64>) -> TarchResult<()> {
        if theta.len() != self.dim() {
            return Err(TarchError::ThetaLengthMismatch {
                expected: self.dim(),
                actual: theta.len(),
            });
        }
        if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(TarchError::NonFiniteTheta { index, value });
        }
        Ok(())
    }

    /// Model parameters for `theta`.
    pub fn to_params(&self, theta: &Array1<f64>) -> TarchResult<TarchParams> {
        Ok(self.to_params_with_jacobian(theta)?.0)
    }

    /// Model parameters for `theta` and the Jacobian `J[i, j] = ∂pᵢ/∂θⱼ`.
    ///
    /// Only a handful of off-diagonal entries are ever non-zero: α depends on
    /// θ₃ through the budget, and β depends on θ₂ and θ₃ through α and γ.
    pub fn to_params_with_jacobian(
        &self, theta: &Array1<f64>,
    ) -> TarchResult<(TarchParams, Array2<f64>)> {
        self.validate_theta(theta)?;
        let b = &self.bounds;
        let dim = self.dim();
        let mut jac = Array2::<f64>::zeros((dim, dim));

        let mean = theta[MEAN];
        jac[[MEAN, MEAN]] = 1.0;

        let omega = b.omega_min + safe_softplus(theta[OMEGA]);
        jac[[OMEGA, OMEGA]] = safe_logistic(theta[OMEGA]);

        let (gamma, d_gamma) = scaled_logistic(theta[GAMMA], b.gamma.lower, b.gamma.upper);
        jac[[GAMMA, GAMMA]] = d_gamma;
        let budget = b.persistence_budget(gamma);
        let d_budget = -sign(gamma) / 2.0 * d_gamma;

        let (l_alpha, dl_alpha) = clamped_logistic(theta[ALPHA]);
        let alpha_cap = b.alpha.upper.min(budget - b.beta.lower);
        let alpha = b.alpha.lower + (alpha_cap - b.alpha.lower) * l_alpha;
        jac[[ALPHA, ALPHA]] = (alpha_cap - b.alpha.lower) * dl_alpha;
        if budget - b.beta.lower < b.alpha.upper {
            jac[[ALPHA, GAMMA]] = l_alpha * d_budget;
        }

        let (l_beta, dl_beta) = clamped_logistic(theta[BETA]);
        let beta_cap = b.beta.upper.min(budget - alpha);
        let beta = b.beta.lower + (beta_cap - b.beta.lower) * l_beta;
        jac[[BETA, BETA]] = (beta_cap - b.beta.lower) * dl_beta;
        if budget - alpha < b.beta.upper {
            jac[[BETA, ALPHA]] = -l_beta * jac[[ALPHA, ALPHA]];
            jac[[BETA, GAMMA]] = l_beta * (d_budget - jac[[ALPHA, GAMMA]]);
        }

        let (nu, d_nu) = scaled_logistic(theta[NU], b.nu.lower, b.nu.upper);
        jac[[NU, NU]] = d_nu;

        let mut delta = Array1::<f64>::zeros(self.k);
        for j in 0..self.k {
            let idx = N_CORE + j;
            let (value, deriv) = scaled_logistic(theta[idx], b.delta.lower, b.delta.upper);
            delta[j] = value;
            jac[[idx, idx]] = deriv;
        }

        Ok((TarchParams { mean, omega, alpha, gamma, beta, nu, delta }, jac))
    }

    /// Unconstrained coordinates for an interior parameter point.
    ///
    /// Errors
    /// ------
    /// - `ThetaLengthMismatch` if `params.k() != k`.
    /// - `InvalidStartValue` if the point is not strictly admissible.
    pub fn to_theta(&self, params: &TarchParams) -> TarchResult<Array1<f64>> {
        if params.k() != self.k {
            return Err(TarchError::ThetaLengthMismatch {
                expected: self.dim(),
                actual: TarchParams::dim(params.k()),
            });
        }
        check_interior(params, &self.bounds)?;
        let b = &self.bounds;
        let mut theta = Array1::<f64>::zeros(self.dim());
        theta[MEAN] = params.mean;
        theta[OMEGA] = safe_softplus_inv(params.omega - b.omega_min);
        theta[GAMMA] = scaled_logit(params.gamma, b.gamma.lower, b.gamma.upper);
        let budget = b.persistence_budget(params.gamma);
        let alpha_cap = b.alpha.upper.min(budget - b.beta.lower);
        theta[ALPHA] = scaled_logit(params.alpha, b.alpha.lower, alpha_cap);
        let beta_cap = b.beta.upper.min(budget - params.alpha);
        theta[BETA] = scaled_logit(params.beta, b.beta.lower, beta_cap);
        theta[NU] = scaled_logit(params.nu, b.nu.lower, b.nu.upper);
        for (j, &d) in params.delta.iter().enumerate() {
            theta[N_CORE + j] = scaled_logit(d, b.delta.lower, b.delta.upper);
        }
        Ok(theta)
    }
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
