//! Shared checks for optimizer inputs and outputs.
//!
//! Tolerances must be finite and strictly positive when present. Gradients,
//! the final θ̂, and costs must be finite; gradients must also match the θ
//! dimension. Each check reports the first offending entry.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta},
};
use ndarray::Array1;

/// Index and value of the first non-finite entry, if any.
fn first_non_finite(values: &Array1<f64>) -> Option<(usize, f64)> {
    values.iter().copied().enumerate().find(|(_, v)| !v.is_finite())
}

/// Reason a present tolerance is rejected, if it is.
fn tolerance_problem(tol: f64) -> Option<&'static str> {
    if !tol.is_finite() {
        Some("Tolerance must be finite.")
    } else if tol <= 0.0 {
        Some("Tolerance must be positive.")
    } else {
        None
    }
}

/// `None` disables the gradient stopping rule.
///
/// # Errors
/// [`OptError::InvalidTolGrad`] for a non-finite or non-positive value.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    match tol.and_then(|t| tolerance_problem(t).map(|reason| (t, reason))) {
        Some((tol, reason)) => Err(OptError::InvalidTolGrad { tol, reason }),
        None => Ok(()),
    }
}

/// `None` disables the cost-change stopping rule.
///
/// # Errors
/// [`OptError::InvalidTolCost`] for a non-finite or non-positive value.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    match tol.and_then(|t| tolerance_problem(t).map(|reason| (t, reason))) {
        Some((tol, reason)) => Err(OptError::InvalidTolCost { tol, reason }),
        None => Ok(()),
    }
}

/// # Errors
/// - [`OptError::GradientDimMismatch`] if `grad.len() != dim`.
/// - [`OptError::InvalidGradient`] for the first non-finite entry.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match first_non_finite(grad) {
        Some((index, value)) => Err(OptError::InvalidGradient {
            index,
            value,
            reason: "Gradient elements must be finite.",
        }),
        None => Ok(()),
    }
}

/// Unwrap the solver's best parameter vector.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if the solver kept no parameter.
/// - [`OptError::InvalidThetaHat`] for the first non-finite entry.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta = theta_hat.ok_or(OptError::MissingThetaHat)?;
    match first_non_finite(&theta) {
        Some((index, value)) => Err(OptError::InvalidThetaHat {
            index,
            value,
            reason: "Parameter estimates must be finite.",
        }),
        None => Ok(theta),
    }
}

/// Average negative log-likelihoods can be negative for small return
/// variances; only NaN and ±∞ are rejected.
///
/// # Errors
/// [`OptError::NonFiniteCost`].
pub fn validate_value(value: f64) -> OptResult<()> {
    if value.is_finite() { Ok(()) } else { Err(OptError::NonFiniteCost { value }) }
}
