//! Numerical stability utilities.
//!
//! Provides safe implementations of the nonlinear transforms used to map an
//! unconstrained optimizer vector into bounded model parameters. The
//! functions here follow guarded strategies similar to those in major ML
//! libraries (e.g. PyTorch, TensorFlow), using explicit cutoffs (`x > 20.0`)
//! to keep `f64` arithmetic in a well-conditioned regime.
//!
//! # Provided items
//! - [`STATIONARITY_MARGIN`]: ε buffer keeping `α + β + |γ|/2` strictly
//!   below the configured stationarity threshold.
//! - [`LOGIT_EPS`]: clamp applied to logistic outputs so mapped parameters
//!   never touch their open-interval bounds.
//! - [`EIGEN_EPS`]: relative eigenvalue cutoff for pseudo-inverting
//!   observed-information matrices.
//! - [`safe_softplus`] / [`safe_softplus_inv`]: ℝ ↔ (0, ∞).
//! - [`safe_logistic`] / [`safe_logit`]: ℝ ↔ (0, 1).
//! - [`clamped_logistic`]: logistic value together with its derivative,
//!   clamped to `[LOGIT_EPS, 1 − LOGIT_EPS]`.
//! - [`scaled_logistic`]: affine map of [`clamped_logistic`] into `(lo, hi)`.

/// Safety margin for strict stationarity of the variance recursion.
///
/// The stationarity condition `α + β + |γ|/2 < S` is enforced *strictly* by
/// reserving this buffer below the configured threshold `S`, so the
/// recursion never runs on the boundary of the persistent region.
pub const STATIONARITY_MARGIN: f64 = 1e-6;

/// Clamp applied to logistic outputs.
///
/// Keeps box-bounded parameters strictly inside `(lo, hi)` even when the
/// optimizer pushes a coordinate of θ to ±∞.
pub const LOGIT_EPS: f64 = 1e-10;

/// Relative eigenvalue threshold for observed-information matrices.
///
/// Eigenvalues at or below `EIGEN_EPS · λ_max` are treated as zero when
/// pseudo-inverting a Hessian.
pub const EIGEN_EPS: f64 = 1e-10;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// - For sufficiently large `x`, `softplus(x) ≈ x`.
/// - Otherwise, it falls back to `ln1p(exp(x))`.
///
/// The derivative of softplus is [`safe_logistic`].
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Stable inverse of softplus on `(0, ∞)`: solves for `t` in
/// `softplus(t) = x`, returning `t = ln(exp(x) - 1)`.
///
/// - For sufficiently large `x`, `ln(exp(x) - 1) ≈ x`.
/// - Otherwise, it uses `ln(expm1(x))`.
///
/// # Parameters
/// - `x`: a positive real (the softplus output), must be finite and `> 0`.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp_m1().ln() }
}

/// Numerically stable logistic sigmoid `1 / (1 + exp(-x))`.
///
/// Branches on the sign of `x` so `exp` is only ever evaluated at a
/// non-positive argument.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// Logit of a probability, clamped to `[LOGIT_EPS, 1 − LOGIT_EPS]` first.
///
/// Inverse of [`safe_logistic`] on the clamped range.
pub fn safe_logit(p: f64) -> f64 {
    let p = p.clamp(LOGIT_EPS, 1.0 - LOGIT_EPS);
    p.ln() - (-p).ln_1p()
}

/// Logistic value and derivative, clamped to `[LOGIT_EPS, 1 − LOGIT_EPS]`.
///
/// Returns `(L(x), L'(x))`. When the clamp is active the derivative is
/// reported as zero so analytic gradients agree with the mapped values.
pub fn clamped_logistic(x: f64) -> (f64, f64) {
    let p = safe_logistic(x);
    if p < LOGIT_EPS {
        (LOGIT_EPS, 0.0)
    } else if p > 1.0 - LOGIT_EPS {
        (1.0 - LOGIT_EPS, 0.0)
    } else {
        (p, p * (1.0 - p))
    }
}

/// Map `x ∈ ℝ` into the open interval `(lo, hi)` via a clamped logistic.
///
/// Returns `(value, d value / dx)`.
pub fn scaled_logistic(x: f64, lo: f64, hi: f64) -> (f64, f64) {
    let (p, dp) = clamped_logistic(x);
    (lo + (hi - lo) * p, (hi - lo) * dp)
}

/// Inverse of [`scaled_logistic`] for `value ∈ (lo, hi)`.
pub fn scaled_logit(value: f64, lo: f64, hi: f64) -> f64 {
    safe_logit((value - lo) / (hi - lo))
}
