//! Standardized Student-t likelihood for TARCH-X residuals.
//!
//! Purpose
//! -------
//! Evaluate the total negative log-likelihood of the mean deviations under a
//! unit-variance Student-t density scaled by the filtered variance, and its
//! exact gradient with respect to the model parameters.
//!
//! For one observation with `q = ε² / (σ² (ν − 2))`:
//!
//! ```text
//! ℓ = C(ν) − ½ ln σ² − ((ν + 1)/2) ln(1 + q)
//! C(ν) = lnΓ((ν + 1)/2) − lnΓ(ν/2) − ½ ln(π (ν − 2))
//! ```
//!
//! Key behaviors
//! -------------
//! - [`negative_log_likelihood`] runs the filter and sums `−ℓₜ` over every
//!   observation, including `t = 0`.
//! - [`nll_with_gradient`] carries the variance sensitivities `∂σ²ₜ/∂p`
//!   forward with the filter in a single pass. Because `σ²₀` is the sample
//!   variance its sensitivities are zero, and each sensitivity obeys the
//!   same β-recursion as the variance itself. Where the floor binds the
//!   variance is locally constant, so its sensitivities reset to zero.
//!
//! Conventions
//! -----------
//! - Totals, not averages. The optimizer objective divides by `n`
//!   upstream; the Hessian used for inference is taken on the total.
//! - Gradients are in model-parameter space, laid out as `TarchParams`.
//!   Mapping to θ-space happens in the model via the transform Jacobian.
use crate::volatility::core::{
    data::TarchData,
    filter::{FilterOutput, apply_floor, raw_variance, variance_filter},
    params::{ALPHA, BETA, GAMMA, MEAN, N_CORE, NU, OMEGA, TarchParams},
};
use ndarray::Array1;
use statrs::function::gamma::{digamma, ln_gamma};
use std::f64::consts::PI;

/// Log normalizing constant `C(ν)` of the unit-variance Student-t.
pub fn student_t_log_norm(nu: f64) -> f64 {
    ln_gamma((nu + 1.0) / 2.0) - ln_gamma(nu / 2.0) - 0.5 * (PI * (nu - 2.0)).ln()
}

/// `dC/dν`.
pub fn student_t_log_norm_deriv(nu: f64) -> f64 {
    0.5 * digamma((nu + 1.0) / 2.0) - 0.5 * digamma(nu / 2.0) - 0.5 / (nu - 2.0)
}

/// Log density of one deviation given its variance.
#[inline]
pub fn log_density(dev: f64, var: f64, nu: f64, log_norm: f64) -> f64 {
    let q = dev * dev / (var * (nu - 2.0));
    log_norm - 0.5 * var.ln() - 0.5 * (nu + 1.0) * q.ln_1p()
}

/// Total negative log-likelihood of a filtered path.
pub fn filtered_nll(filtered: &FilterOutput, nu: f64) -> f64 {
    let log_norm = student_t_log_norm(nu);
    -filtered
        .deviations
        .iter()
        .zip(filtered.variance.iter())
        .map(|(&e, &s)| log_density(e, s, nu, log_norm))
        .sum::<f64>()
}

/// Total negative log-likelihood at `params`.
pub fn negative_log_likelihood(params: &TarchParams, data: &TarchData, floor: f64) -> f64 {
    filtered_nll(&variance_filter(params, data, floor), params.nu)
}

/// Total negative log-likelihood and its gradient in model-parameter space.
pub fn nll_with_gradient(
    params: &TarchParams, data: &TarchData, floor: f64,
) -> (f64, Array1<f64>) {
    let n = data.n_obs();
    let dim = TarchParams::dim(params.k());
    let nu = params.nu;
    let log_norm = student_t_log_norm(nu);
    let d_log_norm = student_t_log_norm_deriv(nu);

    let mut grad = Array1::<f64>::zeros(dim);
    let mut sens = Array1::<f64>::zeros(dim);
    let mut nll = 0.0;

    let mut prev_dev = 0.0;
    let mut prev_var = 0.0;
    for t in 0..n {
        let dev = data.returns[t] - params.mean;
        let var = if t == 0 {
            apply_floor(data.sample_var, floor).0
        } else {
            let x_t = data.exog.row(t);
            let exog_term = if params.k() == 0 { 0.0 } else { params.delta.dot(&x_t) };
            let (var, floored) =
                apply_floor(raw_variance(params, prev_dev, prev_var, exog_term), floor);
            if floored {
                sens.fill(0.0);
            } else {
                let neg = if prev_dev < 0.0 { 1.0 } else { 0.0 };
                let sq = prev_dev * prev_dev;
                sens.mapv_inplace(|d| params.beta * d);
                sens[MEAN] += -2.0 * (params.alpha + params.gamma * neg) * prev_dev;
                sens[OMEGA] += 1.0;
                sens[ALPHA] += sq;
                sens[GAMMA] += sq * neg;
                sens[BETA] += prev_var;
                for (j, &x) in x_t.iter().enumerate() {
                    sens[N_CORE + j] += x;
                }
            }
            var
        };

        let q = dev * dev / (var * (nu - 2.0));
        nll -= log_norm - 0.5 * var.ln() - 0.5 * (nu + 1.0) * q.ln_1p();

        let dl_dvar = -0.5 / var + 0.5 * (nu + 1.0) * q / (var * (1.0 + q));
        let dl_ddev = -(nu + 1.0) * dev / (var * (nu - 2.0) * (1.0 + q));
        let dl_dnu =
            d_log_norm + 0.5 * (nu + 1.0) * q / ((nu - 2.0) * (1.0 + q)) - 0.5 * q.ln_1p();

        if t > 0 {
            grad.scaled_add(-dl_dvar, &sens);
        }
        grad[MEAN] += dl_ddev;
        grad[NU] -= dl_dnu;

        prev_dev = dev;
        prev_var = var;
    }
    (nll, grad)
}
