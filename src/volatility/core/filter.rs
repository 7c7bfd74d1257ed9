//! TARCH-X conditional variance recursion.
//!
//! For `t ≥ 1`:
//!
//! ```text
//! σ²ₜ = ω + α·ε²ₜ₋₁ + γ·ε²ₜ₋₁·1[εₜ₋₁ < 0] + β·σ²ₜ₋₁ + Σⱼ δⱼ·xⱼ,ₜ
//! ```
//!
//! with `εₜ = rₜ − μ` and `σ²₀` equal to the sample variance of the returns.
//! Every variance, including `σ²₀`, is floored at the configured variance
//! floor; the indices where the floor bound are reported so callers can flag
//! them. With `k = 0` the exogenous term vanishes and the recursion is the
//! plain asymmetric GARCH(1,1) filter.
use crate::volatility::core::{data::TarchData, params::TarchParams};
use ndarray::Array1;

/// Filtered path for one parameter vector.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutput {
    /// Conditional variances `σ²ₜ` (all ≥ floor).
    pub variance: Array1<f64>,
    /// Mean deviations `εₜ = rₜ − μ`.
    pub deviations: Array1<f64>,
    /// `true` where the raw recursion fell below the floor.
    pub floored: Vec<bool>,
}

impl FilterOutput {
    pub fn n_floored(&self) -> usize {
        self.floored.iter().filter(|&&f| f).count()
    }

    /// Standardized residuals `εₜ / σₜ`.
    pub fn std_residuals(&self) -> Array1<f64> {
        &self.deviations / &self.variance.mapv(f64::sqrt)
    }
}

/// Unfloored one-step update given last period's deviation and variance.
#[inline]
pub fn raw_variance(params: &TarchParams, prev_dev: f64, prev_var: f64, exog_term: f64) -> f64 {
    let leverage = if prev_dev < 0.0 { params.gamma } else { 0.0 };
    params.omega + (params.alpha + leverage) * prev_dev * prev_dev + params.beta * prev_var
        + exog_term
}

/// Apply `floor` to a raw variance; NaN also maps to the floor.
#[inline]
pub fn apply_floor(raw: f64, floor: f64) -> (f64, bool) {
    if raw >= floor { (raw, false) } else { (floor, true) }
}

/// Run the recursion over the whole sample.
pub fn variance_filter(params: &TarchParams, data: &TarchData, floor: f64) -> FilterOutput {
    let n = data.n_obs();
    let deviations = data.returns.mapv(|r| r - params.mean);
    let mut variance = Array1::<f64>::zeros(n);
    let mut floored = vec![false; n];

    let (s0, f0) = apply_floor(data.sample_var, floor);
    variance[0] = s0;
    floored[0] = f0;
    for t in 1..n {
        let exog_term =
            if params.k() == 0 { 0.0 } else { params.delta.dot(&data.exog.row(t)) };
        let raw = raw_variance(params, deviations[t - 1], variance[t - 1], exog_term);
        let (s, f) = apply_floor(raw, floor);
        variance[t] = s;
        floored[t] = f;
    }
    FilterOutput { variance, deviations, floored }
}
