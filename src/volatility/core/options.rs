//! Estimation options for TARCH-X models.
//!
//! Purpose
//! -------
//! Carry every knob of an estimation run as an explicit value: bounds and
//! stationarity threshold, starting values, optimizer tolerances, variance
//! floor, gradient mode, exogenous fallback policy, Hessian settings, and a
//! seed for stochastic callers (simulation, bootstrap). Nothing is read from
//! process-wide state, so concurrent estimations cannot interfere.
//!
//! Key behaviors
//! -------------
//! - [`TarchOptions::new`] validates the whole bundle, including the static
//!   bound/stationarity feasibility check, before any optimizer call.
//! - [`StartValues::resolve`] turns the heuristic starting rules into a
//!   concrete [`TarchParams`] for a given data set and checks that the point
//!   lies strictly inside the admissible region.
use crate::inference::hessian::HessianOptions;
use crate::optimization::loglik_optimizer::MLEOptions;
use crate::volatility::{
    core::{
        bounds::ParamBounds,
        data::TarchData,
        exog::AggregationRule,
        params::TarchParams,
    },
    errors::{TarchError, TarchResult},
};
use ndarray::Array1;

/// Default lower floor applied to every conditional variance.
pub const DEFAULT_VARIANCE_FLOOR: f64 = 1e-8;

/// How the objective gradient is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientMode {
    /// Closed-form gradient through the variance sensitivities.
    #[default]
    Analytic,
    /// Finite differences of the cost in θ-space.
    FiniteDifference,
}

/// What to do when the fit with the full exogenous set does not converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExogFallback {
    /// Report the non-converged full-set fit.
    Disabled,
    /// Retry once with columns aggregated per tag.
    AggregateByTag(AggregationRule),
}

impl Default for ExogFallback {
    fn default() -> Self {
        ExogFallback::AggregateByTag(AggregationRule::Sum)
    }
}

/// Heuristic starting values.
///
/// `mean` and `omega` default to data-driven values (sample mean and
/// `0.1 × sample variance`); the rest are fixed constants. Every δⱼ starts
/// at `delta`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartValues {
    pub mean: Option<f64>,
    pub omega: Option<f64>,
    pub alpha: f64,
    pub gamma: f64,
    pub beta: f64,
    pub nu: f64,
    pub delta: f64,
}

impl Default for StartValues {
    fn default() -> Self {
        Self { mean: None, omega: None, alpha: 0.05, gamma: 0.05, beta: 0.85, nu: 5.0, delta: 0.0 }
    }
}

impl StartValues {
    /// Concrete starting parameters for `data`.
    ///
    /// Errors
    /// ------
    /// - `TarchError::InvalidStartValue` if a value is non-finite, outside
    ///   its open interval, or the point is not stationary.
    pub fn resolve(&self, data: &TarchData, bounds: &ParamBounds) -> TarchResult<TarchParams> {
        let params = TarchParams {
            mean: self.mean.unwrap_or(data.sample_mean),
            omega: self.omega.unwrap_or(0.1 * data.sample_var),
            alpha: self.alpha,
            gamma: self.gamma,
            beta: self.beta,
            nu: self.nu,
            delta: Array1::from_elem(data.exog.k(), self.delta),
        };
        check_interior(&params, bounds)?;
        Ok(params)
    }
}

/// Verify that `params` lies strictly inside `bounds` and is stationary
/// with the transform's margin.
pub fn check_interior(params: &TarchParams, bounds: &ParamBounds) -> TarchResult<()> {
    let invalid = |name: &'static str, value: f64, reason: &'static str| {
        Err(TarchError::InvalidStartValue { name, value, reason })
    };
    if !params.mean.is_finite() {
        return invalid("mean", params.mean, "Mean must be finite.");
    }
    if !(params.omega.is_finite() && params.omega > bounds.omega_min) {
        return invalid("omega", params.omega, "Omega must be finite and above its lower bound.");
    }
    for (name, value, interval) in [
        ("alpha", params.alpha, bounds.alpha),
        ("gamma", params.gamma, bounds.gamma),
        ("beta", params.beta, bounds.beta),
        ("nu", params.nu, bounds.nu),
    ] {
        if !interval.contains(value) {
            return invalid(name, value, "Value must lie strictly inside its bounds.");
        }
    }
    if let Some(&value) = params.delta.iter().find(|&&d| !bounds.delta.contains(d)) {
        return invalid("delta", value, "Value must lie strictly inside its bounds.");
    }
    if params.alpha + params.beta >= bounds.persistence_budget(params.gamma) {
        return invalid(
            "beta",
            params.beta,
            "alpha + beta + |gamma|/2 must stay below the stationarity threshold.",
        );
    }
    Ok(())
}

/// Full configuration of one estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct TarchOptions {
    pub bounds: ParamBounds,
    pub start: StartValues,
    pub mle_opts: MLEOptions,
    pub variance_floor: f64,
    pub gradient: GradientMode,
    pub fallback: ExogFallback,
    pub hessian: HessianOptions,
    /// Seed for stochastic callers; the estimator itself is deterministic.
    pub seed: u64,
}

impl Default for TarchOptions {
    fn default() -> Self {
        Self {
            bounds: ParamBounds::default(),
            start: StartValues::default(),
            mle_opts: MLEOptions::default(),
            variance_floor: DEFAULT_VARIANCE_FLOOR,
            gradient: GradientMode::default(),
            fallback: ExogFallback::default(),
            hessian: HessianOptions::default(),
            seed: 0,
        }
    }
}

impl TarchOptions {
    /// Validated options.
    ///
    /// Errors
    /// ------
    /// - Any error from [`ParamBounds::check_feasibility`].
    /// - `InvalidVarianceFloor`, `InvalidHessianStep`, `InvalidEigenTolerance`.
    /// - `InvalidStartValue` for fixed starting values outside the bounds
    ///   (data-driven values are checked in [`StartValues::resolve`]).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bounds: ParamBounds, start: StartValues, mle_opts: MLEOptions, variance_floor: f64,
        gradient: GradientMode, fallback: ExogFallback, hessian: HessianOptions, seed: u64,
    ) -> TarchResult<Self> {
        let options =
            Self { bounds, start, mle_opts, variance_floor, gradient, fallback, hessian, seed };
        options.validate()?;
        Ok(options)
    }

    /// Re-run every configuration check.
    pub fn validate(&self) -> TarchResult<()> {
        self.bounds.check_feasibility()?;
        if !(self.variance_floor.is_finite() && self.variance_floor > 0.0) {
            return Err(TarchError::InvalidVarianceFloor { value: self.variance_floor });
        }
        if !(self.hessian.rel_step.is_finite() && self.hessian.rel_step > 0.0) {
            return Err(TarchError::InvalidHessianStep { value: self.hessian.rel_step });
        }
        if !(self.hessian.eigen_tol.is_finite()
            && self.hessian.eigen_tol >= 0.0
            && self.hessian.eigen_tol < 1.0)
        {
            return Err(TarchError::InvalidEigenTolerance { value: self.hessian.eigen_tol });
        }
        // Check the fixed part of the start point with placeholder moments.
        let candidate = TarchParams {
            mean: self.start.mean.unwrap_or(0.0),
            omega: self.start.omega.unwrap_or(self.bounds.omega_min + 1.0),
            alpha: self.start.alpha,
            gamma: self.start.gamma,
            beta: self.start.beta,
            nu: self.start.nu,
            delta: Array1::from_elem(1, self.start.delta),
        };
        check_interior(&candidate, &self.bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volatility::core::bounds::Interval;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation of the default options and rejection of bad floors.
    // - Infeasible bounds surfacing through `TarchOptions::new`.
    // - Start-value resolution from data and interior checks.
    // -------------------------------------------------------------------------

    fn data() -> TarchData {
        TarchData::without_exog(array![0.2, -0.4, 1.1, -0.9, 0.05, 0.3, -1.6, 0.7, 0.0, -0.2])
            .expect("data should validate")
    }

    #[test]
    // Purpose
    // -------
    // Defaults validate and a non-positive floor does not.
    //
    // Given
    // -----
    // - `TarchOptions::default()` and a copy with `variance_floor = 0`.
    //
    // Expect
    // ------
    // - `Ok(())` and `InvalidVarianceFloor`.
    fn default_options_validate_and_zero_floor_is_rejected() {
        // Arrange
        let defaults = TarchOptions::default();
        let zero_floor = TarchOptions { variance_floor: 0.0, ..TarchOptions::default() };

        // Act / Assert
        assert_eq!(defaults.validate(), Ok(()));
        assert_eq!(zero_floor.validate(), Err(TarchError::InvalidVarianceFloor { value: 0.0 }));
    }

    #[test]
    // Purpose
    // -------
    // An infeasible β ceiling is rejected at configuration time.
    //
    // Given
    // -----
    // - Bounds with β ∈ (1e-6, 0.998), built without the checking helpers.
    //
    // Expect
    // ------
    // - `TarchOptions::new` returns `ConstraintInfeasible`.
    fn new_rejects_infeasible_bounds() {
        // Arrange
        let bounds = ParamBounds {
            beta: Interval { lower: 1e-6, upper: 0.998 },
            ..ParamBounds::default()
        };

        // Act
        let res = TarchOptions::new(
            bounds,
            StartValues::default(),
            MLEOptions::default(),
            DEFAULT_VARIANCE_FLOOR,
            GradientMode::Analytic,
            ExogFallback::Disabled,
            HessianOptions::default(),
            7,
        );

        // Assert
        assert!(matches!(res, Err(TarchError::ConstraintInfeasible { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Resolve data-driven starting values and reject a non-stationary start.
    //
    // Given
    // -----
    // - Default start values, then α = 0.2 with β = 0.85 (persistence 1.075).
    //
    // Expect
    // ------
    // - μ₀ = sample mean, ω₀ = 0.1 × sample variance.
    // - The second start is rejected with `InvalidStartValue`.
    fn resolve_uses_sample_moments_and_checks_stationarity() {
        // Arrange
        let data = data();
        let bounds = ParamBounds::default();
        let hot = StartValues { alpha: 0.2, ..StartValues::default() };

        // Act
        let start = StartValues::default().resolve(&data, &bounds).expect("start should resolve");
        let rejected = hot.resolve(&data, &bounds);

        // Assert
        assert_eq!(start.mean, data.sample_mean);
        assert_eq!(start.omega, 0.1 * data.sample_var);
        assert_eq!(start.delta.len(), 0);
        assert!(matches!(rejected, Err(TarchError::InvalidStartValue { name: "beta", .. })));
    }
}
