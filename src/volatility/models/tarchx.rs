//! TARCH-X(1,1) model with Student-t innovations.
//!
//! This module wires the variance filter and likelihood to the
//! `NegLogLikelihood` trait and runs the full estimation pipeline:
//!
//! 1. Resolve starting values and map them to unconstrained θ.
//! 2. Minimize the average negative log-likelihood with L-BFGS. Bounds and
//!    the stationarity inequality hold at every iterate because they are
//!    built into the θ → parameter map.
//! 3. Recompute the variance path once at the optimum and evaluate the
//!    log-likelihood there.
//! 4. Take a numerical Hessian of the total negative log-likelihood in
//!    parameter space and turn it into standard errors and p-values.
//! 5. Assemble an [`EstimationResult`].
//!
//! If the fit with the full exogenous set does not converge, the model
//! retries once on the tag-aggregated design (see [`ExogFallback`]).
//!
//! The gradient is analytic by default: variance sensitivities are carried
//! forward with the filter and chained through the transform Jacobian.
use crate::{
    inference::{Covariance, covariance_from_hessian, numerical_hessian, t_tests},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Cost, Grad, NegLogLikelihood, OptimOutcome, Theta, minimize},
    },
    volatility::{
        core::{
            data::TarchData,
            filter::variance_filter,
            likelihood::{filtered_nll, negative_log_likelihood, nll_with_gradient},
            options::{ExogFallback, GradientMode, TarchOptions},
            params::{N_CORE, TarchParams},
            transform::ParamTransform,
        },
        errors::{TarchError, TarchResult},
        results::{
            Diagnostics, EstimationResult, ExogEffect, FallbackInfo, ParamEstimate,
            information_criteria,
        },
    },
};
use log::{debug, warn};
use ndarray::Array1;
use std::collections::BTreeMap;

/// Lifecycle of a [`TarchXModel`].
///
/// `NotFitted → Fitting → {Converged, Failed}`. The last two are terminal:
/// the stored result is never modified afterwards and a second `fit` call
/// returns [`TarchError::AlreadyFitted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitState {
    NotFitted,
    Fitting,
    Converged,
    Failed,
}

/// Objective seen by the optimizer: average negative log-likelihood in θ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TarchObjective {
    pub transform: ParamTransform,
    pub variance_floor: f64,
    pub gradient: GradientMode,
}

impl NegLogLikelihood for TarchObjective {
    type Data = TarchData;

    /// `−(1/n) Σₜ ℓₜ` at the parameters mapped from `theta`.
    fn nll(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost> {
        let params = self.transform.to_params(theta)?;
        let cost =
            negative_log_likelihood(&params, data, self.variance_floor) / data.n_obs() as f64;
        if !cost.is_finite() {
            return Err(OptError::NonFiniteCost { value: cost });
        }
        Ok(cost)
    }

    /// Checks θ length/finiteness and that `data` carries `k` regressors.
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        self.transform.validate_theta(theta)?;
        if data.exog.k() != self.transform.k {
            return Err(TarchError::ThetaLengthMismatch {
                expected: TarchParams::dim(data.exog.k()),
                actual: theta.len(),
            }
            .into());
        }
        Ok(())
    }

    /// `Jᵀ ∇params / n`, or `GradientNotImplemented` in finite-difference
    /// mode so the adapter differentiates the cost numerically.
    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        if self.gradient == GradientMode::FiniteDifference {
            return Err(OptError::GradientNotImplemented);
        }
        let (params, jac) = self.transform.to_params_with_jacobian(theta)?;
        let (_, grad_params) = nll_with_gradient(&params, data, self.variance_floor);
        Ok(jac.t().dot(&grad_params) / data.n_obs() as f64)
    }
}

/// TARCH-X estimator with an explicit fit lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct TarchXModel {
    options: TarchOptions,
    state: FitState,
    result: Option<EstimationResult>,
}

impl TarchXModel {
    /// Validate `options` and create an unfitted model.
    ///
    /// # Errors
    /// - Any configuration error from [`TarchOptions::validate`], including
    ///   `ConstraintInfeasible`.
    pub fn new(options: TarchOptions) -> TarchResult<Self> {
        options.validate()?;
        Ok(Self { options, state: FitState::NotFitted, result: None })
    }

    pub fn options(&self) -> &TarchOptions {
        &self.options
    }

    pub fn state(&self) -> FitState {
        self.state
    }

    /// Stored result.
    ///
    /// # Errors
    /// - `ModelNotFitted` before a successful `fit`.
    pub fn result(&self) -> TarchResult<&EstimationResult> {
        self.result.as_ref().ok_or(TarchError::ModelNotFitted)
    }

    /// Fit the model to `data`.
    ///
    /// A non-converged fit is not an error: the model moves to
    /// [`FitState::Failed`] and keeps the best-effort result. Errors are
    /// reserved for malformed configuration, in which case the model stays
    /// [`FitState::NotFitted`].
    ///
    /// # Errors
    /// - `AlreadyFitted` if the model is in a terminal state.
    /// - `InvalidStartValue` if the starting point is not admissible for
    ///   `data`.
    /// - `Optimization` for optimizer settings rejected before the first
    ///   iteration.
    pub fn fit(&mut self, data: &TarchData) -> TarchResult<&EstimationResult> {
        if self.state != FitState::NotFitted {
            return Err(TarchError::AlreadyFitted);
        }
        self.state = FitState::Fitting;
        match estimate(data, &self.options) {
            Ok(result) => {
                self.state =
                    if result.converged { FitState::Converged } else { FitState::Failed };
                Ok(&*self.result.insert(result))
            }
            Err(err) => {
                self.state = FitState::NotFitted;
                Err(err)
            }
        }
    }
}

/// Stateless estimation entry point, including the exogenous fallback.
///
/// # Errors
/// - Configuration and start-value errors; never non-convergence.
pub fn estimate(data: &TarchData, options: &TarchOptions) -> TarchResult<EstimationResult> {
    estimate_with(data, options, estimate_once)
}

/// Fallback driver around a single-design fit.
pub(crate) fn estimate_with<F>(
    data: &TarchData, options: &TarchOptions, fit_once: F,
) -> TarchResult<EstimationResult>
where
    F: Fn(&TarchData, &TarchOptions) -> TarchResult<EstimationResult>,
{
    options.validate()?;
    let primary = fit_once(data, options)?;
    if primary.converged || data.exog.k() == 0 {
        return Ok(primary);
    }
    let ExogFallback::AggregateByTag(rule) = options.fallback else {
        return Ok(primary);
    };
    let aggregated = data.exog.aggregate_by_tag(rule);
    if aggregated.k() == data.exog.k() {
        debug!("Tag aggregation does not reduce the exogenous design; keeping the original fit");
        return Ok(primary);
    }
    warn!(
        "Fit with {} exogenous columns did not converge ({}); retrying with {} tag-aggregated columns",
        data.exog.k(),
        primary.diagnostics.status,
        aggregated.k()
    );
    let reduced = data.with_exog(aggregated)?;
    let info = |succeeded: bool| FallbackInfo {
        rule,
        original_columns: data.exog.names().to_vec(),
        aggregated_columns: reduced.exog.names().to_vec(),
        succeeded,
    };
    match fit_once(&reduced, options) {
        Ok(mut refit) if refit.converged => {
            refit.diagnostics.fallback = Some(info(true));
            Ok(refit)
        }
        _ => {
            warn!("Aggregated refit did not converge either; reporting the original fit");
            let mut primary = primary;
            primary.diagnostics.fallback = Some(info(false));
            Ok(primary)
        }
    }
}

/// One optimizer run plus inference on a fixed design.
pub fn estimate_once(data: &TarchData, options: &TarchOptions) -> TarchResult<EstimationResult> {
    let transform = ParamTransform::new(options.bounds, data.exog.k());
    let start = options.start.resolve(data, &options.bounds)?;
    let theta0 = transform.to_theta(&start)?;
    let objective = TarchObjective {
        transform,
        variance_floor: options.variance_floor,
        gradient: options.gradient,
    };
    let outcome = minimize(&objective, theta0, data, &options.mle_opts)?;
    let params = transform.to_params(&outcome.theta_hat)?;
    Ok(assemble(params, &outcome, data, options))
}

// ---- Helper Methods ----

fn assemble(
    params: TarchParams, outcome: &OptimOutcome, data: &TarchData, options: &TarchOptions,
) -> EstimationResult {
    let n = data.n_obs();
    let dim = TarchParams::dim(params.k());
    let floor = options.variance_floor;
    let filtered = variance_filter(&params, data, floor);
    let log_likelihood = -filtered_nll(&filtered, params.nu);
    let names = TarchParams::names(data.exog.names());

    let covariance = parameter_covariance(&params, data, options);
    let values = params.to_array();
    let (t_stats, p_values) = match t_tests(&values, &covariance.std_errors, n as f64 - dim as f64) {
        Ok(sig) => (sig.t_stats, sig.p_values),
        Err(err) => {
            warn!("Significance tests skipped: {err}");
            (Array1::from_elem(dim, f64::NAN), Array1::from_elem(dim, f64::NAN))
        }
    };
    let estimates: Vec<ParamEstimate> = (0..dim)
        .map(|i| ParamEstimate {
            name: names[i].clone(),
            value: values[i],
            std_error: covariance.std_errors[i],
            t_stat: t_stats[i],
            p_value: p_values[i],
        })
        .collect();

    let mut exog_effects: BTreeMap<_, Vec<ExogEffect>> = BTreeMap::new();
    for (j, (column, tag)) in data.exog.names().iter().zip(data.exog.tags()).enumerate() {
        exog_effects.entry(tag.clone()).or_default().push(ExogEffect {
            column: column.clone(),
            tag: tag.clone(),
            estimate: estimates[N_CORE + j].clone(),
        });
    }

    let singular_params: Vec<String> = names
        .iter()
        .zip(covariance.singular.iter())
        .filter(|&(_, &s)| s)
        .map(|(name, _)| name.clone())
        .collect();
    if covariance.unreliable {
        warn!(
            "Hessian singular or near-singular at the optimum ({} direction(s) dropped); undefined standard errors for {:?}",
            covariance.dropped_directions, singular_params
        );
    }
    let floored_variances = filtered.n_floored();
    if floored_variances > 0 {
        debug!("{floored_variances} conditional variance(s) floored at {floor}");
    }

    let (aic, bic) = information_criteria(log_likelihood, dim, n);
    let persistence = params.persistence();
    EstimationResult {
        estimates,
        covariance: covariance.matrix,
        log_likelihood,
        aic,
        bic,
        n_obs: n,
        n_params: dim,
        converged: outcome.converged,
        iterations: outcome.iterations,
        std_residuals: filtered.std_residuals(),
        variance: filtered.variance,
        exog_effects,
        diagnostics: Diagnostics {
            stop_reason: outcome.reason,
            status: outcome.status.clone(),
            restarts: outcome.restarts,
            grad_norm: outcome.grad_norm,
            cost_evals: outcome.fn_evals.get("cost_count").copied().unwrap_or(0) as usize,
            unreliable_inference: covariance.unreliable,
            singular_params,
            floored_variances,
            persistence,
            fallback: None,
        },
        params,
    }
}

/// Pseudo-inverse of the numerical Hessian of the total NLL at `params`.
fn parameter_covariance(
    params: &TarchParams, data: &TarchData, options: &TarchOptions,
) -> Covariance {
    let k = params.k();
    let dim = TarchParams::dim(k);
    let objective = |v: &Array1<f64>| match TarchParams::from_slice(v.view(), k) {
        Ok(p) => negative_log_likelihood(&p, data, options.variance_floor),
        Err(_) => f64::NAN,
    };
    numerical_hessian(objective, &params.to_array(), options.hessian.rel_step)
        .and_then(|hess| covariance_from_hessian(&hess, options.hessian.eigen_tol))
        .unwrap_or_else(|err| {
            warn!("Inference failed at the optimum: {err}");
            Covariance::undefined(dim)
        })
}
