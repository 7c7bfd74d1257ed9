//! Public API surface for negative log-likelihood minimization.
//!
//! - [`NegLogLikelihood`]: trait models implement for their objective.
//! - [`MLEOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`LineSearcher`]: choice of line search used by L-BFGS.
//! - [`OptimOutcome`] and [`StopReason`]: normalized result returned by
//!   the high-level `minimize` API.
//!
//! Convention: the objective is a *cost* `c(θ)` to be minimized, typically
//! the average negative log-likelihood. Analytic gradients, when provided,
//! are gradients of that cost. No sign flips happen anywhere in this layer.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// Model-side objective interface.
///
/// - `type Data`: per-model data carried into `nll`/`grad`/`check`.
///
/// Required:
/// - `nll(&Theta, &Data) -> OptResult<Cost>`: evaluate the cost `c(θ)`.
///   Must be side-effect free so repeated calls are deterministic.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook to reject
///   obviously invalid `θ`/`data` pairs. Called once before optimization.
///
/// Optional:
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic gradient `∇c(θ)`.
///   If not implemented (or if it returns
///   [`OptError::GradientNotImplemented`]), finite differences are used.
pub trait NegLogLikelihood {
    type Data: 'static;

    // Required methods
    fn nll(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Choice of line search used inside the L-BFGS solver.
///
/// Parsing is case-insensitive (`"MoreThuente"`, `"HagerZhang"`); unknown
/// names return `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl LineSearcher {
    /// The other line search, used when restarting after a backend failure.
    pub fn alternate(self) -> Self {
        match self {
            LineSearcher::MoreThuente => LineSearcher::HagerZhang,
            LineSearcher::HagerZhang => LineSearcher::MoreThuente,
        }
    }
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances`: numerical tolerances and the iteration cap.
/// - `line_searcher: LineSearcher`: line-search algorithm used by L-BFGS.
/// - `verbose: bool`: if `true`, attaches an observer (behind the
///   `obs_slog` feature) and logs the starting cost.
/// - `lbfgs_mem: Option<usize>`: history size, `None` uses the default of 7.
///
/// Default:
/// - `tol_grad = 1e-6`, `tol_cost = 1e-10`, `max_iter = 1000`
/// - `line_searcher = MoreThuente`, `verbose = false`, `lbfgs_mem = None`
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl MLEOptions {
    /// Create a new set of optimizer options.
    ///
    /// # Errors
    /// - [`OptError::InvalidLBFGSMem`] if `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: Some(1e-10), max_iter: Some(1000) },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `tol_grad`: terminate when the gradient norm falls below this threshold.
/// - `tol_cost`: terminate when the change in cost falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations. This is the only
///   cancellation mechanism; hitting it is reported, never raised.
///
/// At least one of the three must be provided (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Why a solver run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Gradient or cost-change tolerance satisfied.
    Converged,
    /// Iteration cap reached before any tolerance was met.
    MaxIterations,
    /// The backend raised an error; the outcome holds the best iterate seen.
    Aborted,
    /// Any other terminal status reported by the backend.
    Other,
}

/// Canonical result returned by `minimize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: best cost `c(θ̂)`.
/// - `converged`: `true` only when a solver tolerance was satisfied.
/// - `reason`: typed stop reason; `status` is its human-readable form.
/// - `iterations`: iterations of the final solver run.
/// - `fn_evals`: function-evaluation counters.
/// - `grad_norm`: norm of the last available gradient, if present.
/// - `restarts`: how many times the run was restarted from its best iterate.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: Cost,
    pub converged: bool,
    pub reason: StopReason,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
    pub restarts: usize,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// Maps `TerminationStatus` into `(converged, reason, status)`:
    /// `SolverConverged` and `TargetCostReached` count as converged;
    /// `MaxItersReached` and every other status do not.
    ///
    /// # Errors
    /// - Propagates validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: Cost, termination: TerminationStatus,
        iterations: u64, fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let reason = match &termination {
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached,
            ) => StopReason::Converged,
            TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
                StopReason::MaxIterations
            }
            _ => StopReason::Other,
        };
        let status = match &termination {
            TerminationStatus::NotTerminated => "Not terminated".to_string(),
            other => format!("{other:?}"),
        };
        Ok(Self {
            theta_hat,
            value,
            converged: reason == StopReason::Converged,
            reason,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm: grad.map(|g| g.l2_norm()),
            restarts: 0,
        })
    }

    /// Best-effort outcome after the backend aborted.
    ///
    /// # Errors
    /// - Propagates validation errors for `theta_hat` or `value`.
    pub fn aborted(
        theta_hat: Theta, value: Cost, error: &OptError, fn_evals: FnEvalMap, restarts: usize,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(Some(theta_hat))?;
        validate_value(value)?;
        Ok(Self {
            theta_hat,
            value,
            converged: false,
            reason: StopReason::Aborted,
            status: format!("Aborted: {error}"),
            iterations: 0,
            fn_evals,
            grad_norm: None,
            restarts,
        })
    }
}
