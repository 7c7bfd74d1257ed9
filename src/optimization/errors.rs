//! Error surface of the optimization layer.
//!
//! Three families share one enum:
//! - configuration errors (tolerances, line search, L-BFGS memory, θ layout)
//!   detected before the first iteration;
//! - numerical errors raised while evaluating the objective or validating
//!   the final state;
//! - backend failures reported by argmin, collapsed into
//!   [`OptError::Solver`] with a [`SolverFailure`] kind.
//!
//! Errors raised by a model inside `cost`/`gradient` are boxed by argmin and
//! recovered unchanged by `From<argmin::core::Error>`.
use argmin::core::{ArgminError, Error};
use std::fmt;

use crate::volatility::errors::TarchError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

/// Kind of failure reported by the argmin backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverFailure {
    InvalidParameter,
    NotImplemented,
    NotInitialized,
    ConditionViolated,
    CheckpointNotFound,
    PotentialBug,
    Impossible,
    /// Any error argmin does not classify.
    Other,
}

impl fmt::Display for SolverFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SolverFailure::InvalidParameter => "invalid parameter",
            SolverFailure::NotImplemented => "not implemented",
            SolverFailure::NotInitialized => "not initialized",
            SolverFailure::ConditionViolated => "condition violated",
            SolverFailure::CheckpointNotFound => "checkpoint not found",
            SolverFailure::PotentialBug => "potential bug",
            SolverFailure::Impossible => "impossible state",
            SolverFailure::Other => "backend error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Configuration ----
    InvalidTolGrad { tol: f64, reason: &'static str },
    InvalidTolCost { tol: f64, reason: &'static str },
    InvalidMaxIter { max_iter: usize, reason: &'static str },
    NoTolerancesProvided,
    InvalidLineSearch { name: String, reason: &'static str },
    InvalidLBFGSMem { mem: usize, reason: &'static str },
    /// θ length does not match the model's parameter layout.
    ThetaLengthMismatch { expected: usize, actual: usize },
    /// Non-finite entry in a θ supplied to the model.
    InvalidThetaInput { index: usize, value: f64 },

    // ---- Numerical ----
    /// The model has no closed-form gradient; finite differences are used.
    GradientNotImplemented,
    GradientDimMismatch { expected: usize, found: usize },
    InvalidGradient { index: usize, value: f64, reason: &'static str },
    NonFiniteCost { value: f64 },
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },
    MissingThetaHat,

    // ---- Backend and model ----
    Solver { kind: SolverFailure, text: String },
    /// Any other model-side failure surfaced during an objective evaluation.
    ModelError { text: String },
}

impl OptError {
    /// Whether the error was raised while the solver was running.
    ///
    /// Runtime failures leave a usable best iterate behind, so callers may
    /// restart from it. Configuration errors never do.
    pub fn is_runtime_failure(&self) -> bool {
        !matches!(
            self,
            OptError::InvalidTolGrad { .. }
                | OptError::InvalidTolCost { .. }
                | OptError::InvalidMaxIter { .. }
                | OptError::NoTolerancesProvided
                | OptError::InvalidLineSearch { .. }
                | OptError::InvalidLBFGSMem { .. }
                | OptError::ThetaLengthMismatch { .. }
                | OptError::InvalidThetaInput { .. }
        )
    }
}

impl std::error::Error for OptError {}

impl fmt::Display for OptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid iteration cap {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "At least one of tol_grad, tol_cost, or max_iter is required")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line search '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta has length {actual}, the model expects {expected}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Theta[{index}] = {value} is not finite")
            }
            OptError::GradientNotImplemented => {
                write!(f, "No analytic gradient; use finite differences")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient has length {found}, expected {expected}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Gradient[{index}] = {value}: {reason}")
            }
            OptError::NonFiniteCost { value } => write!(f, "Non-finite cost {value}"),
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Estimate theta_hat[{index}] = {value}: {reason}")
            }
            OptError::MissingThetaHat => write!(f, "Solver finished without a best parameter"),
            OptError::Solver { kind, text } => write!(f, "Solver failure ({kind}): {text}"),
            OptError::ModelError { text } => write!(f, "Model evaluation failed: {text}"),
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Errors raised by our own objective travel through argmin untouched.
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        let argmin_err = match original_err.downcast::<ArgminError>() {
            Ok(err) => err,
            Err(err) => {
                return OptError::Solver { kind: SolverFailure::Other, text: err.to_string() };
            }
        };
        let (kind, text) = match argmin_err {
            ArgminError::InvalidParameter { text } => (SolverFailure::InvalidParameter, text),
            ArgminError::NotImplemented { text } => (SolverFailure::NotImplemented, text),
            ArgminError::NotInitialized { text } => (SolverFailure::NotInitialized, text),
            ArgminError::ConditionViolated { text } => (SolverFailure::ConditionViolated, text),
            ArgminError::CheckpointNotFound { text } => (SolverFailure::CheckpointNotFound, text),
            ArgminError::PotentialBug { text } => (SolverFailure::PotentialBug, text),
            ArgminError::ImpossibleError { text } => (SolverFailure::Impossible, text),
            other => (SolverFailure::Other, other.to_string()),
        };
        OptError::Solver { kind, text }
    }
}

impl From<TarchError> for OptError {
    fn from(err: TarchError) -> Self {
        match err {
            TarchError::ThetaLengthMismatch { expected, actual } => {
                OptError::ThetaLengthMismatch { expected, actual }
            }
            TarchError::NonFiniteTheta { index, value } => {
                OptError::InvalidThetaInput { index, value }
            }
            other => OptError::ModelError { text: other.to_string() },
        }
    }
}
