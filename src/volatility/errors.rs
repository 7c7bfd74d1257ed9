//! Errors for TARCH-X volatility models (input validation, configuration and
//! feasibility checks, model lifecycle, and simulation).
//!
//! This module defines the model error type, [`TarchError`], used across the
//! Rust core and (behind the `python-bindings` feature) the Python-facing API.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy).
//! - Only *malformed input or configuration* is an error. Optimizer
//!   non-convergence and numerical trouble (singular Hessians, floored
//!   variances) are reported inside `EstimationResult`, never raised.
//! - Configuration errors, including bound/stationarity infeasibility, are
//!   raised when options are constructed, before any optimizer call.
use crate::optimization::errors::OptError;

/// Crate-wide result alias for operations that may produce [`TarchError`].
pub type TarchResult<T> = Result<T, TarchError>;

/// Unified error type for TARCH-X modeling.
#[derive(Debug, Clone, PartialEq)]
pub enum TarchError {
    // ---- Input/data validation ----
    /// Return series is empty.
    EmptySeries,

    /// A return is NaN/±inf.
    NonFiniteReturn { index: usize, value: f64 },

    /// Too few observations to estimate the model.
    TooFewObservations { n_obs: usize, min: usize },

    /// Sample variance of the returns is zero or not finite.
    DegenerateVariance { variance: f64 },

    /// Exogenous column length differs from the return series.
    ExogLengthMismatch { column: String, expected: usize, found: usize },

    /// Exogenous column holds a NaN/±inf.
    NonFiniteExog { column: String, index: usize, value: f64 },

    /// Two exogenous columns share a name.
    DuplicateExogName { name: String },

    // ---- Configuration ----
    /// Box bound must be finite with lower < upper.
    InvalidBound { name: &'static str, lower: f64, upper: f64, reason: &'static str },

    /// Stationarity threshold must lie in (0, 1].
    InvalidStationarityThreshold { value: f64 },

    /// Box bounds and the stationarity inequality are jointly infeasible.
    ConstraintInfeasible { persistence: f64, threshold: f64, reason: &'static str },

    /// Variance floor must be finite and > 0.
    InvalidVarianceFloor { value: f64 },

    /// Starting value outside its admissible region.
    InvalidStartValue { name: &'static str, value: f64, reason: &'static str },

    /// Hessian step must be finite and > 0.
    InvalidHessianStep { value: f64 },

    /// Eigenvalue tolerance must be finite and in [0, 1).
    InvalidEigenTolerance { value: f64 },

    // ---- Parameter layout ----
    /// Theta / parameter vector length does not match 6 + k.
    ThetaLengthMismatch { expected: usize, actual: usize },

    /// Unconstrained optimizer input must be finite.
    NonFiniteTheta { index: usize, value: f64 },

    // ---- Estimation / lifecycle ----
    /// `fit` was called on a model that already reached a terminal state.
    AlreadyFitted,

    /// Results were requested before `fit`.
    ModelNotFitted,

    /// Optimizer configuration was rejected before the first iteration.
    Optimization(OptError),

    // ---- Simulation / batch ----
    /// Simulation request is not usable.
    InvalidSimulation { reason: &'static str },

    /// Bootstrap request is not usable.
    InvalidBootstrap { reason: &'static str },
}

impl std::error::Error for TarchError {}

impl std::fmt::Display for TarchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input/data validation ----
            TarchError::EmptySeries => write!(f, "Return series is empty"),
            TarchError::NonFiniteReturn { index, value } => {
                write!(f, "Return at index {index} must be finite, got {value}")
            }
            TarchError::TooFewObservations { n_obs, min } => {
                write!(f, "Too few observations: got {n_obs}, need at least {min}")
            }
            TarchError::DegenerateVariance { variance } => {
                write!(f, "Sample variance of returns must be finite and > 0, got {variance}")
            }
            TarchError::ExogLengthMismatch { column, expected, found } => {
                write!(
                    f,
                    "Exogenous column '{column}' has length {found}, expected {expected} to match returns"
                )
            }
            TarchError::NonFiniteExog { column, index, value } => {
                write!(f, "Exogenous column '{column}' at index {index} must be finite, got {value}")
            }
            TarchError::DuplicateExogName { name } => {
                write!(f, "Duplicate exogenous column name '{name}'")
            }

            // ---- Configuration ----
            TarchError::InvalidBound { name, lower, upper, reason } => {
                write!(f, "Invalid bounds for {name}: ({lower}, {upper}): {reason}")
            }
            TarchError::InvalidStationarityThreshold { value } => {
                write!(f, "Stationarity threshold must lie in (0, 1], got {value}")
            }
            TarchError::ConstraintInfeasible { persistence, threshold, reason } => {
                write!(
                    f,
                    "Bounds infeasible with stationarity threshold {threshold}: worst-case persistence {persistence}: {reason}"
                )
            }
            TarchError::InvalidVarianceFloor { value } => {
                write!(f, "Variance floor must be finite and > 0, got {value}")
            }
            TarchError::InvalidStartValue { name, value, reason } => {
                write!(f, "Invalid starting value for {name}: {value}: {reason}")
            }
            TarchError::InvalidHessianStep { value } => {
                write!(f, "Hessian step must be finite and > 0, got {value}")
            }
            TarchError::InvalidEigenTolerance { value } => {
                write!(f, "Eigenvalue tolerance must be finite and in [0, 1), got {value}")
            }

            // ---- Parameter layout ----
            TarchError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Parameter vector length mismatch: expected {expected}, got {actual}")
            }
            TarchError::NonFiniteTheta { index, value } => {
                write!(f, "Theta input at index {index} must be finite, got {value}")
            }

            // ---- Estimation / lifecycle ----
            TarchError::AlreadyFitted => {
                write!(f, "Model has already been fitted; construct a new model to refit")
            }
            TarchError::ModelNotFitted => write!(f, "Model has not been fitted yet"),
            TarchError::Optimization(err) => write!(f, "Optimizer configuration rejected: {err}"),

            // ---- Simulation / batch ----
            TarchError::InvalidSimulation { reason } => {
                write!(f, "Invalid simulation request: {reason}")
            }
            TarchError::InvalidBootstrap { reason } => {
                write!(f, "Invalid bootstrap request: {reason}")
            }
        }
    }
}

impl From<OptError> for TarchError {
    fn from(err: OptError) -> Self {
        match err {
            OptError::ThetaLengthMismatch { expected, actual } => {
                TarchError::ThetaLengthMismatch { expected, actual }
            }
            other => TarchError::Optimization(other),
        }
    }
}

/// Convert a [`TarchError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl std::convert::From<TarchError> for pyo3::PyErr {
    fn from(err: TarchError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
