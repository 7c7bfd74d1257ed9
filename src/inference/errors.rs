//! Unified error handling for inference routines.
//!
//! This module defines `InferenceError`, the error type for malformed
//! inference requests (bad step sizes, empty parameter vectors, shape
//! mismatches). Numerical trouble at a valid request, such as a singular
//! Hessian, is not an error: it surfaces as NaN standard errors and an
//! `unreliable` flag on the returned covariance.

/// Unified error type for inference routines.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Finite differences ----
    /// Relative step must be finite and > 0.
    InvalidStep { step: f64 },

    /// Nothing to differentiate.
    EmptyParameterVector,

    /// Objective was not finite at the expansion point.
    NonFiniteObjective { value: f64 },

    // ---- Linear algebra ----
    /// Matrix is not square or does not match the parameter count.
    DimensionMismatch { expected: usize, found: (usize, usize) },

    // ---- Significance ----
    /// Degrees of freedom for the t reference must be > 0.
    InvalidDegreesOfFreedom { df: f64 },
}

pub type InferenceResult<T> = Result<T, InferenceError>;

impl std::error::Error for InferenceError {}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Finite differences ----
            InferenceError::InvalidStep { step } => {
                write!(f, "Inference Error: Hessian step must be finite and > 0, got {step}")
            }
            InferenceError::EmptyParameterVector => {
                write!(f, "Inference Error: Parameter vector is empty")
            }
            InferenceError::NonFiniteObjective { value } => {
                write!(f, "Inference Error: Objective is not finite at the optimum ({value})")
            }

            // ---- Linear algebra ----
            InferenceError::DimensionMismatch { expected, found } => write!(
                f,
                "Inference Error: Expected a {expected}x{expected} matrix, got {}x{}",
                found.0, found.1
            ),

            // ---- Significance ----
            InferenceError::InvalidDegreesOfFreedom { df } => {
                write!(f, "Inference Error: Degrees of freedom must be > 0, got {df}")
            }
        }
    }
}
