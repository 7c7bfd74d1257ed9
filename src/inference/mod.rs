//! inference — standard errors and significance at a fitted optimum.
//!
//! Purpose
//! -------
//! Provide post-estimation uncertainty quantification for a fitted model:
//! a finite-difference Hessian of the negative log-likelihood, an eigen-based
//! pseudo-inverse covariance that degrades to NaN on flat directions, and
//! two-sided t-tests against a Student-t reference.
//!
//! Key behaviors
//! -------------
//! - [`numerical_hessian`]: central differences with a four-point stencil
//!   for cross terms and parameter-scaled steps.
//! - [`covariance_from_hessian`]: `nalgebra` symmetric eigendecomposition
//!   with a relative eigenvalue cutoff. Returns a [`Covariance`] carrying
//!   per-parameter singular flags and an `unreliable` marker.
//! - [`t_tests`]: t-statistics and p-values with `df = n_obs − n_params`.
//!
//! Conventions
//! -----------
//! - All inputs live in model-parameter space (not optimizer θ-space), on
//!   the total log-likelihood scale.
//! - Malformed requests return [`InferenceError`]; numerical degeneracy at a
//!   valid request is reported in the returned values, never raised.
//! - Functions are pure: no logging and no global state. Callers decide
//!   whether to warn about unreliable inference.

pub mod errors;
pub mod hessian;
pub mod significance;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::errors::{InferenceError, InferenceResult};
pub use self::hessian::{Covariance, HessianOptions, covariance_from_hessian, numerical_hessian};
pub use self::significance::{Significance, t_tests};

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::errors::{InferenceError, InferenceResult};
    pub use super::hessian::{Covariance, HessianOptions, covariance_from_hessian, numerical_hessian};
    pub use super::significance::{Significance, t_tests};
}
