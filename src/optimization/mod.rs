//! optimization — MLE stack, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer used to fit volatility models: an
//! Argmin-backed negative log-likelihood minimizer, numerically stable
//! parameter transforms, and a single error/result surface.
//!
//! Key behaviors
//! -------------
//! - `loglik_optimizer`: minimize `c(θ)` with L-BFGS, report convergence as
//!   data, and recover a best-effort iterate after backend failures.
//! - `numerical_stability`: guarded softplus/logistic transforms and shared
//!   tolerances for mapping θ into bounded parameters.
//! - `errors`: normalize configuration issues, numerical failures, and
//!   backend errors into `OptError` / `OptResult<T>`.
//!
//! Conventions
//! -----------
//! - Optimizers operate in an unconstrained space; bounded parameters are
//!   produced by the model layer through `numerical_stability` transforms.
//! - Public entrypoints that can fail return `OptResult<T>`; callers never
//!   see raw Argmin errors.
//! - Diagnostics go through the `log` facade (`warn!` on restarts,
//!   `debug!` on run summaries). No printing to stdout.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_tarchx::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
