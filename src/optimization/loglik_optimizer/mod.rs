//! loglik_optimizer — argmin-powered negative log-likelihood minimizer.
//!
//! Purpose
//! -------
//! Provide a high-level, Argmin-backed optimization layer for **minimizing
//! negative log-likelihoods** in an unconstrained parameter space. Models
//! implement a single trait, [`NegLogLikelihood`], and invoke [`minimize`]
//! to run L-BFGS with a configurable line search, tolerances, and a
//! finite-difference fallback.
//!
//! Key behaviors
//! -------------
//! - Expose the model objective to Argmin via [`adapter::ArgMinAdapter`],
//!   which also records the best iterate in an [`adapter::IterateTracker`].
//! - Expose a single entrypoint [`minimize`] that:
//!   - validates the initial guess with [`NegLogLikelihood::check`],
//!   - selects an L-BFGS solver via [`builders`],
//!   - executes it via [`run::run_lbfgs`],
//!   - restarts once from the best iterate if the backend aborts, and
//!   - normalizes results into an [`OptimOutcome`].
//! - Provide finite-difference gradients in [`finite_diff`] for objectives
//!   without analytic derivatives.
//!
//! Invariants & assumptions
//! ------------------------
//! - The solver never consumes randomness; identical inputs give identical
//!   outcomes.
//! - Hitting the iteration cap is *data*: `converged = false` in the
//!   outcome, never an error.
//! - Objectives must be side-effect free; the tracker is the only mutable
//!   state touched during a run and it is owned by [`minimize`].
//!
//! Conventions
//! -----------
//! - Parameters live in an unconstrained optimizer space as [`Theta`].
//!   Any mapping from constrained → unconstrained space happens in the
//!   model layer.
//! - Errors bubble up as [`OptResult<T>`](crate::optimization::errors::OptResult);
//!   this module never intentionally panics.
//!
//! Testing notes
//! -------------
//! - Unit tests cover gradient pass-through and FD fallback in [`adapter`],
//!   solver construction in [`builders`], convergence and cap handling in
//!   [`api`], and termination mapping in [`traits`].
//! - The volatility integration tests exercise [`minimize`] end to end.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::minimize;
pub use self::traits::{
    LineSearcher, MLEOptions, NegLogLikelihood, OptimOutcome, StopReason, Tolerances,
};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::api::minimize;
    pub use super::traits::{
        LineSearcher, MLEOptions, NegLogLikelihood, OptimOutcome, StopReason, Tolerances,
    };
    pub use super::types::{Cost, Grad, Theta};
}
