//! models — the TARCH-X estimator and its fit lifecycle.
//!
//! Purpose
//! -------
//! Wire the core filter and likelihood into the optimizer and inference
//! layers, and expose both a stateful model ([`TarchXModel`]) and a
//! stateless entry point ([`estimate`]) for batch callers.
//!
//! Invariants & assumptions
//! ------------------------
//! - The objective never allocates shared state; each evaluation recomputes
//!   the variance path from scratch, so concurrent estimations on separate
//!   data are independent.
//! - Non-convergence is reported in the returned
//!   [`EstimationResult`](crate::volatility::results::EstimationResult);
//!   only malformed configuration is an error.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`tarchx`] cover the θ-gradient against finite
//!   differences and the `NotFitted → Fitting → {Converged, Failed}`
//!   lifecycle. Estimation quality is checked in `tests/` on simulated data.

pub mod tarchx;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::tarchx::{FitState, TarchObjective, TarchXModel, estimate, estimate_once};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::tarchx::{FitState, TarchXModel, estimate};
}
