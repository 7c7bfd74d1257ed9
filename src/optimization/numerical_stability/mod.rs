//! numerical_stability — numerically robust scalar transforms.
//!
//! Purpose
//! -------
//! Collect numerically stable scalar transforms and shared tolerances for
//! mapping unconstrained optimizer coordinates into bounded model
//! parameters. Centralizing them here lets the volatility layer assume
//! well-conditioned `f64` arithmetic.
//!
//! Key behaviors
//! -------------
//! - Provide stable transforms (`safe_softplus`, its inverse,
//!   `safe_logistic`, `safe_logit`) for ℝ ↔ (0, ∞) and ℝ ↔ (0, 1).
//! - Provide value-and-derivative helpers (`clamped_logistic`,
//!   `scaled_logistic`) used to assemble Jacobians of the full parameter
//!   transform.
//! - Centralize small tolerances (`STATIONARITY_MARGIN`, `LOGIT_EPS`,
//!   `EIGEN_EPS`) so downstream modules share consistent guards.
//!
//! Invariants & assumptions
//! ------------------------
//! - All transforms assume finite `f64` inputs; domain validation happens
//!   in the volatility and inference layers.
//! - Clamped logistics never return exactly 0 or 1, so mapped parameters
//!   stay strictly inside open intervals.
//!
//! Conventions
//! -----------
//! - Pure functions only. No logging, I/O, or global state.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] compare against naïve formulas on
//!   safe grids and check inverse pairs and saturated derivatives.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    EIGEN_EPS, LOGIT_EPS, STATIONARITY_MARGIN, clamped_logistic, safe_logistic, safe_logit,
    safe_softplus, safe_softplus_inv, scaled_logistic, scaled_logit,
};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::transformations::{
        EIGEN_EPS, LOGIT_EPS, STATIONARITY_MARGIN, safe_logistic, safe_softplus,
        safe_softplus_inv,
    };
}
