//! volatility — TARCH-X conditional variance models with exogenous terms.
//!
//! Purpose
//! -------
//! Estimate an asymmetric GARCH(1,1) variance equation augmented with
//! tagged exogenous regressors (event indicators, sentiment indices) under
//! Student-t innovations, by constrained maximum likelihood, and report
//! calibrated standard errors and p-values for every coefficient.
//!
//! Key behaviors
//! -------------
//! - [`core`]: validated data, the parameter layout, bounds and their static
//!   feasibility check, options, the θ ↔ parameter transform, the variance
//!   filter, and the likelihood with its analytic gradient.
//! - [`models`]: [`TarchXModel`] and the stateless [`estimate`], including
//!   the aggregated-design fallback.
//! - [`results`]: [`EstimationResult`] with diagnostics and a flat
//!   serializable record.
//! - [`simulate`]: seeded path simulation.
//! - [`batch`]: rayon-parallel batch fits and parametric bootstrap.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every conditional variance is floored and strictly positive.
//! - Every parameter vector the optimizer visits satisfies the box bounds
//!   and `α + β + |γ|/2 < S`.
//! - Bounds that are jointly infeasible with the stationarity threshold
//!   are rejected when options are built, before any optimizer call.
//! - Inputs are never mutated; configuration is passed explicitly.
//!
//! Conventions
//! -----------
//! - Parameter layout: `(μ, ω, α, γ, β, ν, δ₁…δₖ)`.
//! - Errors are [`TarchError`] / [`TarchResult`]; estimation quality is
//!   data inside the result.
//! - Logging goes through the `log` facade: `warn!` for fallbacks and
//!   unreliable inference, `debug!` for routine detail.
//!
//! Downstream usage
//! ----------------
//! 1. Build [`ExogColumn`]s with explicit [`ExogTag`]s and an [`ExogMatrix`].
//! 2. Wrap returns and design in [`TarchData`].
//! 3. Configure [`TarchOptions`] (bounds, start values, tolerances).
//! 4. Call [`estimate`] or `TarchXModel::new(options)?.fit(&data)`.
//! 5. Read coefficients, `exog_effects`, and `diagnostics` from the result.

pub mod batch;
pub mod core;
pub mod errors;
pub mod models;
pub mod results;
pub mod simulate;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::batch::{
    BatchSummary, BootstrapOptions, BootstrapSummary, fit_batch, parametric_bootstrap,
};
pub use self::core::{
    AggregationRule, ExogColumn, ExogFallback, ExogMatrix, ExogTag, GradientMode, Interval,
    ParamBounds, StartValues, TarchData, TarchOptions, TarchParams,
};
pub use self::errors::{TarchError, TarchResult};
pub use self::models::{FitState, TarchXModel, estimate};
pub use self::results::{
    Diagnostics, EstimationResult, ExogEffect, FallbackInfo, FlatRecord, ParamEstimate,
};
pub use self::simulate::{SimOptions, SimulatedPath, simulate};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_tarchx::volatility::prelude::*;
//
// to import the main estimation surface in a single line.

pub mod prelude {
    pub use super::core::{
        ExogColumn, ExogMatrix, ExogTag, ParamBounds, TarchData, TarchOptions, TarchParams,
    };
    pub use super::errors::{TarchError, TarchResult};
    pub use super::models::{FitState, TarchXModel, estimate};
    pub use super::results::EstimationResult;
}
