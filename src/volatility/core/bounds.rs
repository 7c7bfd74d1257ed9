//! Box bounds, stationarity threshold, and the static feasibility check.
//!
//! Purpose
//! -------
//! Describe the admissible parameter region of the TARCH-X model and reject,
//! at configuration time, any region in which the box bounds and the
//! stationarity inequality `α + β + |γ|/2 < S` cannot hold together.
//!
//! Key behaviors
//! -------------
//! - [`Interval`] is an open interval `(lower, upper)` with validation.
//! - [`ParamBounds::check_feasibility`] runs two analytic checks:
//!   1. *Worst-case ceiling*: with β at its upper bound and α, γ at their
//!      reference magnitudes, persistence must stay below
//!      `S − FEASIBILITY_MARGIN`. A β ceiling at (or a hair below) `S` fails
//!      here, before any optimizer call.
//!   2. *Floor reachability*: the smallest attainable persistence,
//!      `α_lo + β_lo + max|γ|/2`, must leave room below
//!      `S − STATIONARITY_MARGIN`, otherwise no γ in its box admits a
//!      stationary (α, β) pair and the parameter map is undefined.
//!
//! Invariants & assumptions
//! ------------------------
//! - Once constructed through [`ParamBounds::new`] (or `Default`), bounds are
//!   feasible; the parameter transform relies on this and does no checks.
//! - ω has only a lower bound. δⱼ share one interval.
use crate::optimization::numerical_stability::transformations::STATIONARITY_MARGIN;
use crate::volatility::{
    core::params::persistence,
    errors::{TarchError, TarchResult},
};
use serde::Serialize;

/// Slack required between worst-case persistence and the threshold `S`.
pub const FEASIBILITY_MARGIN: f64 = 1e-3;

/// Open interval `(lower, upper)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    /// # Errors
    /// - `TarchError::InvalidBound` if either end is non-finite or
    ///   `lower >= upper`.
    pub fn new(name: &'static str, lower: f64, upper: f64) -> TarchResult<Self> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(TarchError::InvalidBound {
                name,
                lower,
                upper,
                reason: "Bounds must be finite.",
            });
        }
        if lower >= upper {
            return Err(TarchError::InvalidBound {
                name,
                lower,
                upper,
                reason: "Lower bound must be strictly below the upper bound.",
            });
        }
        Ok(Self { lower, upper })
    }

    /// Strict membership.
    pub fn contains(&self, x: f64) -> bool {
        x > self.lower && x < self.upper
    }
}

/// Admissible region for the TARCH-X parameters.
///
/// Defaults: ω > 1e-8; α ∈ (1e-6, 0.3); γ ∈ (−0.5, 0.5); β ∈ (1e-6, 0.92);
/// ν ∈ (2.1, 50); δ ∈ (−1, 1); S = 0.999; reference α = γ = 0.05.
///
/// The β ceiling of 0.92 satisfies the worst-case check with
/// `0.92 + 0.05 + 0.025 = 0.995 < 0.999 − 1e-3`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamBounds {
    /// ω is mapped to `(omega_min, ∞)`.
    pub omega_min: f64,
    pub alpha: Interval,
    pub gamma: Interval,
    pub beta: Interval,
    pub nu: Interval,
    /// Shared interval for every δⱼ.
    pub delta: Interval,
    /// Stationarity threshold `S` in `α + β + |γ|/2 < S`.
    pub stationarity: f64,
    /// Reference shock response used in the worst-case ceiling check.
    pub alpha_reference: f64,
    /// Reference leverage used in the worst-case ceiling check.
    pub gamma_reference: f64,
}

impl Default for ParamBounds {
    fn default() -> Self {
        Self {
            omega_min: 1e-8,
            alpha: Interval { lower: 1e-6, upper: 0.3 },
            gamma: Interval { lower: -0.5, upper: 0.5 },
            beta: Interval { lower: 1e-6, upper: 0.92 },
            nu: Interval { lower: 2.1, upper: 50.0 },
            delta: Interval { lower: -1.0, upper: 1.0 },
            stationarity: 0.999,
            alpha_reference: 0.05,
            gamma_reference: 0.05,
        }
    }
}

impl ParamBounds {
    /// Construct bounds and run [`ParamBounds::check_feasibility`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        omega_min: f64, alpha: Interval, gamma: Interval, beta: Interval, nu: Interval,
        delta: Interval, stationarity: f64, reference: (f64, f64),
    ) -> TarchResult<Self> {
        let bounds = Self {
            omega_min,
            alpha,
            gamma,
            beta,
            nu,
            delta,
            stationarity,
            alpha_reference: reference.0,
            gamma_reference: reference.1,
        };
        bounds.check_feasibility()?;
        Ok(bounds)
    }

    /// Copy with a different β interval, re-checked for feasibility.
    pub fn with_beta(self, lower: f64, upper: f64) -> TarchResult<Self> {
        let bounds = Self { beta: Interval::new("beta", lower, upper)?, ..self };
        bounds.check_feasibility()?;
        Ok(bounds)
    }

    /// Copy with a different stationarity threshold, re-checked for feasibility.
    pub fn with_stationarity(self, threshold: f64) -> TarchResult<Self> {
        let bounds = Self { stationarity: threshold, ..self };
        bounds.check_feasibility()?;
        Ok(bounds)
    }

    /// Validate intervals and the joint feasibility of box and stationarity.
    ///
    /// Errors
    /// ------
    /// - `TarchError::InvalidBound` for malformed intervals, negative α/β
    ///   lower bounds, or ν lower bound ≤ 2.
    /// - `TarchError::InvalidStationarityThreshold` if `S ∉ (0, 1]`.
    /// - `TarchError::InvalidStartValue` if a reference value lies outside
    ///   its interval.
    /// - `TarchError::ConstraintInfeasible` if either analytic check fails.
    pub fn check_feasibility(&self) -> TarchResult<()> {
        if !self.omega_min.is_finite() || self.omega_min < 0.0 {
            return Err(TarchError::InvalidBound {
                name: "omega",
                lower: self.omega_min,
                upper: f64::INFINITY,
                reason: "Lower bound of omega must be finite and >= 0.",
            });
        }
        for (name, interval) in [
            ("alpha", self.alpha),
            ("gamma", self.gamma),
            ("beta", self.beta),
            ("nu", self.nu),
            ("delta", self.delta),
        ] {
            Interval::new(name, interval.lower, interval.upper)?;
        }
        if self.alpha.lower < 0.0 || self.beta.lower < 0.0 {
            let (name, iv) =
                if self.alpha.lower < 0.0 { ("alpha", self.alpha) } else { ("beta", self.beta) };
            return Err(TarchError::InvalidBound {
                name,
                lower: iv.lower,
                upper: iv.upper,
                reason: "Lower bound must be >= 0.",
            });
        }
        if self.nu.lower <= 2.0 {
            return Err(TarchError::InvalidBound {
                name: "nu",
                lower: self.nu.lower,
                upper: self.nu.upper,
                reason: "Degrees of freedom must exceed 2 for a finite variance.",
            });
        }
        if !(self.stationarity > 0.0 && self.stationarity <= 1.0) {
            return Err(TarchError::InvalidStationarityThreshold { value: self.stationarity });
        }
        if !(self.alpha_reference >= self.alpha.lower && self.alpha_reference <= self.alpha.upper)
        {
            return Err(TarchError::InvalidStartValue {
                name: "alpha_reference",
                value: self.alpha_reference,
                reason: "Reference alpha must lie within the alpha bounds.",
            });
        }
        if !(self.gamma_reference >= self.gamma.lower && self.gamma_reference <= self.gamma.upper)
        {
            return Err(TarchError::InvalidStartValue {
                name: "gamma_reference",
                value: self.gamma_reference,
                reason: "Reference gamma must lie within the gamma bounds.",
            });
        }

        let ceiling = persistence(self.alpha_reference, self.gamma_reference, self.beta.upper);
        if ceiling >= self.stationarity - FEASIBILITY_MARGIN {
            return Err(TarchError::ConstraintInfeasible {
                persistence: ceiling,
                threshold: self.stationarity,
                reason: "beta upper bound plus reference alpha and |gamma|/2 leaves no margin below the threshold; lower the beta ceiling.",
            });
        }

        let floor = persistence(self.alpha.lower, self.max_abs_gamma(), self.beta.lower);
        if floor >= self.stationarity - STATIONARITY_MARGIN {
            return Err(TarchError::ConstraintInfeasible {
                persistence: floor,
                threshold: self.stationarity,
                reason: "lower bounds of alpha and beta with the largest |gamma| already violate stationarity.",
            });
        }
        Ok(())
    }

    /// Budget for `α + β` given γ: `S − STATIONARITY_MARGIN − |γ|/2`.
    pub fn persistence_budget(&self, gamma: f64) -> f64 {
        self.stationarity - STATIONARITY_MARGIN - gamma.abs() / 2.0
    }

    pub fn max_abs_gamma(&self) -> f64 {
        self.gamma.lower.abs().max(self.gamma.upper.abs())
    }
}
