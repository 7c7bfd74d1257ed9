//! Numeric aliases and concrete solver types.
//!
//! `Theta` and `Grad` have one entry per free coordinate of the
//! unconstrained TARCH-X parameterization (`5 + k` entries). `Cost` is the
//! average negative log-likelihood per observation.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::collections::HashMap;

/// Unconstrained parameter vector `θ` seen by the solver.
pub type Theta = Array1<f64>;

/// Gradient of the cost with respect to `θ`.
pub type Grad = Array1<f64>;

/// Scalar objective value minimized by the solver.
pub type Cost = f64;

/// Solver counters keyed by name (`"cost_count"`, `"gradient_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// L-BFGS history length when `MLEOptions::lbfgs_mem` is `None`.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Hager–Zhang line search specialized to this crate’s numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search specialized to this crate’s numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS solver wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS solver wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
