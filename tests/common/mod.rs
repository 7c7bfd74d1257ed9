//! Shared fixtures for integration tests.
//!
//! Simulated paths come from the crate's own seeded simulator, so every
//! fixture also exercises `volatility::simulate` end to end.
#![allow(dead_code)]

use ndarray::Array1;
use rust_tarchx::volatility::{
    core::{
        data::TarchData,
        exog::{ExogColumn, ExogMatrix, ExogTag},
        params::TarchParams,
    },
    simulate::{SimOptions, simulate},
};

/// Burn-in used by every fixture path.
pub const BURN_IN: usize = 500;

/// Plain GARCH(1,1) with ν = 6, used by the recovery and batch tests.
pub fn recovery_params() -> TarchParams {
    TarchParams {
        mean: 0.0,
        omega: 0.01,
        alpha: 0.05,
        gamma: 0.0,
        beta: 0.90,
        nu: 6.0,
        delta: Array1::zeros(0),
    }
}

/// `exog.n_obs()` returns simulated from `params` after [`BURN_IN`] steps.
pub fn simulate_returns(seed: u64, params: &TarchParams, exog: &ExogMatrix) -> Array1<f64> {
    simulate(params, exog, &SimOptions { seed, burn_in: BURN_IN }, 1e-8)
        .expect("fixture parameters are stationary")
        .returns
}

/// `n` returns from [`recovery_params`].
pub fn recovery_returns(seed: u64, n: usize) -> Array1<f64> {
    simulate_returns(seed, &recovery_params(), &ExogMatrix::empty(n))
}

/// Indicator that is one on `[start, end)` and zero elsewhere.
pub fn event_window(n: usize, start: usize, end: usize) -> Array1<f64> {
    Array1::from_iter((0..n).map(|t| if (start..end).contains(&t) { 1.0 } else { 0.0 }))
}

/// Design with a single event-tagged column.
pub fn event_matrix(name: &str, column: Array1<f64>) -> ExogMatrix {
    ExogMatrix::new(column.len(), vec![ExogColumn::new(name, ExogTag::Event, column)])
        .expect("single column always validates")
}

/// Data with a single event-tagged column.
pub fn data_with_event(returns: Array1<f64>, name: &str, column: Array1<f64>) -> TarchData {
    TarchData::new(returns, event_matrix(name, column)).expect("simulated data should validate")
}
