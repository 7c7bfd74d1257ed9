//! Seeded simulation of TARCH-X return paths.
//!
//! Paths start from the unconditional variance `ω / (1 − α − β − |γ|/2)`
//! with a zero lagged shock, run `burn_in` steps without exogenous input,
//! and then emit `n` returns aligned with the supplied design. Row 0 of the
//! design never enters the recursion, matching the filter, whose σ²₀ is the
//! sample variance. Innovations
//! are Student-t draws rescaled to unit variance by `√((ν − 2)/ν)`.
//!
//! Each call owns its `StdRng`, so the same seed always produces the same
//! path no matter which thread runs it.
use crate::volatility::{
    core::{
        exog::ExogMatrix,
        filter::{apply_floor, raw_variance},
        params::TarchParams,
    },
    errors::{TarchError, TarchResult},
};
use ndarray::Array1;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, StudentT};

/// Simulation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimOptions {
    pub seed: u64,
    /// Steps discarded before the first emitted return.
    pub burn_in: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self { seed: 42, burn_in: 500 }
    }
}

/// Simulated returns with their true conditional variances.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedPath {
    pub returns: Array1<f64>,
    pub variance: Array1<f64>,
}

/// Simulate `exog.n_obs()` returns from `params`.
///
/// # Errors
/// - `InvalidSimulation` for an empty design length, a regressor count that
///   does not match `params`, `ν ≤ 2`, a non-positive ω, or a
///   non-stationary parameter set.
pub fn simulate(
    params: &TarchParams, exog: &ExogMatrix, opts: &SimOptions, variance_floor: f64,
) -> TarchResult<SimulatedPath> {
    let n = exog.n_obs();
    if n == 0 {
        return Err(TarchError::InvalidSimulation { reason: "Path length must be > 0." });
    }
    if exog.k() != params.k() {
        return Err(TarchError::InvalidSimulation {
            reason: "Exogenous column count must match the number of delta coefficients.",
        });
    }
    if !(params.nu > 2.0) {
        return Err(TarchError::InvalidSimulation { reason: "Degrees of freedom must exceed 2." });
    }
    if !(params.omega > 0.0) {
        return Err(TarchError::InvalidSimulation { reason: "Omega must be > 0." });
    }
    let persistence = params.persistence();
    if !(persistence < 1.0) {
        return Err(TarchError::InvalidSimulation {
            reason: "alpha + beta + |gamma|/2 must be < 1 for a finite unconditional variance.",
        });
    }
    let t_dist = StudentT::new(params.nu)
        .map_err(|_| TarchError::InvalidSimulation { reason: "Invalid Student-t shape." })?;
    let scale = ((params.nu - 2.0) / params.nu).sqrt();
    let mut rng = StdRng::seed_from_u64(opts.seed);

    let mut returns = Array1::<f64>::zeros(n);
    let mut variance = Array1::<f64>::zeros(n);
    let mut var = params.omega / (1.0 - persistence);
    let mut dev = 0.0;
    for step in 0..opts.burn_in + n {
        if step > 0 {
            let exog_term = match step.checked_sub(opts.burn_in) {
                Some(t) if t > 0 && params.k() > 0 => params.delta.dot(&exog.row(t)),
                _ => 0.0,
            };
            var = apply_floor(raw_variance(params, dev, var, exog_term), variance_floor).0;
        }
        dev = var.sqrt() * scale * t_dist.sample(&mut rng);
        if step >= opts.burn_in {
            let t = step - opts.burn_in;
            returns[t] = params.mean + dev;
            variance[t] = var;
        }
    }
    Ok(SimulatedPath { returns, variance })
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover seed reproducibility, positivity of the simulated
    // variance, alignment of the design with the filter, and rejection of
    // non-stationary parameters.
    // -------------------------------------------------------------------------

    fn params() -> TarchParams {
        TarchParams {
            mean: 0.0,
            omega: 0.01,
            alpha: 0.05,
            gamma: 0.04,
            beta: 0.9,
            nu: 6.0,
            delta: Array1::zeros(0),
        }
    }

    #[test]
    // Purpose
    // -------
    // Equal seeds give equal paths; different seeds differ.
    //
    // Given
    // -----
    // - 200 steps with seeds 7, 7, and 8.
    //
    // Expect
    // ------
    // - Bit-identical first two paths; the third differs; variances > 0.
    fn simulate_is_reproducible_per_seed() {
        // Arrange
        let exog = ExogMatrix::empty(200);
        let a_opts = SimOptions { seed: 7, burn_in: 100 };
        let b_opts = SimOptions { seed: 8, burn_in: 100 };

        // Act
        let a = simulate(&params(), &exog, &a_opts, 1e-8).expect("valid request");
        let a2 = simulate(&params(), &exog, &a_opts, 1e-8).expect("valid request");
        let b = simulate(&params(), &exog, &b_opts, 1e-8).expect("valid request");

        // Assert
        assert_eq!(a, a2);
        assert_ne!(a.returns, b.returns);
        assert!(a.variance.iter().all(|&s| s > 0.0));
    }

    #[test]
    // Purpose
    // -------
    // Reject parameters without a finite unconditional variance.
    //
    // Given
    // -----
    // - α + β + |γ|/2 = 1.02.
    //
    // Expect
    // ------
    // - `InvalidSimulation`.
    fn simulate_rejects_non_stationary_params() {
        // Arrange
        let mut p = params();
        p.beta = 0.95;

        // Act
        let res = simulate(&p, &ExogMatrix::empty(10), &SimOptions::default(), 1e-8);

        // Assert
        assert!(matches!(res, Err(TarchError::InvalidSimulation { .. })));
    }

    #[test]
    // Purpose
    // -------
    // The first emitted observation ignores its design row, as the filter
    // does.
    //
    // Given
    // -----
    // - δ = 0.5 on a column that is one only at t = 0, against the same
    //   parameters on a zero column; 100 burn-in steps, equal seeds.
    //
    // Expect
    // ------
    // - Identical paths.
    fn first_design_row_is_not_used() {
        // Arrange
        let mut p = params();
        p.delta = ndarray::array![0.5];
        let mut pulse = Array1::zeros(50);
        pulse[0] = 1.0;
        let column = |values| {
            ExogMatrix::new(50, vec![crate::volatility::core::exog::ExogColumn::new(
                "pulse",
                crate::volatility::core::exog::ExogTag::Event,
                values,
            )])
            .expect("column matches the length")
        };
        let opts = SimOptions { seed: 3, burn_in: 100 };

        // Act
        let with_pulse = simulate(&p, &column(pulse), &opts, 1e-8).expect("valid request");
        let without = simulate(&p, &column(Array1::zeros(50)), &opts, 1e-8).expect("valid request");

        // Assert
        assert_eq!(with_pulse, without);
    }
}
