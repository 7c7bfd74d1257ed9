//! Parallel batch estimation and parametric bootstrap.
//!
//! Purpose
//! -------
//! Run many independent estimations (one per asset, one per bootstrap
//! replicate) on the rayon pool without letting a single failure abort the
//! job. Every task owns its inputs and, where randomness is involved, its
//! own seed.
//!
//! Key behaviors
//! -------------
//! - [`fit_batch`] returns one `TarchResult` per input, in input order.
//! - [`parametric_bootstrap`] simulates replicates from a converged fit,
//!   refits each, and keeps only converged replicates for intervals.
//! - Replicate seeds are drawn serially from the configured seed before any
//!   work is scheduled, so results do not depend on the thread count.
//! - A fit that switched to the tag-aggregated design is bootstrapped on
//!   that design.
use crate::volatility::{
    core::{data::TarchData, options::TarchOptions},
    errors::{TarchError, TarchResult},
    models::tarchx::estimate,
    results::EstimationResult,
    simulate::{SimOptions, simulate},
};
use log::{debug, warn};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;

/// Fit every data set with the same options, in parallel.
pub fn fit_batch(
    datasets: &[TarchData], options: &TarchOptions,
) -> Vec<TarchResult<EstimationResult>> {
    datasets.par_iter().map(|data| estimate(data, options)).collect()
}

/// Outcome counts for a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchSummary {
    pub n_total: usize,
    pub n_converged: usize,
    /// Fits that ran but did not converge.
    pub n_not_converged: usize,
    /// Tasks rejected with an error before fitting.
    pub n_errors: usize,
    pub convergence_rate: f64,
}

impl BatchSummary {
    pub fn from_results(results: &[TarchResult<EstimationResult>]) -> Self {
        let n_total = results.len();
        let n_converged = results.iter().filter(|r| matches!(r, Ok(f) if f.converged)).count();
        let n_errors = results.iter().filter(|r| r.is_err()).count();
        Self {
            n_total,
            n_converged,
            n_not_converged: n_total - n_converged - n_errors,
            n_errors,
            convergence_rate: rate(n_converged, n_total),
        }
    }
}

/// Bootstrap settings. The base seed comes from `TarchOptions::seed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapOptions {
    pub n_replicates: usize,
    pub burn_in: usize,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self { n_replicates: 200, burn_in: 500 }
    }
}

/// Converged replicate estimates and their convergence rate.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapSummary {
    pub names: Vec<String>,
    /// One row per converged replicate, columns in parameter layout order.
    pub estimates: Array2<f64>,
    pub n_requested: usize,
    pub n_converged: usize,
    pub convergence_rate: f64,
}

impl BootstrapSummary {
    /// Converged draws for one parameter.
    pub fn draws(&self, name: &str) -> Option<Array1<f64>> {
        let j = self.names.iter().position(|n| n == name)?;
        Some(self.estimates.column(j).to_owned())
    }

    /// Equal-tailed percentile interval at `level` (e.g. 0.95).
    ///
    /// Returns `None` for an unknown name, a level outside `(0, 1)`, or when
    /// no replicate converged.
    pub fn percentile_interval(&self, name: &str, level: f64) -> Option<(f64, f64)> {
        if !(level > 0.0 && level < 1.0) || self.n_converged == 0 {
            return None;
        }
        let mut draws = self.draws(name)?.to_vec();
        draws.sort_by(f64::total_cmp);
        let tail = (1.0 - level) / 2.0;
        Some((quantile(&draws, tail), quantile(&draws, 1.0 - tail)))
    }

    /// Standard deviation of the converged draws (ddof = 1).
    pub fn std_error(&self, name: &str) -> Option<f64> {
        let draws = self.draws(name)?;
        if draws.len() < 2 {
            return None;
        }
        Some(draws.std(1.0))
    }
}

/// Parametric bootstrap around a converged fit.
///
/// Each replicate simulates a path of `data.n_obs()` returns from
/// `fitted.params` on the design `fitted` was estimated on (the
/// tag-aggregated one after a successful fallback), then refits with
/// `options`. Replicates that error or do not converge are dropped.
///
/// # Errors
/// - `InvalidBootstrap` if `n_replicates == 0` or `fitted` did not converge.
/// - `InvalidSimulation` if the fitted parameters cannot be simulated.
pub fn parametric_bootstrap(
    fitted: &EstimationResult, data: &TarchData, options: &TarchOptions,
    boot: &BootstrapOptions,
) -> TarchResult<BootstrapSummary> {
    if boot.n_replicates == 0 {
        return Err(TarchError::InvalidBootstrap { reason: "Number of replicates must be > 0." });
    }
    if !fitted.converged {
        return Err(TarchError::InvalidBootstrap {
            reason: "Cannot bootstrap from a fit that did not converge.",
        });
    }
    let design = fitted_design(fitted, data)?;
    let mut master = StdRng::seed_from_u64(options.seed);
    let seeds: Vec<u64> = (0..boot.n_replicates).map(|_| master.gen()).collect();
    let floor = options.variance_floor;

    // Fail fast on parameters that cannot be simulated at all.
    simulate(&fitted.params, &design.exog, &SimOptions { seed: seeds[0], burn_in: 0 }, floor)?;

    let replicates: Vec<Option<Array1<f64>>> = seeds
        .par_iter()
        .map(|&seed| {
            let sim_opts = SimOptions { seed, burn_in: boot.burn_in };
            let path = simulate(&fitted.params, &design.exog, &sim_opts, floor).ok()?;
            let replicate = TarchData::new(path.returns, design.exog.clone()).ok()?;
            match estimate(&replicate, options) {
                Ok(res) if res.converged && res.params.k() == fitted.params.k() => {
                    Some(res.params.to_array())
                }
                Ok(_) => None,
                Err(err) => {
                    debug!("Bootstrap replicate (seed {seed}) rejected: {err}");
                    None
                }
            }
        })
        .collect();

    let dim = fitted.n_params;
    let kept: Vec<Array1<f64>> = replicates.into_iter().flatten().collect();
    let n_converged = kept.len();
    let mut estimates = Array2::<f64>::zeros((n_converged, dim));
    for (i, row) in kept.iter().enumerate() {
        estimates.row_mut(i).assign(row);
    }
    let convergence_rate = rate(n_converged, boot.n_replicates);
    if n_converged < boot.n_replicates {
        warn!(
            "Bootstrap: {n_converged}/{} replicates converged ({:.1}%)",
            boot.n_replicates,
            100.0 * convergence_rate
        );
    }
    Ok(BootstrapSummary {
        names: fitted.estimates.iter().map(|e| e.name.clone()).collect(),
        estimates,
        n_requested: boot.n_replicates,
        n_converged,
        convergence_rate,
    })
}

// ---- Helper Methods ----

/// Design behind `fitted`: `data` itself, or its tag aggregation when the
/// fallback replaced the original fit.
fn fitted_design(fitted: &EstimationResult, data: &TarchData) -> TarchResult<TarchData> {
    match &fitted.diagnostics.fallback {
        Some(info) if info.succeeded => data.with_exog(data.exog.aggregate_by_tag(info.rule)),
        _ => Ok(data.clone()),
    }
}

fn rate(part: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { part as f64 / total as f64 }
}

/// Linear-interpolation quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
}
