//! Immutable estimation results for TARCH-X fits.
//!
//! Purpose
//! -------
//! Package the optimizer outcome and the inference output into one typed
//! snapshot: parameters with standard errors and p-values, fit statistics,
//! the fitted variance path, standardized residuals, exogenous effects
//! grouped by tag, and the diagnostics callers need for local pass/fail
//! decisions in batch work.
//!
//! Key behaviors
//! -------------
//! - Optimization quality is data: non-convergence, unreliable inference,
//!   floored variances, and a used fallback are fields, never errors.
//! - [`EstimationResult::flat_record`] produces a serde-serializable flat
//!   record (`name → value` plus metadata) for persistence.
//!
//! Conventions
//! -----------
//! - `aic = 2k − 2 logL` and `bic = k ln n − 2 logL` with `k = 6 + #δ`.
//! - Exogenous effects keep the column order of the fitted design within
//!   each tag group.
use crate::optimization::loglik_optimizer::StopReason;
use crate::volatility::core::{
    exog::{AggregationRule, ExogTag},
    params::TarchParams,
};
use ndarray::{Array1, Array2};
use serde::Serialize;
use std::collections::BTreeMap;

/// One fitted coefficient with its inference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamEstimate {
    pub name: String,
    pub value: f64,
    pub std_error: f64,
    pub t_stat: f64,
    pub p_value: f64,
}

/// A δ coefficient labeled with its column and tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExogEffect {
    pub column: String,
    pub tag: ExogTag,
    pub estimate: ParamEstimate,
}

/// Record of a refit on a tag-aggregated design.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackInfo {
    pub rule: AggregationRule,
    pub original_columns: Vec<String>,
    pub aggregated_columns: Vec<String>,
    /// Whether the aggregated refit converged and replaced the original fit.
    pub succeeded: bool,
}

/// Quality flags for a fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    pub stop_reason: StopReason,
    pub status: String,
    pub restarts: usize,
    pub grad_norm: Option<f64>,
    pub cost_evals: usize,
    /// Set when the Hessian was singular or near-singular at the optimum.
    pub unreliable_inference: bool,
    /// Parameters whose standard errors are undefined.
    pub singular_params: Vec<String>,
    /// Observations whose variance was lifted to the floor.
    pub floored_variances: usize,
    /// `α + β + |γ|/2` at the estimate.
    pub persistence: f64,
    pub fallback: Option<FallbackInfo>,
}

/// Snapshot of a finished estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationResult {
    pub params: TarchParams,
    pub estimates: Vec<ParamEstimate>,
    /// Covariance of the model parameters (NaN rows/columns where undefined).
    pub covariance: Array2<f64>,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub n_obs: usize,
    pub n_params: usize,
    pub converged: bool,
    pub iterations: usize,
    pub variance: Array1<f64>,
    pub std_residuals: Array1<f64>,
    pub exog_effects: BTreeMap<ExogTag, Vec<ExogEffect>>,
    pub diagnostics: Diagnostics,
}

/// Flat persistence record: `name → value` plus fit metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRecord {
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
    pub converged: bool,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub n_obs: usize,
    pub n_params: usize,
    pub iterations: usize,
}

/// `(AIC, BIC)` for a log-likelihood with `k` parameters and `n` observations.
pub fn information_criteria(log_likelihood: f64, k: usize, n: usize) -> (f64, f64) {
    let k = k as f64;
    let aic = 2.0 * k - 2.0 * log_likelihood;
    let bic = k * (n as f64).ln() - 2.0 * log_likelihood;
    (aic, bic)
}

impl EstimationResult {
    /// Estimate by parameter name (e.g. `"beta"` or `"delta[halving]"`).
    pub fn estimate(&self, name: &str) -> Option<&ParamEstimate> {
        self.estimates.iter().find(|e| e.name == name)
    }

    /// Effects carrying `tag`, in column order.
    pub fn effects_for(&self, tag: &ExogTag) -> &[ExogEffect] {
        self.exog_effects.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn persistence(&self) -> f64 {
        self.params.persistence()
    }

    /// Flat `name → value` record with metadata.
    pub fn flat_record(&self) -> FlatRecord {
        FlatRecord {
            values: self.estimates.iter().map(|e| (e.name.clone(), e.value)).collect(),
            converged: self.converged,
            log_likelihood: self.log_likelihood,
            aic: self.aic,
            bic: self.bic,
            n_obs: self.n_obs,
            n_params: self.n_params,
            iterations: self.iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover information criteria, lookup helpers, and the shape of
    // the serialized flat record.
    // -------------------------------------------------------------------------

    fn estimate(name: &str, value: f64) -> ParamEstimate {
        ParamEstimate {
            name: name.to_string(),
            value,
            std_error: 0.1,
            t_stat: value / 0.1,
            p_value: 0.5,
        }
    }

    fn result() -> EstimationResult {
        let params = TarchParams {
            mean: 0.02,
            omega: 0.01,
            alpha: 0.05,
            gamma: 0.04,
            beta: 0.9,
            nu: 6.0,
            delta: array![0.3],
        };
        let names = ["mean", "omega", "alpha", "gamma", "beta", "nu", "delta[etf]"];
        let estimates: Vec<ParamEstimate> = names
            .iter()
            .zip(params.to_array().iter())
            .map(|(n, &v)| estimate(n, v))
            .collect();
        let mut exog_effects = BTreeMap::new();
        exog_effects.insert(ExogTag::Event, vec![ExogEffect {
            column: "etf".to_string(),
            tag: ExogTag::Event,
            estimate: estimates[6].clone(),
        }]);
        let (aic, bic) = information_criteria(-100.0, 7, 50);
        EstimationResult {
            params,
            estimates,
            covariance: Array2::zeros((7, 7)),
            log_likelihood: -100.0,
            aic,
            bic,
            n_obs: 50,
            n_params: 7,
            converged: true,
            iterations: 31,
            variance: Array1::ones(50),
            std_residuals: Array1::zeros(50),
            exog_effects,
            diagnostics: Diagnostics {
                stop_reason: StopReason::Converged,
                status: "Solver converged".to_string(),
                restarts: 0,
                grad_norm: Some(1e-7),
                cost_evals: 80,
                unreliable_inference: false,
                singular_params: Vec::new(),
                floored_variances: 0,
                persistence: 0.97,
                fallback: None,
            },
        }
    }

    #[test]
    // Purpose
    // -------
    // AIC and BIC follow their textbook definitions.
    //
    // Given
    // -----
    // - logL = −100, k = 7, n = 50.
    //
    // Expect
    // ------
    // - AIC = 214 and BIC = 7 ln 50 + 200.
    fn information_criteria_match_definitions() {
        // Act
        let (aic, bic) = information_criteria(-100.0, 7, 50);

        // Assert
        assert_eq!(aic, 214.0);
        assert!((bic - (7.0 * 50f64.ln() + 200.0)).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Look up estimates and grouped effects.
    //
    // Given
    // -----
    // - A result with one event column.
    //
    // Expect
    // ------
    // - Named lookup works; sentiment group is empty.
    fn lookups_find_named_and_tagged_entries() {
        // Arrange
        let res = result();

        // Act / Assert
        assert_eq!(res.estimate("beta").map(|e| e.value), Some(0.9));
        assert!(res.estimate("delta[missing]").is_none());
        assert_eq!(res.effects_for(&ExogTag::Event).len(), 1);
        assert!(res.effects_for(&ExogTag::Sentiment).is_empty());
    }

    #[test]
    // Purpose
    // -------
    // The flat record serializes parameter names at the top level.
    //
    // Given
    // -----
    // - The fixture result.
    //
    // Expect
    // ------
    // - JSON keys include "beta", "delta[etf]", "converged", "n_params".
    fn flat_record_serializes_flat() {
        // Arrange
        let res = result();

        // Act
        let json = serde_json::to_value(res.flat_record()).expect("record should serialize");

        // Assert
        assert_eq!(json["beta"], serde_json::json!(0.9));
        assert_eq!(json["delta[etf]"], serde_json::json!(0.3));
        assert_eq!(json["converged"], serde_json::json!(true));
        assert_eq!(json["n_params"], serde_json::json!(7));
    }
}
