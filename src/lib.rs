//! rust_tarchx — constrained TARCH-X volatility estimation with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the TARCH-X estimator to Python via the `_rust_tarchx` extension module.
//! When the `python-bindings` feature is enabled, this module defines the
//! Python-facing classes and the `volatility_models` submodule.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`volatility`, `inference`,
//!   `optimization`) as the public crate surface.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_rust_tarchx` Python extension.
//! - Register the `volatility_models` submodule under `rust_tarchx` so that
//!   dot-notation imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner Rust modules; this file performs
//!   only FFI glue, input conversion, and error mapping.
//! - Python-visible types mirror the invariants of their Rust counterparts
//!   (`TarchXModel`, `EstimationResult`).
//!
//! Conventions
//! -----------
//! - Parameter layout is `(μ, ω, α, γ, β, ν, δ₁…δₖ)` everywhere, including
//!   the vectors returned to Python.
//! - Errors from core Rust code are converted to `PyErr` values at the PyO3
//!   boundary (`ValueError` with the Rust error message).
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`volatility`] directly and can ignore
//!   the items guarded by the `python-bindings` feature.
//! - The Python packaging layer imports `_rust_tarchx` and wraps its classes
//!   in user-facing APIs.
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and by
//!   the simulation-based integration tests under `tests/`.

pub mod inference;
pub mod optimization;
pub mod utils;
pub mod volatility;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    utils::{build_tarch_options, extract_tarch_data},
    volatility::{
        models::tarchx::{FitState, TarchXModel},
        results::EstimationResult,
    },
};

/// TarchX — Python-facing wrapper for [`TarchXModel`].
///
/// Purpose
/// -------
/// Let Python callers configure a TARCH-X estimator with keyword arguments,
/// fit it once to a return series with optional tagged exogenous columns,
/// and retrieve the fitted result.
///
/// Parameters
/// ----------
/// Constructed from Python via `TarchX(beta_max=None, stationarity=None, ...)`.
/// Every argument is optional; omitted ones use the Rust defaults. Infeasible
/// bounds raise `ValueError` at construction.
///
/// Notes
/// -----
/// - Marked `unsendable` because the inner model carries fit state.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_tarchx.volatility_models", unsendable)]
pub struct TarchX {
    inner: TarchXModel,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl TarchX {
    #[new]
    #[pyo3(
        signature = (
            beta_max=None,
            stationarity=None,
            variance_floor=None,
            gradient=None,
            fallback=None,
            tol_grad=None,
            tol_cost=None,
            max_iter=None,
            line_searcher=None,
            lbfgs_mem=None,
            seed=None,
        )
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        beta_max: Option<f64>, stationarity: Option<f64>, variance_floor: Option<f64>,
        gradient: Option<&str>, fallback: Option<&str>, tol_grad: Option<f64>,
        tol_cost: Option<f64>, max_iter: Option<usize>, line_searcher: Option<&str>,
        lbfgs_mem: Option<usize>, seed: Option<u64>,
    ) -> PyResult<Self> {
        let options = build_tarch_options(
            beta_max,
            stationarity,
            variance_floor,
            gradient,
            fallback,
            tol_grad,
            tol_cost,
            max_iter,
            line_searcher,
            lbfgs_mem,
            seed,
        )?;
        Ok(Self { inner: TarchXModel::new(options)? })
    }

    /// Fit to `returns` with optional exogenous columns and return the result.
    #[pyo3(signature = (returns, exog=None, exog_names=None, exog_tags=None))]
    pub fn fit<'py>(
        &mut self, py: Python<'py>, returns: &Bound<'py, PyAny>,
        exog: Option<Vec<Bound<'py, PyAny>>>, exog_names: Option<Vec<String>>,
        exog_tags: Option<Vec<String>>,
    ) -> PyResult<TarchXResult> {
        let data = extract_tarch_data(py, returns, exog, exog_names, exog_tags)?;
        let result = self.inner.fit(&data)?;
        Ok(TarchXResult { inner: result.clone() })
    }

    /// One of `"not_fitted"`, `"fitting"`, `"converged"`, `"failed"`.
    #[getter]
    pub fn state(&self) -> &'static str {
        match self.inner.state() {
            FitState::NotFitted => "not_fitted",
            FitState::Fitting => "fitting",
            FitState::Converged => "converged",
            FitState::Failed => "failed",
        }
    }

    #[getter]
    pub fn result(&self) -> PyResult<TarchXResult> {
        let result = self.inner.result()?;
        Ok(TarchXResult { inner: result.clone() })
    }
}

/// TarchXResult — read-only view of an [`EstimationResult`].
///
/// Getters copy data into Python-owned objects; the Rust result is never
/// mutated.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_tarchx.volatility_models")]
pub struct TarchXResult {
    pub inner: EstimationResult,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl TarchXResult {
    #[getter]
    pub fn names(&self) -> Vec<String> {
        self.inner.estimates.iter().map(|e| e.name.clone()).collect()
    }

    #[getter]
    pub fn params(&self) -> Vec<f64> {
        self.inner.params.to_array().to_vec()
    }

    #[getter]
    pub fn std_errors(&self) -> Vec<f64> {
        self.inner.estimates.iter().map(|e| e.std_error).collect()
    }

    #[getter]
    pub fn p_values(&self) -> Vec<f64> {
        self.inner.estimates.iter().map(|e| e.p_value).collect()
    }

    #[getter]
    pub fn log_likelihood(&self) -> f64 {
        self.inner.log_likelihood
    }

    #[getter]
    pub fn aic(&self) -> f64 {
        self.inner.aic
    }

    #[getter]
    pub fn bic(&self) -> f64 {
        self.inner.bic
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.converged
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.iterations
    }

    #[getter]
    pub fn persistence(&self) -> f64 {
        self.inner.persistence()
    }

    #[getter]
    pub fn unreliable_inference(&self) -> bool {
        self.inner.diagnostics.unreliable_inference
    }

    #[getter]
    pub fn fallback_used(&self) -> bool {
        self.inner.diagnostics.fallback.as_ref().is_some_and(|f| f.succeeded)
    }

    /// `(column, tag, estimate, std_error, p_value)` for every δ.
    #[getter]
    pub fn exog_effects(&self) -> Vec<(String, String, f64, f64, f64)> {
        self.inner
            .exog_effects
            .values()
            .flatten()
            .map(|e| {
                (
                    e.column.clone(),
                    e.tag.to_string(),
                    e.estimate.value,
                    e.estimate.std_error,
                    e.estimate.p_value,
                )
            })
            .collect()
    }

    #[getter]
    pub fn variance<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.variance.to_vec().into_pyarray(py)
    }

    #[getter]
    pub fn std_residuals<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.std_residuals.to_vec().into_pyarray(py)
    }
}

/// _rust_tarchx — PyO3 module initializer for the Python extension.
///
/// Creates the `volatility_models` submodule, attaches it to the parent
/// module, and registers it in `sys.modules` so it is importable via a
/// dotted path.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_tarchx<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let volatility_models_mod = PyModule::new(_py, "volatility_models")?;
    volatility_models(_py, m, &volatility_models_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_tarchx.volatility_models", volatility_models_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn volatility_models<'py>(
    _py: Python, rust_tarchx: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<TarchX>()?;
    m.add_class::<TarchXResult>()?;
    rust_tarchx.add_submodule(m)?;
    Ok(())
}
