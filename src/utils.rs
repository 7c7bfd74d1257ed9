//! Conversion helpers for the Python bindings.
//!
//! Everything here turns loosely typed Python inputs (NumPy arrays, pandas
//! objects, sequences, option strings) into validated Rust types. Validation
//! errors surface as `ValueError`/`TypeError` on the Python side.
#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    inference::hessian::HessianOptions,
    optimization::loglik_optimizer::traits::{LineSearcher, MLEOptions, Tolerances},
    volatility::{
        core::{
            bounds::ParamBounds,
            data::TarchData,
            exog::{AggregationRule, ExogColumn, ExogMatrix, ExogTag},
            options::{
                DEFAULT_VARIANCE_FLOOR, ExogFallback, GradientMode, StartValues, TarchOptions,
            },
        },
        errors::TarchError,
    },
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

/// Accept a contiguous `float64` NumPy array, a pandas Series, or any
/// sequence of floats.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

#[cfg(feature = "python-bindings")]
fn to_owned_array<'py>(
    py: Python<'py>, raw: &Bound<'py, PyAny>, what: &str,
) -> PyResult<Array1<f64>> {
    let arr = extract_f64_array(py, raw)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{what} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(Array1::from(slice.to_vec()))
}

/// Build [`TarchData`] from returns and optional named, tagged columns.
///
/// `exog` is a sequence of 1-D arrays; `names` and `tags` must have the same
/// length. Missing names default to `x0, x1, …`; missing tags default to
/// `"event"`.
#[cfg(feature = "python-bindings")]
pub fn extract_tarch_data<'py>(
    py: Python<'py>, returns: &Bound<'py, PyAny>, exog: Option<Vec<Bound<'py, PyAny>>>,
    names: Option<Vec<String>>, tags: Option<Vec<String>>,
) -> PyResult<TarchData> {
    let returns = to_owned_array(py, returns, "returns")?;
    let n = returns.len();
    let raw_columns = exog.unwrap_or_default();
    let k = raw_columns.len();
    let names = names.unwrap_or_else(|| (0..k).map(|j| format!("x{j}")).collect());
    let tags = tags.unwrap_or_else(|| vec!["event".to_string(); k]);
    if names.len() != k || tags.len() != k {
        return Err(PyValueError::new_err(format!(
            "exog_names and exog_tags must each have {k} entries (got {} and {})",
            names.len(),
            tags.len()
        )));
    }

    let mut columns = Vec::with_capacity(k);
    for ((raw, name), tag) in raw_columns.iter().zip(names).zip(tags) {
        let values = to_owned_array(py, raw, "each exogenous column")?;
        columns.push(ExogColumn::new(name, ExogTag::from(tag.as_str()), values));
    }
    let exog = ExogMatrix::new(n, columns)?;
    Ok(TarchData::new(returns, exog)?)
}

/// Assemble validated [`TarchOptions`] from keyword arguments.
#[cfg(feature = "python-bindings")]
#[allow(clippy::too_many_arguments)]
pub fn build_tarch_options(
    beta_max: Option<f64>, stationarity: Option<f64>, variance_floor: Option<f64>,
    gradient: Option<&str>, fallback: Option<&str>, tol_grad: Option<f64>,
    tol_cost: Option<f64>, max_iter: Option<usize>, line_searcher: Option<&str>,
    lbfgs_mem: Option<usize>, seed: Option<u64>,
) -> PyResult<TarchOptions> {
    let mut bounds = ParamBounds::default();
    if let Some(upper) = beta_max {
        bounds = bounds.with_beta(bounds.beta.lower, upper)?;
    }
    if let Some(threshold) = stationarity {
        bounds = bounds.with_stationarity(threshold)?;
    }

    let gradient_mode = match gradient.unwrap_or("analytic").to_lowercase().as_str() {
        "analytic" => GradientMode::Analytic,
        "finite_difference" | "fd" => GradientMode::FiniteDifference,
        other => {
            return Err(PyValueError::new_err(format!(
                "invalid gradient mode {:?} (expected 'analytic' or 'finite_difference')",
                other
            )));
        }
    };

    let fallback_mode = match fallback.unwrap_or("sum").to_lowercase().as_str() {
        "sum" => ExogFallback::AggregateByTag(AggregationRule::Sum),
        "max" => ExogFallback::AggregateByTag(AggregationRule::Max),
        "none" | "disabled" => ExogFallback::Disabled,
        other => {
            return Err(PyValueError::new_err(format!(
                "invalid fallback {:?} (expected 'sum', 'max', or 'none')",
                other
            )));
        }
    };

    let mle_opts = extract_mle_opts(tol_grad, tol_cost, max_iter, line_searcher, lbfgs_mem)?;

    let options = TarchOptions::new(
        bounds,
        StartValues::default(),
        mle_opts,
        variance_floor.unwrap_or(DEFAULT_VARIANCE_FLOOR),
        gradient_mode,
        fallback_mode,
        HessianOptions::default(),
        seed.unwrap_or(0),
    )?;
    Ok(options)
}

#[cfg(feature = "python-bindings")]
fn extract_mle_opts(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
) -> PyResult<MLEOptions> {
    use std::str::FromStr;

    let defaults = MLEOptions::default().tols;

    // Tolerances::new -> OptResult<Tolerances> -> TarchError -> PyErr
    let tols = Tolerances::new(
        tol_grad.or(defaults.tol_grad),
        tol_cost.or(defaults.tol_cost),
        max_iter.or(defaults.max_iter),
    )
    .map_err(TarchError::from)?;

    let ls = match line_searcher {
        Some(name) => LineSearcher::from_str(name).map_err(TarchError::from)?,
        None => LineSearcher::MoreThuente,
    };

    let opts = MLEOptions::new(tols, ls, false, lbfgs_mem).map_err(TarchError::from)?;

    Ok(opts)
}
