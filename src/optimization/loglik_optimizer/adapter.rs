//! Adapter that exposes a [`NegLogLikelihood`] as an `argmin` problem.
//!
//! The cost handed to argmin is exactly the model's `nll(θ)`. Analytic
//! gradients are passed through after validation; objectives without one are
//! differentiated numerically via [`fd_gradient`].
//!
//! Every successful cost evaluation is reported to an [`IterateTracker`]
//! owned by the caller, so a best-effort iterate survives even when the
//! solver itself aborts with an error.
use std::{
    cell::RefCell,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        finite_diff::fd_gradient,
        traits::NegLogLikelihood,
        types::{Cost, FnEvalMap, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient, KV, State, observers::Observe};

/// Records the lowest finite cost seen across one or more solver runs.
///
/// Lives outside the argmin `Executor` so it is still readable after the
/// executor returns an error and drops its state.
#[derive(Debug, Default)]
pub struct IterateTracker {
    inner: RefCell<TrackerState>,
}

#[derive(Debug, Default)]
struct TrackerState {
    best: Option<(Theta, Cost)>,
    cost_evals: u64,
    gradient_evals: u64,
}

impl IterateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer an evaluated point; kept only if its cost is finite and lowest so far.
    pub fn record(&self, theta: &Theta, cost: Cost) {
        let mut state = self.inner.borrow_mut();
        state.cost_evals += 1;
        if !cost.is_finite() {
            return;
        }
        let improves = match &state.best {
            Some((_, best)) => cost < *best,
            None => true,
        };
        if improves {
            state.best = Some((theta.clone(), cost));
        }
    }

    pub fn record_gradient(&self) {
        self.inner.borrow_mut().gradient_evals += 1;
    }

    /// Best `(θ, cost)` pair seen so far.
    pub fn best(&self) -> Option<(Theta, Cost)> {
        self.inner.borrow().best.clone()
    }

    /// Evaluation counters in the same shape argmin reports them.
    pub fn evaluations(&self) -> FnEvalMap {
        let state = self.inner.borrow();
        let mut counts = FnEvalMap::new();
        counts.insert("cost_count".to_string(), state.cost_evals);
        counts.insert("gradient_count".to_string(), state.gradient_evals);
        counts
    }
}

/// Counts completed solver iterations across runs.
///
/// Attached to each executor as an observer; clones share one counter, so
/// iterations of an aborted run are still counted after its state is gone.
#[derive(Debug, Clone, Default)]
pub struct IterationCounter {
    count: Arc<AtomicU64>,
}

impl IterationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl<I: State> Observe<I> for IterationCounter {
    fn observe_iter(&mut self, _state: &I, _kv: &KV) -> Result<(), Error> {
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Bridges a [`NegLogLikelihood`] to `argmin`'s `CostFunction` and `Gradient`.
pub struct ArgMinAdapter<'a, F: NegLogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
    pub tracker: &'a IterateTracker,
}

impl<'a, F: NegLogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `c(θ)` and record it with the tracker.
    ///
    /// # Errors
    /// - Propagates any `OptError` from the model's `nll`.
    /// - `OptError::NonFiniteCost` if the value is `NaN` or infinite.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.nll(theta, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        self.tracker.record(theta, output);
        Ok(output)
    }
}

impl<'a, F: NegLogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate `∇c(θ)`.
    ///
    /// Uses the model's analytic gradient when available; on
    /// `GradientNotImplemented` falls back to finite differences of the cost.
    ///
    /// # Errors
    /// - Propagates model errors other than `GradientNotImplemented`.
    /// - Returns validation errors for wrong-length or non-finite gradients.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        self.tracker.record_gradient();
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(g)
            }
            Err(OptError::GradientNotImplemented) => {
                Ok(fd_gradient(theta, |x: &Theta| self.cost(x))?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl<'a, F: NegLogLikelihood> ArgMinAdapter<'a, F> {
    /// Construct a new adapter over a model, its data, and a tracker.
    pub fn new(f: &'a F, data: &'a F::Data, tracker: &'a IterateTracker) -> Self {
        Self { f, data, tracker }
    }
}
