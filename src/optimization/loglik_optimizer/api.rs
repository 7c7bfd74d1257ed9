//! High-level entry point for minimizing a [`NegLogLikelihood`].
//!
//! Selects an L-BFGS solver with either Hager–Zhang or More–Thuente line
//! search, wraps the model in an `ArgMinAdapter`, and delegates the run to
//! `run_lbfgs`. When the backend aborts mid-run the best iterate seen so far
//! is recovered and the solve is restarted once with the other line search;
//! if that also aborts, a non-converged best-effort outcome is returned
//! instead of an error.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        FnEvalMap, OptimOutcome, Theta,
        adapter::{ArgMinAdapter, IterateTracker, IterationCounter},
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, MLEOptions, NegLogLikelihood},
    },
};
use log::warn;

/// Result of a single solver attempt.
enum Attempt {
    Finished(OptimOutcome),
    Aborted(OptError),
}

/// Minimize `c(θ)` using L-BFGS with the configured line search.
///
/// # Behavior
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - Runs L-BFGS from `theta0`. Normal termination (converged or iteration
///   cap) is returned as is; `converged` is `false` for the latter.
/// - On a runtime backend error, restarts once from the best iterate with the
///   alternate line search. `restarts` in the outcome records this.
/// - If the restart also aborts, returns the best iterate with
///   `converged = false` and `reason = Aborted`.
/// - After a restart, `iterations` and `fn_evals` cover both attempts.
///
/// # Errors
/// - Propagates any error from `f.check`.
/// - Propagates builder errors from `build_optimizer_*`.
/// - Propagates configuration-type errors raised by the model during the
///   run (e.g. a theta length mismatch), and runtime errors raised before
///   any finite cost was recorded.
///
/// # Example
/// ```
/// use ndarray::array;
/// use rust_tarchx::optimization::errors::OptResult;
/// use rust_tarchx::optimization::loglik_optimizer::{
///     Cost, MLEOptions, NegLogLikelihood, Theta, minimize,
/// };
///
/// struct Bowl;
/// impl NegLogLikelihood for Bowl {
///     type Data = ();
///     fn nll(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
///         Ok(theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = minimize(&Bowl, array![0.5, -0.3], &(), &MLEOptions::default())?;
/// assert!(out.converged);
/// # Ok::<(), rust_tarchx::optimization::errors::OptError>(())
/// ```
pub fn minimize<F: NegLogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let tracker = IterateTracker::new();
    let counter = IterationCounter::new();

    let first_err = match attempt(f, theta0, data, opts, opts.line_searcher, &tracker, &counter)? {
        Attempt::Finished(outcome) => return Ok(outcome),
        Attempt::Aborted(err) => err,
    };
    if !first_err.is_runtime_failure() {
        return Err(first_err);
    }
    let Some((theta_best, _)) = tracker.best() else {
        return Err(first_err);
    };

    let fallback = opts.line_searcher.alternate();
    warn!(
        "L-BFGS ({:?}) aborted: {first_err}; restarting from best iterate with {:?}",
        opts.line_searcher, fallback
    );
    let mut outcome = match attempt(f, theta_best, data, opts, fallback, &tracker, &counter)? {
        Attempt::Finished(mut outcome) => {
            outcome.restarts = 1;
            outcome
        }
        Attempt::Aborted(err) if err.is_runtime_failure() => {
            warn!("L-BFGS restart aborted: {err}; returning best iterate as non-converged");
            let Some((theta, cost)) = tracker.best() else {
                return Err(err);
            };
            OptimOutcome::aborted(theta, cost, &err, FnEvalMap::new(), 1)?
        }
        Attempt::Aborted(err) => return Err(err),
    };
    outcome.iterations = counter.total() as usize;
    outcome.fn_evals = tracker.evaluations();
    Ok(outcome)
}

// ---- Helper Methods ----

fn attempt<F: NegLogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions, searcher: LineSearcher,
    tracker: &IterateTracker, counter: &IterationCounter,
) -> OptResult<Attempt> {
    let problem = ArgMinAdapter::new(f, data, tracker);
    let run = match searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver, counter)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver, counter)
        }
    };
    Ok(match run {
        Ok(outcome) => Attempt::Finished(outcome),
        Err(err) => Attempt::Aborted(err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::{
        Cost, Grad,
        traits::{StopReason, Tolerances},
    };
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Convergence on a smooth convex objective with both line searches.
    // - Soft reporting of the iteration cap (no error, converged = false).
    // - Early rejection through `check`.
    // - Restart after a mid-run failure and counters spanning both attempts.
    // -------------------------------------------------------------------------

    /// Anisotropic quadratic bowl: Σ wᵢ (θᵢ − cᵢ)².
    struct Bowl {
        center: Array1<f64>,
        weights: Array1<f64>,
    }

    impl NegLogLikelihood for Bowl {
        type Data = ();

        fn nll(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            let d = theta - &self.center;
            Ok((&self.weights * &d * &d).sum())
        }

        fn check(&self, theta: &Theta, _: &()) -> OptResult<()> {
            if theta.len() != self.center.len() {
                return Err(OptError::ThetaLengthMismatch {
                    expected: self.center.len(),
                    actual: theta.len(),
                });
            }
            Ok(())
        }

        fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
            Ok(2.0 * &self.weights * (theta - &self.center))
        }
    }

    /// Bowl whose cost fails exactly once, on evaluation `fail_at`.
    struct FlakyBowl {
        inner: Bowl,
        fail_at: usize,
        calls: std::cell::Cell<usize>,
    }

    impl NegLogLikelihood for FlakyBowl {
        type Data = ();

        fn nll(&self, theta: &Theta, data: &()) -> OptResult<Cost> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if call == self.fail_at {
                return Err(OptError::NonFiniteCost { value: f64::NAN });
            }
            self.inner.nll(theta, data)
        }

        fn check(&self, theta: &Theta, data: &()) -> OptResult<()> {
            self.inner.check(theta, data)
        }

        fn grad(&self, theta: &Theta, data: &()) -> OptResult<Grad> {
            self.inner.grad(theta, data)
        }
    }

    fn bowl() -> Bowl {
        Bowl { center: array![1.0, -2.0, 0.5], weights: array![1.0, 10.0, 0.1] }
    }

    #[test]
    // Purpose
    // -------
    // Both line searches find the minimum of a convex bowl.
    //
    // Given
    // -----
    // - An anisotropic quadratic with minimum at (1, -2, 0.5).
    //
    // Expect
    // ------
    // - `converged == true`, θ̂ ≈ center, cost ≈ 0, no restarts.
    fn minimize_converges_with_both_line_searches() {
        for searcher in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            // Arrange
            let opts = MLEOptions { line_searcher: searcher, ..MLEOptions::default() };

            // Act
            let out = minimize(&bowl(), array![0.0, 0.0, 0.0], &(), &opts)
                .expect("minimize should succeed");

            // Assert
            assert!(out.converged, "{searcher:?} should converge: {}", out.status);
            assert_eq!(out.reason, StopReason::Converged);
            assert_eq!(out.restarts, 0);
            assert_abs_diff_eq!(out.theta_hat[0], 1.0, epsilon = 1e-4);
            assert_abs_diff_eq!(out.theta_hat[1], -2.0, epsilon = 1e-4);
            assert_abs_diff_eq!(out.theta_hat[2], 0.5, epsilon = 1e-3);
            assert!(out.value < 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // Reaching the iteration cap is reported, not raised.
    //
    // Given
    // -----
    // - `max_iter = 1` and tolerances that cannot be met in one step.
    //
    // Expect
    // ------
    // - `Ok(outcome)` with `converged == false` and `MaxIterations`.
    fn minimize_reports_iteration_cap_softly() {
        // Arrange
        let tols = Tolerances::new(Some(1e-14), None, Some(1)).expect("valid tolerances");
        let opts = MLEOptions::new(tols, LineSearcher::MoreThuente, false, None)
            .expect("valid options");

        // Act
        let out = minimize(&bowl(), array![5.0, 5.0, 5.0], &(), &opts)
            .expect("iteration cap must not be an error");

        // Assert
        assert!(!out.converged);
        assert_eq!(out.reason, StopReason::MaxIterations);
    }

    #[test]
    // Purpose
    // -------
    // `check` failures abort before any solver work.
    //
    // Given
    // -----
    // - A starting vector of the wrong length.
    //
    // Expect
    // ------
    // - `OptError::ThetaLengthMismatch`.
    fn minimize_rejects_invalid_start() {
        // Act
        let res = minimize(&bowl(), array![0.0], &(), &MLEOptions::default());

        // Assert
        assert_eq!(res, Err(OptError::ThetaLengthMismatch { expected: 3, actual: 1 }));
    }

    #[test]
    // Purpose
    // -------
    // A failure in the middle of a run triggers one restart, and the
    // reported counters include the aborted attempt.
    //
    // Given
    // -----
    // - A bowl whose sixth cost evaluation fails.
    //
    // Expect
    // ------
    // - Convergence with `restarts == 1`.
    // - `cost_count` equal to every successful evaluation across both runs.
    fn restart_counters_cover_both_attempts() {
        // Arrange
        let model = FlakyBowl { inner: bowl(), fail_at: 6, calls: std::cell::Cell::new(0) };

        // Act
        let out = minimize(&model, array![4.0, 4.0, 4.0], &(), &MLEOptions::default())
            .expect("restart should recover");

        // Assert
        assert!(out.converged, "{}", out.status);
        assert_eq!(out.restarts, 1);
        assert_eq!(out.fn_evals["cost_count"] as usize, model.calls.get() - 1);
        assert!(out.iterations >= 1);
    }
}
