//! Executor wrapper shared by both line-search variants.
//!
//! Seeds the `argmin` state with the starting θ and the iteration cap, runs
//! the solver, and turns the final state into a validated [`OptimOutcome`].
//! Every run reports its iterations to a shared [`IterationCounter`].
//! With the `obs_slog` feature and `verbose = true` the starting objective is
//! logged and a terminal slog observer follows every iteration.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, MLEOptions, NegLogLikelihood, OptimOutcome, Theta,
        adapter::{ArgMinAdapter, IterationCounter},
    },
};
use argmin::core::{Executor, IterState, Solver, State, observers::ObserverMode};
use log::debug;

type LbfgsState = IterState<Theta, Grad, (), (), (), f64>;

/// Run `solver` from `theta0` on the wrapped likelihood.
///
/// # Errors
/// - Any `argmin` runtime error, converted through `From<argmin::core::Error>`.
/// - Validation failures of the final state (missing or non-finite θ̂,
///   non-finite cost or gradient).
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
    counter: &IterationCounter,
) -> OptResult<OptimOutcome>
where
    F: NegLogLikelihood,
    S: Solver<ArgMinAdapter<'a, F>, LbfgsState> + Send + 'static,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        observe::log_start(&theta0, &problem)?;
    }

    let max_iter = opts.tols.max_iter.map(|m| m as u64);
    let executor = Executor::new(problem, solver)
        .configure(|state| {
            let state = state.param(theta0);
            match max_iter {
                Some(cap) => state.max_iters(cap),
                None => state,
            }
        })
        .add_observer(counter.clone(), ObserverMode::Always);
    #[cfg(feature = "obs_slog")]
    let executor = observe::attach(executor, opts.verbose);

    let finished = executor.run()?;
    let outcome = into_outcome(finished.state().clone())?;
    debug!(
        "L-BFGS stopped at iteration {} with cost {:.8}: {}",
        outcome.iterations, outcome.value, outcome.status
    );
    Ok(outcome)
}

fn into_outcome(mut state: LbfgsState) -> OptResult<OptimOutcome> {
    let grad = state.take_gradient();
    let theta_hat = state.take_best_param();
    OptimOutcome::new(
        theta_hat,
        state.get_best_cost(),
        state.get_termination_status().clone(),
        state.get_iter(),
        state.get_func_counts().clone(),
        grad,
    )
}

#[cfg(feature = "obs_slog")]
mod observe {
    use super::*;
    use argmin::core::{CostFunction, Gradient, observers::ObserverMode};
    use argmin_math::ArgminL2Norm;
    use argmin_observer_slog::SlogLogger;

    pub(super) fn log_start<F: NegLogLikelihood>(
        theta0: &Theta, problem: &ArgMinAdapter<'_, F>,
    ) -> OptResult<()> {
        let cost = problem.cost(theta0)?;
        match problem.gradient(theta0) {
            Ok(g) => log::info!("start: cost {cost:.6}, |grad| {:.6}", g.l2_norm()),
            Err(_) => log::info!("start: cost {cost:.6}"),
        }
        Ok(())
    }

    pub(super) fn attach<O, S>(
        executor: Executor<O, S, LbfgsState>, verbose: bool,
    ) -> Executor<O, S, LbfgsState> {
        if verbose {
            executor.add_observer(SlogLogger::term_noblock(), ObserverMode::Always)
        } else {
            executor
        }
    }
}
