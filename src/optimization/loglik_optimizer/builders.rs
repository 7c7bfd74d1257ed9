//! loglik_optimizer::builders — L-BFGS solver construction helpers.
//!
//! Purpose
//! -------
//! Build L-BFGS solvers with either line search and apply the tolerances
//! from [`MLEOptions`], hiding Argmin's generic wiring from the runner.
//!
//! Conventions
//! -----------
//! - The builders do **not** set `theta0` or `max_iters`; those are runtime
//!   concerns applied in `run_lbfgs`.
//! - Invalid tolerances rejected by Argmin surface as [`OptError`](crate::optimization::errors::OptError)
//!   through the crate's `From<argmin::core::Error>` conversion.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// L-BFGS with Hager–Zhang line search.
///
/// Uses `opts.lbfgs_mem` (default [`DEFAULT_LBFGS_MEM`]) and any
/// tolerances present in `opts.tols`.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with More–Thuente line search.
///
/// Uses `opts.lbfgs_mem` (default [`DEFAULT_LBFGS_MEM`]) and any
/// tolerances present in `opts.tols`.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply the optional gradient and cost-change tolerances to a solver.
///
/// # Errors
/// - `OptError` converted from Argmin when a tolerance is rejected.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::traits::{LineSearcher, Tolerances};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover solver construction for both line searches with the
    // default options and with an explicit memory and partial tolerances.
    // End-to-end runs are covered in `api`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Both builders accept the crate defaults.
    //
    // Given
    // -----
    // - `MLEOptions::default()` (grad and cost tolerances, default memory).
    //
    // Expect
    // ------
    // - Both builders return `Ok(_)`.
    fn builders_accept_default_options() {
        // Arrange
        let opts = MLEOptions::default();

        // Act / Assert
        assert!(build_optimizer_more_thuente(&opts).is_ok());
        assert!(build_optimizer_hager_zhang(&opts).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Builders accept an explicit memory and a cap-only tolerance set.
    //
    // Given
    // -----
    // - Tolerances with only `max_iter` and `lbfgs_mem = Some(3)`.
    //
    // Expect
    // ------
    // - Both builders return `Ok(_)`.
    fn builders_accept_explicit_memory_without_tolerances() {
        // Arrange
        let tols = Tolerances::new(None, None, Some(5)).expect("Tolerances should be valid");
        let opts = MLEOptions::new(tols, LineSearcher::HagerZhang, false, Some(3))
            .expect("MLEOptions should be valid");

        // Act / Assert
        assert!(build_optimizer_hager_zhang(&opts).is_ok());
        assert!(build_optimizer_more_thuente(&opts).is_ok());
    }
}
