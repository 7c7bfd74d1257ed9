//! loglik_optimizer::finite_diff — finite-difference gradients with error capture.
//!
//! Purpose
//! -------
//! Provide finite-difference gradients of a fallible cost so the adapter can
//! serve objectives that do not implement an analytic gradient, without
//! depending directly on the `finitediff` API elsewhere.
//!
//! Key behaviors
//! -------------
//! - [`fd_gradient`] tries central differences first and falls back to
//!   forward differences when a cost evaluation failed or the central
//!   estimate is not finite.
//! - Errors raised by the cost during differencing are captured in a
//!   `RefCell` slot (the `finitediff` closure must return `f64`) and
//!   re-raised after the sweep.
//!
//! Invariants & assumptions
//! ------------------------
//! - Differences are taken in the unconstrained θ-space.
//! - Returned gradients always satisfy [`validate_grad`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{Grad, Theta, validation::validate_grad},
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Finite-difference gradient of a fallible cost at `theta`.
///
/// Parameters
/// ----------
/// - `theta`: point at which to differentiate.
/// - `cost`: fallible cost function.
///
/// Errors
/// ------
/// - The first error raised by `cost` on the forward-difference path.
/// - `OptError::InvalidGradient` if neither stencil yields a finite gradient.
pub fn fd_gradient<C>(theta: &Theta, cost: C) -> OptResult<Grad>
where
    C: Fn(&Theta) -> Result<f64, Error>,
{
    let closure_err: RefCell<Option<Error>> = RefCell::new(None);
    let capture = |x: &Theta| -> f64 {
        match cost(x) {
            Ok(val) => val,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let central = theta.central_diff(&capture);
    if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
        return Ok(central);
    }
    run_fd_diff(theta, &capture, &closure_err)
}

/// Forward-difference gradient with error capture.
///
/// Clears `closure_err`, differentiates, and returns any captured error
/// before validating the result.
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Central-difference gradients on a smooth quadratic.
    // - The forward-difference fallback when the cost fails on one side.
    // - Propagation of errors that persist on the forward path.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify `fd_gradient` on a quadratic with a known gradient.
    //
    // Given
    // -----
    // - `c(θ) = θ₀² + 3θ₁²` at θ = (1, -2).
    //
    // Expect
    // ------
    // - Gradient ≈ (2, -12).
    fn fd_gradient_matches_quadratic() {
        // Arrange
        let theta = array![1.0, -2.0];
        let cost = |x: &Theta| -> Result<f64, Error> { Ok(x[0] * x[0] + 3.0 * x[1] * x[1]) };

        // Act
        let grad = fd_gradient(&theta, cost).expect("gradient should succeed");

        // Assert
        assert_abs_diff_eq!(grad[0], 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(grad[1], -12.0, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Ensure a failure below θ₀ triggers the forward-difference fallback.
    //
    // Given
    // -----
    // - A cost that errors whenever θ₀ < 0.5 evaluated at θ₀ = 0.5.
    //
    // Expect
    // ------
    // - A finite gradient computed from forward differences.
    fn fd_gradient_falls_back_to_forward_differences() {
        // Arrange
        let theta = array![0.5];
        let cost = |x: &Theta| -> Result<f64, Error> {
            if x[0] < 0.5 {
                Err(OptError::NonFiniteCost { value: f64::NAN }.into())
            } else {
                Ok(x[0] * x[0])
            }
        };

        // Act
        let grad = fd_gradient(&theta, cost).expect("forward path should succeed");

        // Assert
        assert_abs_diff_eq!(grad[0], 1.0, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Ensure errors on every evaluation are surfaced rather than masked.
    //
    // Given
    // -----
    // - A cost that always fails.
    //
    // Expect
    // ------
    // - `fd_gradient` returns the captured `OptError`.
    fn fd_gradient_propagates_persistent_errors() {
        // Arrange
        let theta = array![0.0, 0.0];
        let cost = |_: &Theta| -> Result<f64, Error> {
            Err(OptError::NonFiniteCost { value: f64::INFINITY }.into())
        };

        // Act
        let res = fd_gradient(&theta, cost);

        // Assert
        assert_eq!(res, Err(OptError::NonFiniteCost { value: f64::INFINITY }));
    }
}
