//! Core building blocks for TARCH-X models.
//!
//! - [`data`]: validated returns plus exogenous design and sample moments.
//! - [`exog`]: tagged exogenous columns and tag aggregation.
//! - [`params`]: fixed-layout parameter vector.
//! - [`bounds`]: box bounds, stationarity threshold, feasibility check.
//! - [`options`]: estimation options and starting values.
//! - [`transform`]: θ ↔ parameter map with its Jacobian.
//! - [`filter`]: the conditional variance recursion.
//! - [`likelihood`]: Student-t negative log-likelihood and gradient.
pub mod bounds;
pub mod data;
pub mod exog;
pub mod filter;
pub mod likelihood;
pub mod options;
pub mod params;
pub mod transform;

pub use self::bounds::{Interval, ParamBounds};
pub use self::data::TarchData;
pub use self::exog::{AggregationRule, ExogColumn, ExogMatrix, ExogTag};
pub use self::filter::{FilterOutput, variance_filter};
pub use self::likelihood::{negative_log_likelihood, nll_with_gradient};
pub use self::options::{ExogFallback, GradientMode, StartValues, TarchOptions};
pub use self::params::TarchParams;
pub use self::transform::ParamTransform;
