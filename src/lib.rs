//! Household specialization model: how a two-person household splits its time between
//! market work and home production.
//!
//! Each partner has 24 hours to divide between market work (`L`) and home production
//! (`H`). Market work buys consumption at the partner's wage, home hours are combined
//! by a CES technology, and the household maximizes the utility of the composite good
//! net of the disutility of total work. The crate offers
//!
//! - the utility function and its home-production variants (`utility`, `parameters`),
//! - an exhaustive half-hour grid solver (`discrete`),
//! - a projected-gradient continuous solver (`continuous`),
//! - a female-wage sensitivity sweep and the log-log regression on its output
//!   (`sweep`, `regression`),
//! - comparative statics over `alpha` and `sigma` and calibration of those parameters
//!   to target regression coefficients (`study`, `estimation`).
//!
//! # Quick start
//!
//! ```no_run
//! use hsmodel::{HouseholdModel, Parameters, SolveMethod};
//!
//! let params = Parameters::default().with_alpha(0.5).with_sigma(1.0);
//! let mut model = HouseholdModel::with_parameters(params);
//!
//! let discrete = model.solve_discrete().expect("valid parameters");
//! let continuous = model.solve().expect("optimizer converged");
//! println!("grid: {:?}, continuous: {:?}", discrete.allocation, continuous.allocation);
//!
//! model.solve_wage_sweep(SolveMethod::Continuous).expect("sweep solved");
//! let fit = model.run_regression().expect("positive home production");
//! println!("beta0 = {:.3}, beta1 = {:.3}", fit.beta0, fit.beta1);
//! ```
//!
//! Results are plain numeric vectors and `serde`-serializable structs, so plotting or
//! reporting layers can consume them directly.

pub mod continuous;
pub mod discrete;
pub mod error;
pub mod estimation;
pub mod model;
pub mod options;
pub mod parameters;
pub mod regression;
pub mod study;
pub mod sweep;
pub mod utility;

pub use continuous::{ContinuousSolution, OptimizationSummary};
pub use discrete::DiscreteSolution;
pub use error::{ModelError, Result};
pub use estimation::EstimationResult;
pub use model::HouseholdModel;
pub use options::{ContinuousOptions, EstimationOptions, GridOptions, SolveMethod, SolverOptions};
pub use parameters::{HomeProduction, Parameters};
pub use regression::RegressionResult;
pub use study::ParameterStudy;
pub use sweep::Solution;
pub use utility::Allocation;
