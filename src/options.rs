//! Configuration structures for the discrete, continuous, and estimation solvers.

use serde::{Deserialize, Serialize};

use crate::utility::TIME_BUDGET;

/// Which solver a sweep or estimation should call for each wage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveMethod {
    /// Exhaustive search over the half-hour grid.
    Discrete,
    /// Projected-gradient search over the continuous feasible set.
    #[default]
    Continuous,
}

/// Controls the exhaustive grid search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridOptions {
    /// Number of evenly spaced points per axis, endpoints included.
    pub points: usize,
    /// Upper end of every axis; the lower end is zero.
    pub upper: f64,
    /// Evaluate `LM` slices on the rayon pool instead of the calling thread.
    pub parallel: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            points: 49,
            upper: TIME_BUDGET,
            parallel: false,
        }
    }
}

impl GridOptions {
    /// Grid value at axis index `i`.
    #[inline]
    pub fn value(&self, i: usize) -> f64 {
        self.upper * i as f64 / (self.points - 1) as f64
    }

    /// Number of candidate allocations visited by one solve.
    pub fn candidate_count(&self) -> usize {
        self.points.pow(4)
    }

    pub fn with_points(mut self, points: usize) -> Self {
        self.points = points;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Configuration for the projected-gradient continuous solver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContinuousOptions {
    /// Infinity-norm tolerance on the projected gradient.
    pub tolerance: f64,
    /// Maximum number of iterations allowed before reporting non-convergence.
    pub max_iterations: usize,
    /// Step used for finite-difference gradients.
    pub fd_step: f64,
    /// Starting point `[LM, HM, LF, HF]`; must be feasible.
    pub initial_guess: [f64; 4],
    /// Sufficient-decrease constant of the Armijo line search.
    pub armijo: f64,
    /// Number of past objective values the non-monotone line search compares against.
    pub memory: usize,
}

impl Default for ContinuousOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 10_000,
            fd_step: 1e-6,
            initial_guess: [8.0; 4],
            armijo: 1e-4,
            memory: 10,
        }
    }
}

impl ContinuousOptions {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_initial_guess(mut self, initial_guess: [f64; 4]) -> Self {
        self.initial_guess = initial_guess;
        self
    }
}

/// Controls the calibration of `alpha` and `sigma` to the regression targets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimationOptions {
    /// Solver used for every wage in every objective evaluation.
    pub method: SolveMethod,
    /// Simplex size (in parameter units) below which the search stops.
    pub tolerance: f64,
    /// Maximum number of Nelder-Mead iterations.
    pub max_iterations: usize,
    /// Starting value for a free `alpha`.
    pub initial_alpha: f64,
    /// Starting value for a free `sigma`.
    pub initial_sigma: f64,
}

impl Default for EstimationOptions {
    fn default() -> Self {
        Self {
            method: SolveMethod::Continuous,
            tolerance: 1e-4,
            max_iterations: 200,
            initial_alpha: 0.5,
            initial_sigma: 1.0,
        }
    }
}

impl EstimationOptions {
    pub fn with_method(mut self, method: SolveMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Aggregated solver configuration held by a [`HouseholdModel`](crate::HouseholdModel).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    pub grid: GridOptions,
    pub continuous: ContinuousOptions,
    pub estimation: EstimationOptions,
}

impl SolverOptions {
    /// Override the grid settings while preserving other defaults.
    pub fn with_grid(mut self, grid: GridOptions) -> Self {
        self.grid = grid;
        self
    }

    /// Override the continuous solver settings while preserving other defaults.
    pub fn with_continuous(mut self, continuous: ContinuousOptions) -> Self {
        self.continuous = continuous;
        self
    }

    /// Override the estimation settings while preserving other defaults.
    pub fn with_estimation(mut self, estimation: EstimationOptions) -> Self {
        self.estimation = estimation;
        self
    }
}
