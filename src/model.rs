//! High-level wrapper that owns one parameter set and the solution computed from it.

use crate::continuous::{solve_continuous, ContinuousSolution};
use crate::discrete::{solve_discrete, DiscreteSolution};
use crate::error::Result;
use crate::estimation::{estimate, EstimationResult};
use crate::options::{SolveMethod, SolverOptions};
use crate::parameters::Parameters;
use crate::regression::{run_regression, RegressionResult};
use crate::study::{alpha_sigma_table, ParameterStudy};
use crate::sweep::{fill_wage_sweep, Solution};
use crate::utility::{utility, Allocation};

/// A household specialization model: configuration, solver options, and sweep output.
///
/// Instances share nothing; each owns its own [`Parameters`] and [`Solution`].
#[derive(Clone, Debug)]
pub struct HouseholdModel {
    parameters: Parameters,
    options: SolverOptions,
    solution: Solution,
}

impl Default for HouseholdModel {
    fn default() -> Self {
        Self::new()
    }
}

impl HouseholdModel {
    /// Creates a model with the reference parameters and default solver options.
    pub fn new() -> Self {
        Self::with_parameters(Parameters::default())
    }

    /// Creates a model from explicit parameters.
    pub fn with_parameters(parameters: Parameters) -> Self {
        let solution = Solution::zeros(parameters.wf_vec.len());
        Self {
            parameters,
            options: SolverOptions::default(),
            solution,
        }
    }

    /// Replaces the solver options.
    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Mutable access to the parameters. Changing `wf_vec` invalidates the stored solution,
    /// which is resized by the next sweep.
    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Output of the most recent sweep and regression.
    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// Utility of `allocation` under the current parameters.
    pub fn calc_utility(&self, allocation: &Allocation) -> Result<f64> {
        self.parameters.validate()?;
        Ok(utility(&self.parameters, allocation))
    }

    /// Solves on the half-hour grid for the current wages.
    pub fn solve_discrete(&self) -> Result<DiscreteSolution> {
        solve_discrete(&self.parameters, &self.options.grid)
    }

    /// Solves continuously for the current wages.
    pub fn solve(&self) -> Result<ContinuousSolution> {
        solve_continuous(&self.parameters, &self.options.continuous)
    }

    /// Solves for every female wage in `wf_vec` and stores the allocations.
    ///
    /// Afterwards the model's own `wf` equals the last wage visited.
    pub fn solve_wage_sweep(&mut self, method: SolveMethod) -> Result<&Solution> {
        if self.solution.len() != self.parameters.wf_vec.len() {
            self.solution = Solution::zeros(self.parameters.wf_vec.len());
        }
        fill_wage_sweep(&self.parameters, method, &self.options, &mut self.solution)?;
        if let Some(&last) = self.parameters.wf_vec.last() {
            self.parameters.wf = last;
        }
        Ok(&self.solution)
    }

    /// Regresses `log(HF/HM)` on `log(wF/wM)` over the stored sweep.
    pub fn run_regression(&mut self) -> Result<RegressionResult> {
        run_regression(&self.parameters, &mut self.solution)
    }

    /// Calibrates the free subset of `alpha`/`sigma` to the regression targets and adopts
    /// the estimates.
    pub fn estimate(&mut self, alpha: Option<f64>, sigma: Option<f64>) -> Result<EstimationResult> {
        let result = estimate(&self.parameters, alpha, sigma, &self.options)?;
        self.parameters.alpha = result.alpha;
        self.parameters.sigma = result.sigma;
        Ok(result)
    }

    /// Tabulates the discrete optimum over `alphas` x `sigmas`.
    pub fn study(&self, alphas: &[f64], sigmas: &[f64]) -> Result<ParameterStudy> {
        alpha_sigma_table(&self.parameters, alphas, sigmas, &self.options.grid)
    }
}
