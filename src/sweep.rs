//! Female-wage sensitivity sweep and the solution vectors it fills.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::continuous::solve_continuous;
use crate::discrete::solve_discrete;
use crate::error::{ModelError, Result};
use crate::options::{SolveMethod, SolverOptions};
use crate::parameters::Parameters;
use crate::utility::Allocation;

/// Optimal hours for every wage in `wf_vec`, plus the regression coefficients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub lm_vec: DVector<f64>,
    pub hm_vec: DVector<f64>,
    pub lf_vec: DVector<f64>,
    pub hf_vec: DVector<f64>,
    /// Intercept of `log(HF/HM)` on `log(wF/wM)`; NaN until a regression has run.
    pub beta0: f64,
    /// Slope of `log(HF/HM)` on `log(wF/wM)`; NaN until a regression has run.
    pub beta1: f64,
}

impl Solution {
    /// Zero-filled vectors of length `len` and unset coefficients.
    pub fn zeros(len: usize) -> Self {
        Self {
            lm_vec: DVector::zeros(len),
            hm_vec: DVector::zeros(len),
            lf_vec: DVector::zeros(len),
            hf_vec: DVector::zeros(len),
            beta0: f64::NAN,
            beta1: f64::NAN,
        }
    }

    /// Number of wage scenarios held.
    pub fn len(&self) -> usize {
        self.lm_vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lm_vec.is_empty()
    }

    /// Allocation stored at wage index `index`.
    pub fn allocation(&self, index: usize) -> Allocation {
        Allocation::new(
            self.lm_vec[index],
            self.hm_vec[index],
            self.lf_vec[index],
            self.hf_vec[index],
        )
    }

    /// Writes `allocation` into wage index `index`.
    pub fn set_allocation(&mut self, index: usize, allocation: &Allocation) {
        self.lm_vec[index] = allocation.lm;
        self.hm_vec[index] = allocation.hm;
        self.lf_vec[index] = allocation.lf;
        self.hf_vec[index] = allocation.hf;
    }

    /// Relative home production `HF/HM` for every wage.
    pub fn home_ratios(&self) -> DVector<f64> {
        self.hf_vec.component_div(&self.hm_vec)
    }
}

/// Solves once with the requested method and returns the optimal allocation and utility.
pub fn solve_with(
    params: &Parameters,
    method: SolveMethod,
    options: &SolverOptions,
) -> Result<(Allocation, f64)> {
    match method {
        SolveMethod::Discrete => {
            let solution = solve_discrete(params, &options.grid)?;
            Ok((solution.allocation, solution.utility))
        }
        SolveMethod::Continuous => {
            let solution = solve_continuous(params, &options.continuous)?;
            Ok((solution.allocation, solution.utility))
        }
    }
}

/// Solves the model for every female wage in `params.wf_vec`, in order.
///
/// Each wage gets its own parameter snapshot; `params` itself is never modified.
pub fn solve_wage_sweep(
    params: &Parameters,
    method: SolveMethod,
    options: &SolverOptions,
) -> Result<Solution> {
    let mut solution = Solution::zeros(params.wf_vec.len());
    fill_wage_sweep(params, method, options, &mut solution)?;
    Ok(solution)
}

/// Like [`solve_wage_sweep`] but writes into an existing [`Solution`].
///
/// Previously stored regression coefficients are reset, since they no longer describe
/// the stored allocations.
pub fn fill_wage_sweep(
    params: &Parameters,
    method: SolveMethod,
    options: &SolverOptions,
    solution: &mut Solution,
) -> Result<()> {
    params.validate()?;
    if solution.len() != params.wf_vec.len() {
        return Err(ModelError::dimension_mismatch(
            "solution length",
            params.wf_vec.len(),
            solution.len(),
        ));
    }

    solution.beta0 = f64::NAN;
    solution.beta1 = f64::NAN;

    for (index, &wf) in params.wf_vec.iter().enumerate() {
        let snapshot = params.with_female_wage(wf);
        let (allocation, utility) = solve_with(&snapshot, method, options)?;
        log::debug!(
            "wage sweep {}/{}: wF = {:.4} -> {:?} (utility {:.6})",
            index + 1,
            params.wf_vec.len(),
            wf,
            allocation,
            utility
        );
        solution.set_allocation(index, &allocation);
    }
    Ok(())
}
