//! Comparative statics of relative home production over `alpha` and `sigma`.

use serde::{Deserialize, Serialize};

use crate::discrete::solve_discrete;
use crate::error::{ModelError, Result};
use crate::options::GridOptions;
use crate::parameters::Parameters;
use crate::utility::Allocation;

/// `alpha` values tabulated by default.
pub const DEFAULT_ALPHAS: [f64; 3] = [0.25, 0.50, 0.75];

/// `sigma` values tabulated by default.
pub const DEFAULT_SIGMAS: [f64; 3] = [0.5, 1.0, 1.5];

/// Discrete optimum for one `(alpha, sigma)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudyCell {
    pub alpha: f64,
    pub sigma: f64,
    pub allocation: Allocation,
    /// `HF/HM` at the optimum; `+inf` when the male partner does no home production.
    pub home_ratio: f64,
}

/// Row-major table of [`StudyCell`]s, one row per `alpha`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterStudy {
    pub alphas: Vec<f64>,
    pub sigmas: Vec<f64>,
    pub cells: Vec<StudyCell>,
}

impl ParameterStudy {
    /// Cell for `alphas[i]` and `sigmas[j]`.
    pub fn cell(&self, i: usize, j: usize) -> &StudyCell {
        &self.cells[i * self.sigmas.len() + j]
    }

    /// `HF/HM` for `alphas[i]` and `sigmas[j]`.
    pub fn ratio(&self, i: usize, j: usize) -> f64 {
        self.cell(i, j).home_ratio
    }
}

/// Solves the model on the grid for every combination of `alphas` and `sigmas`.
///
/// All other parameters are taken from `params`.
pub fn alpha_sigma_table(
    params: &Parameters,
    alphas: &[f64],
    sigmas: &[f64],
    grid: &GridOptions,
) -> Result<ParameterStudy> {
    if alphas.is_empty() {
        return Err(ModelError::dimension_mismatch("alpha values", 1, 0));
    }
    if sigmas.is_empty() {
        return Err(ModelError::dimension_mismatch("sigma values", 1, 0));
    }

    let mut cells = Vec::with_capacity(alphas.len() * sigmas.len());
    for &alpha in alphas {
        for &sigma in sigmas {
            let snapshot = params.clone().with_alpha(alpha).with_sigma(sigma);
            let allocation = solve_discrete(&snapshot, grid)?.allocation;
            let home_ratio = if allocation.hm > 0.0 {
                allocation.home_ratio()
            } else {
                f64::INFINITY
            };
            cells.push(StudyCell {
                alpha,
                sigma,
                allocation,
                home_ratio,
            });
        }
    }

    Ok(ParameterStudy {
        alphas: alphas.to_vec(),
        sigmas: sigmas.to_vec(),
        cells,
    })
}
