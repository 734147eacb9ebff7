//! Log-log regression of relative home production on relative wages.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::parameters::Parameters;
use crate::sweep::Solution;

/// Coefficients of `log(HF/HM) = beta0 + beta1 * log(wF/wM)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub beta0: f64,
    pub beta1: f64,
    /// Sum of squared residuals at the fitted coefficients.
    pub residual_sum_of_squares: f64,
}

impl RegressionResult {
    /// Squared distance to `(beta0_target, beta1_target)`.
    pub fn target_distance(&self, params: &Parameters) -> f64 {
        (params.beta0_target - self.beta0).powi(2) + (params.beta1_target - self.beta1).powi(2)
    }
}

/// Fits the regression on a solved sweep and stores `beta0`/`beta1` in `solution`.
pub fn run_regression(params: &Parameters, solution: &mut Solution) -> Result<RegressionResult> {
    let result = fit(params, solution)?;
    solution.beta0 = result.beta0;
    solution.beta1 = result.beta1;
    Ok(result)
}

/// Fits the regression without touching the stored coefficients.
pub fn fit(params: &Parameters, solution: &Solution) -> Result<RegressionResult> {
    let n = params.wf_vec.len();
    if solution.len() != n {
        return Err(ModelError::dimension_mismatch("solution length", n, solution.len()));
    }
    if !(params.wm.is_finite() && params.wm > 0.0) {
        return Err(ModelError::invalid_parameter("wm", params.wm, "wages must be positive"));
    }

    let mut x = DVector::zeros(n);
    let mut y = DVector::zeros(n);
    for index in 0..n {
        let wf = params.wf_vec[index];
        if !(wf.is_finite() && wf > 0.0) {
            return Err(ModelError::invalid_parameter("wf_vec", wf, "wages must be positive"));
        }
        let (hm, hf) = (solution.hm_vec[index], solution.hf_vec[index]);
        if !(hm > 0.0 && hf > 0.0 && hm.is_finite() && hf.is_finite()) {
            return Err(ModelError::DegenerateRegression { index, hm, hf });
        }
        x[index] = (wf / params.wm).ln();
        y[index] = (hf / hm).ln();
    }

    let (beta0, beta1) = ordinary_least_squares(&x, &y)?;
    let residual_sum_of_squares: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| (yi - beta0 - beta1 * xi).powi(2))
        .sum();

    log::debug!(
        "regression on {} wages: beta0 = {:.6}, beta1 = {:.6}",
        n,
        beta0,
        beta1
    );

    Ok(RegressionResult {
        beta0,
        beta1,
        residual_sum_of_squares,
    })
}

/// Intercept and slope minimizing the sum of squared residuals of `y` on `[1, x]`.
fn ordinary_least_squares(x: &DVector<f64>, y: &DVector<f64>) -> Result<(f64, f64)> {
    let n = x.len();
    let design = DMatrix::from_fn(n, 2, |row, col| if col == 0 { 1.0 } else { x[row] });
    let design_t = design.transpose();
    let gram = &design_t * &design;
    let rhs = &design_t * y;

    let cholesky = nalgebra::linalg::Cholesky::new(gram)
        .ok_or_else(|| ModelError::singular("regression normal equations"))?;
    let beta = cholesky.solve(&rhs);
    if !beta.iter().all(|value| value.is_finite()) {
        return Err(ModelError::NumericalError {
            context: "regression coefficients",
        });
    }
    Ok((beta[0], beta[1]))
}
