//! Calibration of `alpha` and `sigma` so the wage regression hits its targets.
//!
//! The loss is `(beta0_target - beta0)^2 + (beta1_target - beta1)^2`, where the betas come
//! from a full wage sweep followed by [`fit`](crate::regression::fit). Free parameters are
//! searched with a Nelder-Mead simplex whose vertices are clamped to a box, since the loss
//! is only available through repeated solves and has no analytic gradient.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::options::SolverOptions;
use crate::parameters::Parameters;
use crate::regression::fit;
use crate::sweep::solve_wage_sweep;

const ALPHA_BOUNDS: (f64, f64) = (0.01, 0.99);
const SIGMA_BOUNDS: (f64, f64) = (0.05, 5.0);

/// Calibrated parameters and the fit they achieve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    pub alpha: f64,
    pub sigma: f64,
    /// Squared distance between fitted and target coefficients.
    pub loss: f64,
    pub beta0: f64,
    pub beta1: f64,
    /// Number of simplex iterations performed.
    pub iterations: usize,
}

#[derive(Clone, Copy, Debug)]
enum Free {
    Alpha,
    Sigma,
}

impl Free {
    fn bounds(self) -> (f64, f64) {
        match self {
            Self::Alpha => ALPHA_BOUNDS,
            Self::Sigma => SIGMA_BOUNDS,
        }
    }

    fn initial_step(self) -> f64 {
        match self {
            Self::Alpha => 0.1,
            Self::Sigma => 0.25,
        }
    }
}

/// Estimates the parameters passed as `None`, holding the `Some` ones fixed.
pub fn estimate(
    params: &Parameters,
    alpha: Option<f64>,
    sigma: Option<f64>,
    options: &SolverOptions,
) -> Result<EstimationResult> {
    params.validate()?;
    let settings = &options.estimation;

    let mut free = Vec::with_capacity(2);
    let mut start = Vec::with_capacity(2);
    let mut base = params.clone();
    match alpha {
        Some(value) => base.alpha = value,
        None => {
            free.push(Free::Alpha);
            start.push(settings.initial_alpha);
        }
    }
    match sigma {
        Some(value) => base.sigma = value,
        None => {
            free.push(Free::Sigma);
            start.push(settings.initial_sigma);
        }
    }
    base.validate()?;
    if free.is_empty() {
        return Err(ModelError::invalid_parameter(
            "estimate",
            0.0,
            "at least one of alpha and sigma must be free",
        ));
    }

    let clamp = |point: &mut [f64]| {
        for (value, parameter) in point.iter_mut().zip(free.iter()) {
            let (lo, hi) = parameter.bounds();
            *value = value.clamp(lo, hi);
        }
    };
    let candidate = |point: &[f64]| {
        let mut snapshot = base.clone();
        for (value, parameter) in point.iter().zip(free.iter()) {
            match parameter {
                Free::Alpha => snapshot.alpha = *value,
                Free::Sigma => snapshot.sigma = *value,
            }
        }
        snapshot
    };
    let loss = |point: &[f64]| -> Result<f64> {
        let snapshot = candidate(point);
        let fitted = solve_wage_sweep(&snapshot, settings.method, options)
            .and_then(|solution| fit(&snapshot, &solution));
        match fitted {
            Ok(result) => Ok(result.target_distance(&snapshot)),
            Err(error) if is_recoverable(&error) => Ok(f64::INFINITY),
            Err(error) => Err(error),
        }
    };

    // Initial simplex: the start point plus one step along each free axis.
    let dim = free.len();
    let mut origin = start;
    clamp(origin.as_mut_slice());
    let mut simplex = vec![origin.clone()];
    for (axis, parameter) in free.iter().enumerate() {
        let mut vertex = origin.clone();
        let (_, hi) = parameter.bounds();
        let step = parameter.initial_step();
        vertex[axis] = if vertex[axis] + step <= hi {
            vertex[axis] + step
        } else {
            vertex[axis] - step
        };
        simplex.push(vertex);
    }
    let mut values = simplex
        .iter()
        .map(|vertex| loss(vertex.as_slice()))
        .collect::<Result<Vec<f64>>>()?;

    let mut iteration = 0usize;
    let converged = loop {
        order(&mut simplex, &mut values);
        if simplex_size(&simplex) < settings.tolerance {
            break true;
        }
        if iteration >= settings.max_iterations {
            break false;
        }
        iteration += 1;

        let worst = dim;
        let centroid: Vec<f64> = (0..dim)
            .map(|axis| simplex[..worst].iter().map(|v| v[axis]).sum::<f64>() / dim as f64)
            .collect();
        let worst_vertex = simplex[worst].clone();
        let along = |t: f64| -> Vec<f64> {
            let mut point: Vec<f64> = centroid
                .iter()
                .zip(worst_vertex.iter())
                .map(|(c, w)| c + t * (w - c))
                .collect();
            clamp(point.as_mut_slice());
            point
        };

        let reflected = along(-1.0);
        let reflected_value = loss(reflected.as_slice())?;
        if reflected_value < values[0] {
            let expanded = along(-2.0);
            let expanded_value = loss(expanded.as_slice())?;
            if expanded_value < reflected_value {
                simplex[worst] = expanded;
                values[worst] = expanded_value;
            } else {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            }
            continue;
        }
        if reflected_value < values[worst - 1] {
            simplex[worst] = reflected;
            values[worst] = reflected_value;
            continue;
        }

        let contracted = if reflected_value < values[worst] {
            along(-0.5)
        } else {
            along(0.5)
        };
        let contracted_value = loss(contracted.as_slice())?;
        if contracted_value < values[worst].min(reflected_value) {
            simplex[worst] = contracted;
            values[worst] = contracted_value;
            continue;
        }

        // Shrink every vertex toward the best one.
        let best = simplex[0].clone();
        for index in 1..=dim {
            let mut shrunk: Vec<f64> = best
                .iter()
                .zip(simplex[index].iter())
                .map(|(b, v)| b + 0.5 * (v - b))
                .collect();
            clamp(shrunk.as_mut_slice());
            values[index] = loss(shrunk.as_slice())?;
            simplex[index] = shrunk;
        }
    };

    if !values[0].is_finite() {
        return Err(ModelError::NumericalError {
            context: "estimation loss",
        });
    }
    if !converged {
        log::warn!(
            "estimation stopped after {} iterations with simplex size {:e}",
            iteration,
            simplex_size(&simplex)
        );
        return Err(ModelError::OptimizerDidNotConverge {
            iterations: iteration,
            residual: simplex_size(&simplex),
        });
    }

    let best = candidate(simplex[0].as_slice());
    let solution = solve_wage_sweep(&best, settings.method, options)?;
    let regression = fit(&best, &solution)?;
    log::info!(
        "estimated alpha = {:.4}, sigma = {:.4} (loss {:.3e}, beta0 = {:.4}, beta1 = {:.4})",
        best.alpha,
        best.sigma,
        regression.target_distance(&best),
        regression.beta0,
        regression.beta1
    );

    Ok(EstimationResult {
        alpha: best.alpha,
        sigma: best.sigma,
        loss: regression.target_distance(&best),
        beta0: regression.beta0,
        beta1: regression.beta1,
        iterations: iteration,
    })
}

/// Failures that only mean "this trial point is unusable".
fn is_recoverable(error: &ModelError) -> bool {
    matches!(
        error,
        ModelError::DegenerateRegression { .. }
            | ModelError::SingularMatrix { .. }
            | ModelError::OptimizerDidNotConverge { .. }
            | ModelError::NumericalError { .. }
    )
}

/// Sorts vertices by ascending loss.
fn order(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut pairs: Vec<(f64, Vec<f64>)> = values.drain(..).zip(simplex.drain(..)).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (value, vertex) in pairs {
        values.push(value);
        simplex.push(vertex);
    }
}

/// Largest infinity-norm distance from the best vertex.
fn simplex_size(simplex: &[Vec<f64>]) -> f64 {
    let best = &simplex[0];
    simplex[1..]
        .iter()
        .flat_map(|vertex| vertex.iter().zip(best.iter()).map(|(v, b)| (v - b).abs()))
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixing_both_parameters_is_rejected() {
        let result = estimate(
            &Parameters::default(),
            Some(0.5),
            Some(1.0),
            &SolverOptions::default(),
        );
        assert!(matches!(
            result,
            Err(ModelError::InvalidParameter { name: "estimate", .. })
        ));
    }

    #[test]
    fn fixed_value_outside_domain_is_rejected() {
        let result = estimate(&Parameters::default(), Some(1.5), None, &SolverOptions::default());
        assert!(matches!(
            result,
            Err(ModelError::InvalidParameter { name: "alpha", .. })
        ));
    }

    #[test]
    fn ordering_and_size_follow_losses() {
        let mut simplex = vec![vec![0.5, 1.0], vec![0.6, 1.0], vec![0.5, 1.25]];
        let mut values = vec![3.0, 1.0, 2.0];
        order(&mut simplex, &mut values);
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert_eq!(simplex[0], vec![0.6, 1.0]);
        assert!((simplex_size(&simplex) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn sigma_estimate_moves_slope_toward_target() {
        // With alpha = 0.5 the intercept stays near zero, so only the slope can be matched.
        let params = Parameters::default();
        let options = SolverOptions::default();
        let result = estimate(&params, Some(0.5), None, &options).unwrap();

        assert!(result.sigma < 0.5, "sigma = {}", result.sigma);
        assert!(
            (result.beta1 - params.beta1_target).abs() < 0.05,
            "beta1 = {}",
            result.beta1
        );
        assert!(result.loss < 0.2);
    }
}
