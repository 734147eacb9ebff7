//! Continuous utility maximization over the feasible time allocations.
//!
//! The feasible set is the product of two triangles, `{L, H >= 0, L + H <= 24}` for each
//! partner, which also enforces the `[0, 24]` bounds on every coordinate. The solver is a
//! spectral projected gradient method: Barzilai-Borwein step lengths, a non-monotone
//! Armijo line search, and an exact Euclidean projection onto the feasible set.
//! Gradients are finite differences of the utility function.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::options::ContinuousOptions;
use crate::parameters::Parameters;
use crate::utility::{Allocation, Evaluator, TIME_BUDGET};

const STEP_MIN: f64 = 1e-10;
const STEP_MAX: f64 = 1e10;
const MAX_BACKTRACKS: usize = 60;

/// Diagnostics returned alongside a continuous solution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    /// Number of iterations performed.
    pub iterations: usize,
    /// Number of utility evaluations, gradients included.
    pub function_evaluations: usize,
    /// Infinity norm of the projected gradient at the solution.
    pub gradient_norm: f64,
}

/// Optimum found by [`solve_continuous`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContinuousSolution {
    /// Utility-maximizing hours.
    pub allocation: Allocation,
    /// Utility at the chosen allocation.
    pub utility: f64,
    /// Convergence diagnostics.
    pub summary: OptimizationSummary,
}

/// Maximizes utility subject to both partners' time budgets.
pub fn solve_continuous(
    params: &Parameters,
    options: &ContinuousOptions,
) -> Result<ContinuousSolution> {
    params.validate()?;
    check_initial_guess(&options.initial_guess)?;

    let mut objective = Objective::new(params);
    let mut x = options.initial_guess;
    let mut f = objective.value(&x)?;
    let mut g = objective.gradient(&x, f, options.fd_step)?;

    let mut history = VecDeque::with_capacity(options.memory.max(1));
    history.push_back(f);

    let mut gradient_norm = projected_gradient_norm(&x, &g);
    let mut step = if gradient_norm > 0.0 {
        (1.0 / gradient_norm).clamp(STEP_MIN, STEP_MAX)
    } else {
        1.0
    };

    let mut iteration = 0usize;
    while iteration < options.max_iterations {
        if gradient_norm < options.tolerance {
            let allocation = Allocation::from_array(x);
            let summary = OptimizationSummary {
                iterations: iteration,
                function_evaluations: objective.evaluations,
                gradient_norm,
            };
            log::debug!(
                "continuous solve: {:?} with utility {:.8} after {} iterations",
                allocation,
                -f,
                iteration
            );
            return Ok(ContinuousSolution {
                allocation,
                utility: -f,
                summary,
            });
        }

        let mut trial = x;
        for (t, gi) in trial.iter_mut().zip(g.iter()) {
            *t -= step * gi;
        }
        let direction = sub(&project(trial), &x);
        let slope = dot(&g, &direction);
        let reference = history.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut alpha = 1.0;
        let mut accepted = None;
        for _ in 0..MAX_BACKTRACKS {
            let candidate = axpy(&x, alpha, &direction);
            let value = objective.value(&candidate)?;
            if value <= reference + options.armijo * alpha * slope {
                accepted = Some((candidate, value));
                break;
            }
            // Safeguarded quadratic interpolation along the projected direction.
            let curvature = value - f - alpha * slope;
            let interpolated = if curvature > 0.0 {
                -0.5 * alpha * alpha * slope / curvature
            } else {
                0.5 * alpha
            };
            alpha = if interpolated >= 0.1 * alpha && interpolated <= 0.9 * alpha {
                interpolated
            } else {
                0.5 * alpha
            };
        }

        let Some((x_new, f_new)) = accepted else {
            log::warn!(
                "line search stalled at iteration {} (projected gradient norm {:e})",
                iteration,
                gradient_norm
            );
            return Err(ModelError::OptimizerDidNotConverge {
                iterations: iteration,
                residual: gradient_norm,
            });
        };

        let g_new = objective.gradient(&x_new, f_new, options.fd_step)?;
        let s = sub(&x_new, &x);
        let y = sub(&g_new, &g);
        let sy = dot(&s, &y);
        step = if sy > 0.0 {
            (dot(&s, &s) / sy).clamp(STEP_MIN, STEP_MAX)
        } else {
            STEP_MAX
        };

        x = x_new;
        f = f_new;
        g = g_new;
        gradient_norm = projected_gradient_norm(&x, &g);

        if history.len() == options.memory.max(1) {
            history.pop_front();
        }
        history.push_back(f);

        iteration += 1;
        log::trace!(
            "iteration {}: objective {:.10}, projected gradient {:e}, step {:e}",
            iteration,
            f,
            gradient_norm,
            step
        );
    }

    if gradient_norm < options.tolerance {
        return Ok(ContinuousSolution {
            allocation: Allocation::from_array(x),
            utility: -f,
            summary: OptimizationSummary {
                iterations: iteration,
                function_evaluations: objective.evaluations,
                gradient_norm,
            },
        });
    }

    log::warn!(
        "optimizer exhausted {} iterations (projected gradient norm {:e})",
        iteration,
        gradient_norm
    );
    Err(ModelError::OptimizerDidNotConverge {
        iterations: iteration,
        residual: gradient_norm,
    })
}

/// Negative utility with an evaluation counter.
struct Objective {
    evaluator: Evaluator,
    evaluations: usize,
}

impl Objective {
    fn new(params: &Parameters) -> Self {
        Self {
            evaluator: Evaluator::new(params),
            evaluations: 0,
        }
    }

    fn value(&mut self, x: &[f64; 4]) -> Result<f64> {
        self.evaluations += 1;
        let value = -self.evaluator.eval(x[0], x[1], x[2], x[3]);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ModelError::NumericalError {
                context: "continuous objective",
            })
        }
    }

    /// Central differences, falling back to forward differences at the lower bound so
    /// that no coordinate is ever evaluated below zero.
    fn gradient(&mut self, x: &[f64; 4], fx: f64, h: f64) -> Result<[f64; 4]> {
        let mut grad = [0.0; 4];
        for i in 0..4 {
            let mut forward = *x;
            forward[i] += h;
            let f_forward = self.value(&forward)?;
            grad[i] = if x[i] - h >= 0.0 {
                let mut backward = *x;
                backward[i] -= h;
                (f_forward - self.value(&backward)?) / (2.0 * h)
            } else {
                (f_forward - fx) / h
            };
        }
        Ok(grad)
    }
}

fn check_initial_guess(x: &[f64; 4]) -> Result<()> {
    for value in x {
        if !value.is_finite() || *value < 0.0 {
            return Err(ModelError::invalid_parameter(
                "continuous.initial_guess",
                *value,
                "hours must be finite and non-negative",
            ));
        }
    }
    for total in [x[0] + x[1], x[2] + x[3]] {
        if total > TIME_BUDGET {
            return Err(ModelError::invalid_parameter(
                "continuous.initial_guess",
                total,
                "each partner's hours must fit the time budget",
            ));
        }
    }
    Ok(())
}

/// Euclidean projection onto the feasible set.
pub(crate) fn project(x: [f64; 4]) -> [f64; 4] {
    let (lm, hm) = project_pair(x[0], x[1]);
    let (lf, hf) = project_pair(x[2], x[3]);
    [lm, hm, lf, hf]
}

/// Projection onto the triangle `{a, b >= 0, a + b <= TIME_BUDGET}`.
fn project_pair(a: f64, b: f64) -> (f64, f64) {
    let (ca, cb) = (a.max(0.0), b.max(0.0));
    if ca + cb <= TIME_BUDGET {
        return (ca, cb);
    }
    let shift = 0.5 * (a + b - TIME_BUDGET);
    let (sa, sb) = (a - shift, b - shift);
    if sa < 0.0 {
        (0.0, TIME_BUDGET)
    } else if sb < 0.0 {
        (TIME_BUDGET, 0.0)
    } else {
        (sa, sb)
    }
}

fn projected_gradient_norm(x: &[f64; 4], g: &[f64; 4]) -> f64 {
    let stepped = project(axpy(x, -1.0, g));
    sub(&stepped, x)
        .iter()
        .fold(0.0_f64, |acc, value| acc.max(value.abs()))
}

#[inline]
fn axpy(x: &[f64; 4], alpha: f64, d: &[f64; 4]) -> [f64; 4] {
    [
        x[0] + alpha * d[0],
        x[1] + alpha * d[1],
        x[2] + alpha * d[2],
        x[3] + alpha * d[3],
    ]
}

#[inline]
fn sub(a: &[f64; 4], b: &[f64; 4]) -> [f64; 4] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2], a[3] - b[3]]
}

#[inline]
fn dot(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
