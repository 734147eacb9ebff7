//! Exhaustive grid search over the four time-allocation choices.
//!
//! The grid is the Cartesian product of `points` evenly spaced values per axis, visited
//! in lexicographic `(LM, HM, LF, HF)` order. With the default 49 points that is
//! 5,764,801 candidates per solve. Candidates are evaluated one `LM` slice at a time:
//! a slice holds `points^3` utilities (about 0.9 MB for the default grid), which bounds
//! memory without giving up exhaustiveness. Materialising every tuple at once would
//! need roughly 230 MB of coordinate and utility buffers.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::options::GridOptions;
use crate::parameters::Parameters;
use crate::utility::{Allocation, Evaluator, TIME_BUDGET};

/// Best grid point found by [`solve_discrete`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscreteSolution {
    /// Utility-maximizing hours.
    pub allocation: Allocation,
    /// Utility at the chosen allocation.
    pub utility: f64,
    /// Position of the allocation in the flattened grid.
    pub index: usize,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    utility: f64,
    index: usize,
}

impl Candidate {
    const NONE: Self = Self {
        utility: f64::NEG_INFINITY,
        index: usize::MAX,
    };

    /// Keeps the higher utility; equal utilities resolve to the earlier grid index.
    fn better(self, other: Self) -> Self {
        if other.utility > self.utility
            || (other.utility == self.utility && other.index < self.index)
        {
            other
        } else {
            self
        }
    }
}

/// Finds the utility-maximizing allocation on the grid described by `grid`.
pub fn solve_discrete(params: &Parameters, grid: &GridOptions) -> Result<DiscreteSolution> {
    params.validate()?;
    if grid.points < 2 {
        return Err(ModelError::invalid_parameter(
            "grid.points",
            grid.points as f64,
            "the grid needs at least two points per axis",
        ));
    }
    if !(grid.upper.is_finite() && grid.upper > 0.0) {
        return Err(ModelError::invalid_parameter(
            "grid.upper",
            grid.upper,
            "must be positive and finite",
        ));
    }

    let evaluator = Evaluator::new(params);
    let axis: Vec<f64> = (0..grid.points).map(|i| grid.value(i)).collect();
    let slice_len = grid.points.pow(3);

    let best = if grid.parallel {
        (0..grid.points)
            .into_par_iter()
            .map_init(
                || vec![0.0; slice_len],
                |buffer, i| best_in_slice(&evaluator, &axis, i, buffer),
            )
            .reduce(|| Candidate::NONE, Candidate::better)
    } else {
        let mut buffer = vec![0.0; slice_len];
        (0..grid.points)
            .map(|i| best_in_slice(&evaluator, &axis, i, &mut buffer))
            .fold(Candidate::NONE, Candidate::better)
    };

    // The origin is always feasible, so some candidate must beat the sentinel.
    debug_assert!(best.index != usize::MAX && best.utility > f64::NEG_INFINITY);

    let allocation = decode(&axis, best.index);
    log::debug!(
        "discrete solve: {:?} with utility {:.6} (grid index {})",
        allocation,
        best.utility,
        best.index
    );

    Ok(DiscreteSolution {
        allocation,
        utility: best.utility,
        index: best.index,
    })
}

/// Fills `buffer` with the masked utilities of the slice `LM = axis[i]` and returns its argmax.
fn best_in_slice(evaluator: &Evaluator, axis: &[f64], i: usize, buffer: &mut [f64]) -> Candidate {
    let p = axis.len();
    let lm = axis[i];

    let mut offset = 0usize;
    for &hm in axis {
        for &lf in axis {
            for &hf in axis {
                buffer[offset] = if lm + hm > TIME_BUDGET || lf + hf > TIME_BUDGET {
                    f64::NEG_INFINITY
                } else {
                    evaluator.eval(lm, hm, lf, hf)
                };
                offset += 1;
            }
        }
    }

    let mut best = Candidate::NONE;
    for (local, &utility) in buffer.iter().enumerate() {
        if utility > best.utility {
            best = Candidate {
                utility,
                index: local,
            };
        }
    }
    if best.index != usize::MAX {
        best.index += i * p * p * p;
    }
    best
}

/// Inverts the flattened lexicographic index into grid coordinates.
fn decode(axis: &[f64], index: usize) -> Allocation {
    let p = axis.len();
    let hf = index % p;
    let lf = (index / p) % p;
    let hm = (index / (p * p)) % p;
    let lm = index / (p * p * p);
    Allocation::new(axis[lm], axis[hm], axis[lf], axis[hf])
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::utility::utility;

    #[test]
    fn decode_follows_lexicographic_order() {
        let axis = [0.0, 1.0, 2.0];
        assert_eq!(decode(&axis, 0), Allocation::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(decode(&axis, 1), Allocation::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(decode(&axis, 3), Allocation::new(0.0, 0.0, 1.0, 0.0));
        assert_eq!(decode(&axis, 9), Allocation::new(0.0, 1.0, 0.0, 0.0));
        assert_eq!(decode(&axis, 27 + 2), Allocation::new(1.0, 0.0, 0.0, 2.0));
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        let early = Candidate {
            utility: 1.0,
            index: 3,
        };
        let late = Candidate {
            utility: 1.0,
            index: 7,
        };
        assert_eq!(early.better(late).index, 3);
        assert_eq!(late.better(early).index, 3);
        assert_eq!(Candidate::NONE.better(late).index, 7);
    }

    #[test]
    fn coarse_grid_solution_is_feasible_and_consistent() {
        let params = Parameters::default();
        let grid = GridOptions::default().with_points(13);
        let solution = solve_discrete(&params, &grid).unwrap();

        assert!(solution.allocation.is_feasible(0.0));
        assert_relative_eq!(solution.utility, utility(&params, &solution.allocation));
        let axis: Vec<f64> = (0..13).map(|i| grid.value(i)).collect();
        assert_eq!(decode(&axis, solution.index), solution.allocation);
    }

    #[test]
    fn coarse_grid_beats_every_feasible_candidate() {
        let params = Parameters::default().with_alpha(0.3).with_sigma(0.5);
        let grid = GridOptions::default().with_points(9);
        let solution = solve_discrete(&params, &grid).unwrap();

        let axis: Vec<f64> = (0..9).map(|i| grid.value(i)).collect();
        for index in 0..grid.candidate_count() {
            let candidate = decode(&axis, index);
            if candidate.is_feasible(0.0) {
                assert!(utility(&params, &candidate) <= solution.utility);
            }
        }
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let params = Parameters::default().with_sigma(1.5).with_wages(1.0, 1.1);
        let grid = GridOptions::default().with_points(17);
        let sequential = solve_discrete(&params, &grid).unwrap();
        let parallel = solve_discrete(&params, &grid.clone().with_parallel(true)).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn rejects_degenerate_grid() {
        let grid = GridOptions::default().with_points(1);
        assert!(matches!(
            solve_discrete(&Parameters::default(), &grid),
            Err(ModelError::InvalidParameter { name: "grid.points", .. })
        ));
    }

    #[test]
    fn rejects_invalid_parameters_before_searching() {
        let params = Parameters::default().with_rho(1.0);
        assert!(matches!(
            solve_discrete(&params, &GridOptions::default()),
            Err(ModelError::InvalidParameter { name: "rho", .. })
        ));
    }
}
