//! Household utility: market consumption, home production, and the disutility of work.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::parameters::{HomeProduction, Parameters};

/// Hours available to each partner per day.
pub const TIME_BUDGET: f64 = 24.0;

/// Lower bound applied to the composite good before it is raised to `1 - rho`.
pub const Q_FLOOR: f64 = 1e-8;

/// Hours of market work (`L`) and home production (`H`) for both partners.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub lm: f64,
    pub hm: f64,
    pub lf: f64,
    pub hf: f64,
}

impl Allocation {
    pub fn new(lm: f64, hm: f64, lf: f64, hf: f64) -> Self {
        Self { lm, hm, lf, hf }
    }

    /// Builds an allocation from `[LM, HM, LF, HF]`.
    pub fn from_array(x: [f64; 4]) -> Self {
        Self::new(x[0], x[1], x[2], x[3])
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.lm, self.hm, self.lf, self.hf]
    }

    /// Total hours worked by the male partner.
    pub fn total_male(&self) -> f64 {
        self.lm + self.hm
    }

    /// Total hours worked by the female partner.
    pub fn total_female(&self) -> f64 {
        self.lf + self.hf
    }

    /// Relative home production `HF / HM`; infinite when `HM` is zero.
    pub fn home_ratio(&self) -> f64 {
        self.hf / self.hm
    }

    /// Whether both time budgets hold and no quantity is negative, up to `tolerance`.
    pub fn is_feasible(&self, tolerance: f64) -> bool {
        self.to_array().iter().all(|hours| *hours >= -tolerance)
            && self.total_male() <= TIME_BUDGET + tolerance
            && self.total_female() <= TIME_BUDGET + tolerance
    }
}

/// Market consumption `C = wM * LM + wF * LF`.
#[inline]
pub fn consumption(params: &Parameters, lm: f64, lf: f64) -> f64 {
    params.wm * lm + params.wf * lf
}

/// Home production `H` under the technology selected by `sigma`.
#[inline]
pub fn home_production(params: &Parameters, hm: f64, hf: f64) -> f64 {
    params.home_production().output(params.alpha, hm, hf)
}

/// Evaluates household utility for a single allocation.
///
/// The parameters are assumed valid; solvers call [`Parameters::validate`] once before
/// evaluating utility millions of times.
pub fn utility(params: &Parameters, allocation: &Allocation) -> f64 {
    Evaluator::new(params).eval(allocation.lm, allocation.hm, allocation.lf, allocation.hf)
}

/// Evaluates utility elementwise over four equal-length vectors of hours.
pub fn utility_elementwise(
    params: &Parameters,
    lm: &DVector<f64>,
    hm: &DVector<f64>,
    lf: &DVector<f64>,
    hf: &DVector<f64>,
) -> Result<DVector<f64>> {
    params.validate()?;
    let n = lm.len();
    for (context, found) in [("HM length", hm.len()), ("LF length", lf.len()), ("HF length", hf.len())] {
        if found != n {
            return Err(ModelError::dimension_mismatch(context, n, found));
        }
    }

    let evaluator = Evaluator::new(params);
    Ok(DVector::from_fn(n, |i, _| {
        evaluator.eval(lm[i], hm[i], lf[i], hf[i])
    }))
}

/// Parameter snapshot with the derived constants hoisted out of the inner loop.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Evaluator {
    technology: HomeProduction,
    alpha: f64,
    omega: f64,
    one_minus_rho: f64,
    nu: f64,
    work_exponent: f64,
    wm: f64,
    wf: f64,
    pref_hf: f64,
    pref_hm: f64,
}

impl Evaluator {
    pub(crate) fn new(params: &Parameters) -> Self {
        Self {
            technology: params.home_production(),
            alpha: params.alpha,
            omega: params.omega,
            one_minus_rho: 1.0 - params.rho,
            nu: params.nu,
            work_exponent: 1.0 + 1.0 / params.epsilon,
            wm: params.wm,
            wf: params.wf,
            pref_hf: params.pref_hf,
            pref_hm: params.pref_hm,
        }
    }

    #[inline]
    pub(crate) fn eval(&self, lm: f64, hm: f64, lf: f64, hf: f64) -> f64 {
        let c = self.wm * lm + self.wf * lf;
        let h = self.technology.output(self.alpha, hm, hf);

        let q = c.powf(self.omega) * h.powf(1.0 - self.omega);
        // NaN compares false, so `max` keeps the floor for undefined composites too.
        let q = q.max(Q_FLOOR);
        let consumption_utility = q.powf(self.one_minus_rho) / self.one_minus_rho;

        let e = self.work_exponent;
        let tm = lm + hm;
        let tf = lf + hf;
        let disutility = self.nu * (tm.powf(e) / e + tf.powf(e) / e);

        consumption_utility - disutility + hf * self.pref_hf + hm * self.pref_hm
    }
}
