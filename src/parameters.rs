//! Economic parameters of the household specialization model and their validation.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Number of points in the default female wage sweep.
pub const DEFAULT_WAGE_POINTS: usize = 5;

/// Preference, home-production, and wage parameters for one household.
///
/// Every field has a default, so callers can override any subset either through the
/// chained `with_*` setters or by deserializing a partial document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Curvature of consumption utility; the utility term is `Q^(1-rho)/(1-rho)`.
    pub rho: f64,
    /// Weight on the disutility of total work.
    pub nu: f64,
    /// Frisch-style elasticity of labor supply.
    pub epsilon: f64,
    /// Weight of market consumption in the composite good.
    pub omega: f64,
    /// Relative productivity of the female partner in home production.
    pub alpha: f64,
    /// Elasticity of substitution between the partners' home production.
    pub sigma: f64,
    /// Linear utility bonus per hour of female home production.
    pub pref_hf: f64,
    /// Linear utility bonus per hour of male home production.
    pub pref_hm: f64,
    /// Male wage.
    pub wm: f64,
    /// Female wage used by single solves.
    pub wf: f64,
    /// Female wages visited by the sensitivity sweep.
    pub wf_vec: Vec<f64>,
    /// Target intercept of the log-log regression (reporting only).
    pub beta0_target: f64,
    /// Target slope of the log-log regression (reporting only).
    pub beta1_target: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            rho: 2.0,
            nu: 0.001,
            epsilon: 1.0,
            omega: 0.5,
            alpha: 0.5,
            sigma: 1.0,
            pref_hf: 0.0,
            pref_hm: 0.0,
            wm: 1.0,
            wf: 1.0,
            wf_vec: Self::linspace_wages(0.8, 1.2, DEFAULT_WAGE_POINTS),
            beta0_target: 0.4,
            beta1_target: -0.1,
        }
    }
}

impl Parameters {
    /// Evenly spaced values on `[lo, hi]`, endpoints included.
    pub fn linspace_wages(lo: f64, hi: f64, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![lo],
            _ => {
                let step = (hi - lo) / (n - 1) as f64;
                (0..n)
                    .map(|i| if i + 1 == n { hi } else { lo + step * i as f64 })
                    .collect()
            }
        }
    }

    /// Checks every parameter against the domain where the utility function is defined.
    pub fn validate(&self) -> Result<()> {
        finite("rho", self.rho)?;
        if self.rho <= 0.0 {
            return Err(ModelError::invalid_parameter("rho", self.rho, "must be positive"));
        }
        if self.rho == 1.0 {
            return Err(ModelError::invalid_parameter(
                "rho",
                self.rho,
                "must differ from 1 (utility divides by 1 - rho)",
            ));
        }

        finite("nu", self.nu)?;
        if self.nu < 0.0 {
            return Err(ModelError::invalid_parameter("nu", self.nu, "must be non-negative"));
        }

        finite("epsilon", self.epsilon)?;
        if self.epsilon <= 0.0 {
            return Err(ModelError::invalid_parameter(
                "epsilon",
                self.epsilon,
                "must be positive",
            ));
        }

        unit_interval("omega", self.omega)?;
        unit_interval("alpha", self.alpha)?;

        finite("sigma", self.sigma)?;
        if self.sigma < 0.0 {
            return Err(ModelError::invalid_parameter(
                "sigma",
                self.sigma,
                "must be non-negative",
            ));
        }

        finite("pref_hf", self.pref_hf)?;
        finite("pref_hm", self.pref_hm)?;
        positive_wage("wm", self.wm)?;
        positive_wage("wf", self.wf)?;

        if self.wf_vec.is_empty() {
            return Err(ModelError::dimension_mismatch("wf_vec length", 1, 0));
        }
        for wage in &self.wf_vec {
            positive_wage("wf_vec", *wage)?;
        }
        Ok(())
    }

    /// Home-production technology selected by the current `sigma`.
    pub fn home_production(&self) -> HomeProduction {
        HomeProduction::from_sigma(self.sigma)
    }

    /// Returns a copy of the parameters with the female wage replaced.
    pub fn with_female_wage(&self, wf: f64) -> Self {
        Self {
            wf,
            ..self.clone()
        }
    }

    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    pub fn with_nu(mut self, nu: f64) -> Self {
        self.nu = nu;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_omega(mut self, omega: f64) -> Self {
        self.omega = omega;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Sets the linear home-production bonuses for the female and male partner.
    pub fn with_preferences(mut self, pref_hf: f64, pref_hm: f64) -> Self {
        self.pref_hf = pref_hf;
        self.pref_hm = pref_hm;
        self
    }

    /// Sets both wages used by single solves.
    pub fn with_wages(mut self, wm: f64, wf: f64) -> Self {
        self.wm = wm;
        self.wf = wf;
        self
    }

    /// Replaces the female wages visited by the sweep.
    pub fn with_wage_vector(mut self, wf_vec: Vec<f64>) -> Self {
        self.wf_vec = wf_vec;
        self
    }

    /// Replaces the regression targets used for reporting and estimation.
    pub fn with_targets(mut self, beta0_target: f64, beta1_target: f64) -> Self {
        self.beta0_target = beta0_target;
        self.beta1_target = beta1_target;
        self
    }
}

fn finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ModelError::invalid_parameter(name, value, "must be finite"))
    }
}

fn unit_interval(name: &'static str, value: f64) -> Result<()> {
    finite(name, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ModelError::invalid_parameter(name, value, "must lie in [0, 1]"))
    }
}

fn positive_wage(name: &'static str, value: f64) -> Result<()> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::invalid_parameter(name, value, "wages must be positive"))
    }
}

/// Closed set of home-production technologies indexed by the elasticity `sigma`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HomeProduction {
    /// `sigma == 1`: `HM^(1-alpha) * HF^alpha`.
    CobbDouglas,
    /// `sigma == 0`: perfect complements, `min(HM, HF)`.
    Leontief,
    /// Any other `sigma`: the general CES aggregator.
    Ces { sigma: f64 },
}

impl HomeProduction {
    /// Selects the technology for a given elasticity of substitution.
    pub fn from_sigma(sigma: f64) -> Self {
        if sigma == 1.0 {
            Self::CobbDouglas
        } else if sigma == 0.0 {
            Self::Leontief
        } else {
            Self::Ces { sigma }
        }
    }

    /// Aggregates the partners' home hours into home production `H`.
    #[inline]
    pub fn output(self, alpha: f64, hm: f64, hf: f64) -> f64 {
        match self {
            Self::CobbDouglas => hm.powf(1.0 - alpha) * hf.powf(alpha),
            Self::Leontief => hm.min(hf),
            Self::Ces { sigma } => {
                let exponent = (sigma - 1.0) / sigma;
                ((1.0 - alpha) * hm.powf(exponent) + alpha * hf.powf(exponent))
                    .powf(sigma / (sigma - 1.0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn defaults_match_reference_model() {
        let params = Parameters::default();
        assert_eq!(params.rho, 2.0);
        assert_eq!(params.nu, 0.001);
        assert_eq!(params.wf_vec.len(), DEFAULT_WAGE_POINTS);
        assert_relative_eq!(params.wf_vec[0], 0.8);
        assert_relative_eq!(params.wf_vec[2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(params.wf_vec[4], 1.2);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn rejects_parameters_outside_domain() {
        let cases = [
            (Parameters::default().with_rho(1.0), "rho"),
            (Parameters::default().with_epsilon(0.0), "epsilon"),
            (Parameters::default().with_sigma(-0.5), "sigma"),
            (Parameters::default().with_omega(1.5), "omega"),
            (Parameters::default().with_alpha(f64::NAN), "alpha"),
            (Parameters::default().with_wages(0.0, 1.0), "wm"),
        ];
        for (params, expected) in cases {
            match params.validate() {
                Err(ModelError::InvalidParameter { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected invalid `{expected}`, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_wage_vector_is_rejected() {
        let params = Parameters::default().with_wage_vector(Vec::new());
        assert!(matches!(
            params.validate(),
            Err(ModelError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn sigma_selects_technology() {
        assert_eq!(HomeProduction::from_sigma(1.0), HomeProduction::CobbDouglas);
        assert_eq!(HomeProduction::from_sigma(0.0), HomeProduction::Leontief);
        assert_eq!(
            HomeProduction::from_sigma(0.5),
            HomeProduction::Ces { sigma: 0.5 }
        );
    }

    #[test]
    fn ces_approaches_cobb_douglas_near_unit_sigma() {
        for &(hm, hf) in &[(1.0, 1.0), (2.5, 7.0), (10.0, 0.5), (4.5, 4.5)] {
            for &alpha in &[0.25, 0.5, 0.75] {
                let cobb = HomeProduction::CobbDouglas.output(alpha, hm, hf);
                for &sigma in &[1.0 - 1e-7, 1.0 + 1e-7] {
                    let ces = HomeProduction::Ces { sigma }.output(alpha, hm, hf);
                    assert_relative_eq!(ces, cobb, max_relative = 1e-5);
                }
            }
        }
    }

    #[test]
    fn leontief_takes_the_minimum() {
        assert_eq!(HomeProduction::Leontief.output(0.3, 4.0, 2.5), 2.5);
        assert_eq!(HomeProduction::Leontief.output(0.3, 1.0, 2.5), 1.0);
    }

    #[test]
    fn deserializes_partial_documents() {
        let params: Parameters = serde_json::from_str(r#"{"alpha": 0.75, "sigma": 1.5}"#).unwrap();
        assert_eq!(params.alpha, 0.75);
        assert_eq!(params.sigma, 1.5);
        assert_eq!(params.rho, 2.0);
        assert_eq!(params.wf_vec, Parameters::default().wf_vec);
    }
}
