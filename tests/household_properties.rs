use approx::assert_relative_eq;
use hsmodel::continuous::solve_continuous;
use hsmodel::discrete::solve_discrete;
use hsmodel::parameters::HomeProduction;
use hsmodel::{
    Allocation, ContinuousOptions, GridOptions, HouseholdModel, ModelError, Parameters,
    SolveMethod,
};

const EPS: f64 = 1e-9;

fn assert_feasible(allocation: &Allocation) {
    assert!(
        allocation.is_feasible(EPS),
        "allocation violates the time budget: {allocation:?}"
    );
}

/// Reference scenario: every hour quantity is equal and the grid lands on 4.5 hours.
#[test]
fn default_scenario_solvers_agree() {
    let model = HouseholdModel::new();
    let discrete = model.solve_discrete().unwrap();
    let continuous = model.solve().unwrap();

    let d = discrete.allocation;
    assert_eq!(d, Allocation::new(4.5, 4.5, 4.5, 4.5));

    let c = continuous.allocation;
    for value in [c.hm, c.lf, c.hf] {
        assert_relative_eq!(value, c.lm, epsilon = 1e-3);
    }
    for (grid, exact) in d.to_array().iter().zip(c.to_array().iter()) {
        assert!((grid - exact).abs() <= 0.25, "grid {grid} vs continuous {exact}");
    }
    assert!(continuous.utility >= discrete.utility);
}

#[test]
fn solutions_respect_time_budgets() {
    let scenarios = [
        Parameters::default(),
        Parameters::default().with_alpha(0.25).with_sigma(0.5),
        Parameters::default().with_alpha(0.75).with_sigma(1.5),
        Parameters::default().with_wages(1.0, 1.2).with_preferences(0.01, 0.0),
        Parameters::default().with_nu(0.0).with_omega(0.3),
    ];
    for params in &scenarios {
        let continuous = solve_continuous(params, &ContinuousOptions::default()).unwrap();
        assert_feasible(&continuous.allocation);
    }

    let grid = GridOptions::default();
    for params in &scenarios[..2] {
        assert_feasible(&solve_discrete(params, &grid).unwrap().allocation);
    }
}

#[test]
fn leontief_discrete_solution_matches_home_hours() {
    let params = Parameters::default().with_sigma(0.0);
    assert_eq!(params.home_production(), HomeProduction::Leontief);

    let solution = solve_discrete(&params, &GridOptions::default()).unwrap();
    assert_feasible(&solution.allocation);
    // Home hours beyond the partner's are wasted, so the optimum equalizes them.
    assert_eq!(solution.allocation.hm, solution.allocation.hf);

    // The kink at HM = HF may stop the gradient method; that must surface as an error.
    match solve_continuous(&params, &ContinuousOptions::default()) {
        Ok(continuous) => assert_feasible(&continuous.allocation),
        Err(ModelError::OptimizerDidNotConverge { .. }) => {}
        Err(other) => panic!("unexpected error {other}"),
    }
}

#[test]
fn symmetric_household_splits_evenly_on_the_grid() {
    let params = Parameters::default().with_wages(1.0, 1.0).with_preferences(0.0, 0.0);
    let solution = solve_discrete(&params, &GridOptions::default()).unwrap();
    let a = solution.allocation;
    assert_eq!((a.lm, a.hm), (a.lf, a.hf));
}

#[test]
fn female_home_preference_never_reduces_female_home_hours() {
    let mut previous = f64::NEG_INFINITY;
    for pref_hf in [0.0, 0.002, 0.005, 0.01, 0.02] {
        let params = Parameters::default().with_preferences(pref_hf, 0.0);
        let solution = solve_continuous(&params, &ContinuousOptions::default()).unwrap();
        assert!(
            solution.allocation.hf >= previous - 1e-6,
            "HF fell to {} at pref_hf = {pref_hf}",
            solution.allocation.hf
        );
        previous = solution.allocation.hf;
    }
}

#[test]
fn sweep_and_regression_produce_finite_coefficients() {
    for method in [SolveMethod::Continuous, SolveMethod::Discrete] {
        let mut model = HouseholdModel::new();
        let solution = model.solve_wage_sweep(method).unwrap();
        assert!(solution.hm_vec.iter().all(|hm| *hm > 0.0));

        let fit = model.run_regression().unwrap();
        assert!(fit.beta0.is_finite() && fit.beta1.is_finite());
        // A higher female wage moves her hours out of the home.
        assert!(fit.beta1 < 0.0, "{method:?}: beta1 = {}", fit.beta1);
    }
}

#[test]
fn continuous_slope_matches_cobb_douglas_elasticity() {
    // With interior market work HF/HM = (alpha / (1 - alpha) * wM / wF)^sigma, so the
    // regression recovers beta0 = 0 and beta1 = -sigma for alpha = 0.5.
    let mut model = HouseholdModel::new();
    model.solve_wage_sweep(SolveMethod::Continuous).unwrap();
    let fit = model.run_regression().unwrap();
    assert_relative_eq!(fit.beta0, 0.0, epsilon = 1e-3);
    assert_relative_eq!(fit.beta1, -1.0, epsilon = 1e-3);
}

#[test]
fn results_serialize_as_plain_numbers() {
    let solution = solve_discrete(&Parameters::default(), &GridOptions::default()).unwrap();
    let json = serde_json::to_value(solution).unwrap();
    assert_eq!(json["allocation"]["lm"], 4.5);
    assert_eq!(json["allocation"]["hf"], 4.5);
    assert!(json["utility"].as_f64().unwrap() < 0.0);
}
