//! Rate sweeps: the same spend projected under several growth rates

use rayon::prelude::*;
use serde::Serialize;

use super::engine::project;
use super::params::ProjectionParameters;
use super::series::ProjectionResult;

/// One growth-rate scenario of a sweep
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateScenario {
    pub annual_rate: f64,

    /// `None` when this rate was rejected (e.g. negative)
    pub result: Option<ProjectionResult>,
}

/// Project `base` once per rate, in parallel; output keeps the order of `rates`
pub fn sweep_rates(base: &ProjectionParameters, rates: &[f64]) -> Vec<RateScenario> {
    rates
        .par_iter()
        .map(|&annual_rate| RateScenario {
            annual_rate,
            result: project(&ProjectionParameters { annual_rate, ..*base }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_higher_rate_grows_more() {
        let base = ProjectionParameters::new(3.5, 5.0, 10, 0.0).unwrap();
        let scenarios = sweep_rates(&base, &[0.03, 0.05, 0.07]);

        assert_eq!(scenarios.len(), 3);
        assert_eq!(scenarios[0].annual_rate, 0.03);

        let fv: Vec<f64> = scenarios
            .iter()
            .map(|s| s.result.as_ref().unwrap().future_value)
            .collect();
        assert!(fv[0] < fv[1] && fv[1] < fv[2]);
    }

    #[test]
    fn test_sweep_rejected_rate_is_absent() {
        let base = ProjectionParameters::new(3.5, 5.0, 10, 0.0).unwrap();
        let scenarios = sweep_rates(&base, &[-0.02, 0.0]);

        assert!(scenarios[0].result.is_none());
        assert_eq!(scenarios[1].result.as_ref().unwrap().future_value, 9100.0);
    }
}
