//! Core projection engine for the monthly-contribution savings simulation

use super::growth::{future_value_monthly_contrib, monthly_total, occurrences_per_month, round_cents};
use super::params::{ParamError, ProjectionParameters};
use super::series::{ProjectionResult, YearSample};
use super::state::AccumulationState;

/// Growth rate used when the caller has not chosen one (7% a year)
pub const DEFAULT_ANNUAL_RATE: f64 = 0.07;

/// Horizon used when the caller has not chosen one
pub const DEFAULT_HORIZON_YEARS: u32 = 10;

/// Projection over one validated set of parameters
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    params: ProjectionParameters,
}

impl ProjectionEngine {
    /// Create an engine; rejects parameters that fail validation or whose
    /// projection would not be finite
    pub fn new(params: ProjectionParameters) -> Result<Self, ParamError> {
        params.validate()?;
        let engine = Self { params };
        if !engine.outputs_finite() {
            return Err(ParamError::Overflow);
        }
        Ok(engine)
    }

    /// Rates are non-negative, so the horizon value bounds every yearly
    /// sample; checking the rounded summary covers the whole result.
    fn outputs_finite(&self) -> bool {
        let contribution = self.monthly_contribution();
        [contribution, contribution * 12.0, self.future_value()]
            .iter()
            .all(|v| round_cents(*v).is_finite())
    }

    pub fn params(&self) -> &ProjectionParameters {
        &self.params
    }

    /// Monthly contribution at full precision
    pub fn monthly_contribution(&self) -> f64 {
        monthly_total(self.params.price_each, occurrences_per_month(self.params.per_week))
    }

    /// Closed-form future value at the horizon, full precision
    pub fn future_value(&self) -> f64 {
        future_value_monthly_contrib(self.monthly_contribution(), self.params.annual_rate, self.params.years)
    }

    /// Run the projection.
    ///
    /// The summary uses the closed form; the yearly series comes from the
    /// month-by-month recurrence. Rounding happens only here, at output.
    pub fn run(&self) -> ProjectionResult {
        let contribution = self.monthly_contribution();
        let monthly_rate = self.params.monthly_rate();

        let mut series = Vec::with_capacity(self.params.years as usize);
        let mut state = AccumulationState::new();

        for _month in 1..=self.params.months() {
            state.advance_month(monthly_rate, contribution);

            if state.is_year_end() {
                series.push(YearSample {
                    year: state.year(),
                    value: round_cents(state.balance),
                });
            }
        }

        ProjectionResult {
            monthly_spend: round_cents(contribution),
            annual_spend: round_cents(contribution * 12.0),
            future_value: round_cents(self.future_value()),
            series,
        }
    }
}

/// Project validated-or-not parameters; `None` when any input is rejected
pub fn project(params: &ProjectionParameters) -> Option<ProjectionResult> {
    match ProjectionEngine::new(*params) {
        Ok(engine) => Some(engine.run()),
        Err(e) => {
            log::debug!("projection skipped: {}", e);
            None
        }
    }
}

/// Project straight from raw form values; `None` when any of them is rejected
pub fn project_raw(price_each: &str, per_week: &str, years: &str, annual_rate: &str) -> Option<ProjectionResult> {
    match ProjectionParameters::parse(price_each, per_week, years, annual_rate) {
        Ok(params) => project(&params),
        Err(e) => {
            log::debug!("projection skipped: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn params(price_each: f64, per_week: f64, years: u32, annual_rate: f64) -> ProjectionParameters {
        ProjectionParameters {
            price_each,
            per_week,
            years,
            annual_rate,
        }
    }

    #[test]
    fn test_all_zero_inputs() {
        let result = project(&params(0.0, 0.0, 0, 0.0)).unwrap();

        assert_eq!(result.monthly_spend, 0.0);
        assert_eq!(result.annual_spend, 0.0);
        assert_eq!(result.future_value, 0.0);
        assert!(result.series.is_empty());
    }

    #[test]
    fn test_coffee_one_year_no_growth() {
        let result = project(&params(3.50, 5.0, 1, 0.0)).unwrap();

        assert_eq!(result.monthly_spend, 75.83);
        assert_eq!(result.annual_spend, 910.00);
        assert_eq!(result.future_value, 910.00);
        assert_eq!(result.series, vec![YearSample { year: 1, value: 910.00 }]);
    }

    #[test]
    fn test_closed_form_matches_recurrence() {
        let result = project(&params(3.50, 5.0, 10, 0.07)).unwrap();

        assert_eq!(result.series.len(), 10);
        let last = result.series.last().unwrap();
        assert_eq!(last.year, 10);
        assert_abs_diff_eq!(result.future_value, last.value, epsilon = 0.01);

        let engine = ProjectionEngine::new(params(3.50, 5.0, 10, 0.07)).unwrap();
        assert_abs_diff_eq!(engine.future_value(), 13_125.60, epsilon = 0.01);
    }

    #[test]
    fn test_series_sampled_every_year_and_increasing() {
        let result = project(&params(4.0, 3.0, 5, 0.05)).unwrap();

        let years: Vec<u32> = result.series.iter().map(|s| s.year).collect();
        assert_eq!(years, vec![1, 2, 3, 4, 5]);
        assert!(result.series.windows(2).all(|w| w[1].value > w[0].value));
    }

    #[test]
    fn test_zero_horizon_with_rate() {
        let result = project(&params(3.50, 5.0, 0, 0.07)).unwrap();
        assert_eq!(result.future_value, 0.0);
        assert!(result.series.is_empty());
        assert_eq!(result.annual_spend, 910.00);
    }

    #[test]
    fn test_rejected_inputs_are_absent() {
        assert!(project(&params(3.50, -1.0, 10, 0.07)).is_none());
        assert!(project(&params(-3.50, 5.0, 10, 0.07)).is_none());
        assert!(project(&params(3.50, 5.0, 10, f64::NAN)).is_none());
        assert!(project_raw("3.50", "5", "abc", "0.07").is_none());
        assert!(project_raw("3.50", "-1", "10", "0.07").is_none());
    }

    #[test]
    fn test_zero_spend_over_long_horizon_is_zero() {
        let result = project(&params(0.0, 0.0, 1_000, 1.0)).unwrap();

        assert_eq!(result.future_value, 0.0);
        assert_eq!(result.series.len(), 1_000);
        assert!(result.series.iter().all(|s| s.value == 0.0));
    }

    #[test]
    fn test_overflowing_projection_is_absent() {
        assert!(project(&params(3.50, 5.0, 1_000, 1.0)).is_none());
        assert!(project(&params(f64::MAX, 5.0, 1, 0.0)).is_none());
        assert_eq!(
            ProjectionEngine::new(params(3.50, 5.0, 1_000, 1.0)).unwrap_err(),
            ParamError::Overflow
        );
    }

    #[test]
    fn test_raw_matches_typed() {
        let raw = project_raw("3.50", "5", "10", "0.07").unwrap();
        let typed = project(&params(3.50, 5.0, 10, 0.07)).unwrap();
        assert_eq!(raw, typed);
    }
}
