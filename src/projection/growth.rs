//! Spend and compounding primitives shared by the engine and callers

/// Average weeks per month (52 weeks spread over 12 months)
const WEEKS_PER_MONTH: f64 = 52.0 / 12.0;

/// Convert a weekly frequency into an average monthly one
pub fn occurrences_per_month(per_week: f64) -> f64 {
    per_week * WEEKS_PER_MONTH
}

/// Monthly cost of a purchase made `frequency_per_month` times
pub fn monthly_total(amount: f64, frequency_per_month: f64) -> f64 {
    amount * frequency_per_month
}

/// Yearly cost of a purchase made `frequency_per_month` times
pub fn yearly_total(amount: f64, frequency_per_month: f64) -> f64 {
    monthly_total(amount, frequency_per_month) * 12.0
}

/// Future value of a level monthly contribution with monthly compounding.
///
/// `FV = C * ((1 + r)^n - 1) / r` with `r = annual_rate / 12`, `n = years * 12`.
/// A zero rate is special-cased to `C * n`; a zero contribution or a rate at
/// or below -100% yields 0. Long horizons at high rates can overflow to
/// infinity; callers check the result is finite.
pub fn future_value_monthly_contrib(contribution: f64, annual_rate: f64, years: u32) -> f64 {
    if contribution == 0.0 || annual_rate <= -1.0 {
        return 0.0;
    }

    let r = annual_rate / 12.0;
    let n = years * 12;
    if r == 0.0 {
        return contribution * n as f64;
    }

    contribution * (((1.0 + r).powi(n as i32) - 1.0) / r)
}

/// Round to cents, half away from zero
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weekly_to_monthly() {
        assert_relative_eq!(occurrences_per_month(12.0), 52.0, epsilon = 1e-12);
        assert_relative_eq!(monthly_total(3.5, occurrences_per_month(5.0)), 75.833333333, epsilon = 1e-6);
        assert_relative_eq!(yearly_total(3.5, occurrences_per_month(5.0)), 910.0, epsilon = 1e-9);
    }

    #[test]
    fn test_future_value_zero_contribution_never_nan() {
        // (1 + r)^n overflows here; 0 * inf must not leak out as NaN
        assert_eq!(future_value_monthly_contrib(0.0, 1.0, 1_000), 0.0);
        assert!(future_value_monthly_contrib(1.0, 1.0, 1_000).is_infinite());
    }

    #[test]
    fn test_future_value_zero_rate() {
        assert_eq!(future_value_monthly_contrib(100.0, 0.0, 2), 2400.0);
        assert_eq!(future_value_monthly_contrib(100.0, 0.07, 0), 0.0);
    }

    #[test]
    fn test_future_value_known_annuity() {
        // 100/month at 12% nominal (1%/month) for one year
        let fv = future_value_monthly_contrib(100.0, 0.12, 1);
        assert_relative_eq!(fv, 1268.250301, epsilon = 1e-5);
    }

    #[test]
    fn test_future_value_total_loss() {
        assert_eq!(future_value_monthly_contrib(100.0, -1.0, 10), 0.0);
    }

    #[test]
    fn test_round_cents_half_away_from_zero() {
        assert_eq!(round_cents(75.8333333), 75.83);
        assert_eq!(round_cents(0.125), 0.13);
        assert_eq!(round_cents(-0.125), -0.13);
    }
}
