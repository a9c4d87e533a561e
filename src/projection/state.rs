//! Month-by-month accumulation state for a projection

/// Balance of the savings account at a point in the projection
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulationState {
    /// Months elapsed (0 before the first contribution)
    pub month: u32,

    /// Balance after this month's growth and contribution, full precision
    pub balance: f64,

    /// Sum of contributions paid in so far
    pub contributed: f64,
}

impl AccumulationState {
    /// Empty account at projection start
    pub fn new() -> Self {
        Self {
            month: 0,
            balance: 0.0,
            contributed: 0.0,
        }
    }

    /// Advance one month: grow the prior balance, then add this month's contribution
    pub fn advance_month(&mut self, monthly_rate: f64, contribution: f64) {
        self.month += 1;
        self.balance = self.balance * (1.0 + monthly_rate) + contribution;
        self.contributed += contribution;
    }

    /// True at the end of each whole year
    pub fn is_year_end(&self) -> bool {
        self.month > 0 && self.month % 12 == 0
    }

    /// Whole years elapsed
    pub fn year(&self) -> u32 {
        self.month / 12
    }

    /// Investment growth on top of contributions
    pub fn growth(&self) -> f64 {
        self.balance - self.contributed
    }
}

impl Default for AccumulationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_applies_before_contribution() {
        let mut state = AccumulationState::new();
        state.advance_month(0.01, 100.0);
        // First contribution earns nothing in the month it is paid
        assert_eq!(state.balance, 100.0);

        state.advance_month(0.01, 100.0);
        assert!((state.balance - 201.0).abs() < 1e-12);
        assert!((state.growth() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_year_end() {
        let mut state = AccumulationState::new();
        assert!(!state.is_year_end());
        for _ in 0..12 {
            state.advance_month(0.0, 1.0);
        }
        assert!(state.is_year_end());
        assert_eq!(state.year(), 1);
    }
}
