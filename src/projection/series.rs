//! Projection output structures

use serde::{Deserialize, Serialize};
use std::io::Write;

/// Balance at the end of one whole year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearSample {
    pub year: u32,
    pub value: f64,
}

/// Complete projection result; every amount is rounded to cents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Spend redirected each month
    pub monthly_spend: f64,

    /// Spend redirected each year
    pub annual_spend: f64,

    /// Value of the investment at the horizon
    pub future_value: f64,

    /// Year-end balances, one per whole year up to the horizon
    pub series: Vec<YearSample>,
}

impl ProjectionResult {
    /// Horizon-year sample, if the horizon is at least one year
    pub fn final_sample(&self) -> Option<&YearSample> {
        self.series.last()
    }

    /// Total paid in over the horizon (before growth)
    pub fn total_contributed(&self) -> f64 {
        self.annual_spend * self.series.len() as f64
    }

    /// Whether two results (e.g. client and server) agree within `tolerance`
    pub fn agrees_with(&self, other: &ProjectionResult, tolerance: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= tolerance;

        close(self.monthly_spend, other.monthly_spend)
            && close(self.annual_spend, other.annual_spend)
            && close(self.future_value, other.future_value)
            && self.series.len() == other.series.len()
            && self
                .series
                .iter()
                .zip(&other.series)
                .all(|(a, b)| a.year == b.year && close(a.value, b.value))
    }
}

/// Write the yearly series as CSV (`year,value`)
pub fn write_series_csv<W: Write>(result: &ProjectionResult, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for sample in &result.series {
        csv_writer.serialize(sample)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> ProjectionResult {
        ProjectionResult {
            monthly_spend: 75.83,
            annual_spend: 910.0,
            future_value: 1881.83,
            series: vec![
                YearSample { year: 1, value: 939.42 },
                YearSample { year: 2, value: 1881.83 },
            ],
        }
    }

    #[test]
    fn test_agrees_with_tolerance() {
        let local = sample_result();
        let mut remote = sample_result();
        remote.future_value += 0.01;
        assert!(local.agrees_with(&remote, 0.011));
        assert!(!local.agrees_with(&remote, 0.001));

        remote.series.pop();
        assert!(!local.agrees_with(&remote, 1.0));
    }

    #[test]
    fn test_series_csv() {
        let mut out = Vec::new();
        write_series_csv(&sample_result(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "year,value\n1,939.42\n2,1881.83\n");
    }

    #[test]
    fn test_total_contributed() {
        assert_eq!(sample_result().total_contributed(), 1820.0);
        assert_eq!(sample_result().final_sample().map(|s| s.year), Some(2));
    }
}
