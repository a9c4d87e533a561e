//! User-edited projection inputs and their validation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Longest horizon the engine will simulate
pub const MAX_HORIZON_YEARS: u32 = 1_000;

/// Why a set of projection inputs was rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("{field} is not a number")]
    NotANumber { field: &'static str },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field} must be a whole number")]
    NotWhole { field: &'static str },

    #[error("{field} exceeds {max}")]
    OutOfRange { field: &'static str, max: u32 },

    #[error("projected values are too large to represent")]
    Overflow,
}

/// Inputs to a savings projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParameters {
    /// Price paid per occurrence (e.g. one coffee)
    pub price_each: f64,

    /// Occurrences per week
    pub per_week: f64,

    /// Investment horizon in whole years
    pub years: u32,

    /// Annual growth rate as a decimal (0.07 for 7%)
    pub annual_rate: f64,
}

impl ProjectionParameters {
    /// Build validated parameters
    pub fn new(price_each: f64, per_week: f64, years: u32, annual_rate: f64) -> Result<Self, ParamError> {
        let params = Self {
            price_each,
            per_week,
            years,
            annual_rate,
        };
        params.validate()?;
        Ok(params)
    }

    /// Parse the four raw form values.
    ///
    /// Blank, non-numeric, non-finite or negative input is rejected; `years`
    /// must additionally be whole.
    pub fn parse(price_each: &str, per_week: &str, years: &str, annual_rate: &str) -> Result<Self, ParamError> {
        Ok(Self {
            price_each: parse_amount("price_each", price_each)?,
            per_week: parse_amount("per_week", per_week)?,
            years: to_years(parse_amount("years", years)?)?,
            annual_rate: parse_amount("annual_rate", annual_rate)?,
        })
    }

    /// Read parameters from a JSON object whose values are numbers or numeric strings
    pub fn from_json(value: &Value) -> Result<Self, ParamError> {
        Ok(Self {
            price_each: json_amount(value, "price_each")?,
            per_week: json_amount(value, "per_week")?,
            years: to_years(json_amount(value, "years")?)?,
            annual_rate: json_amount(value, "annual_rate")?,
        })
    }

    /// Check every field is finite, non-negative and in range
    pub fn validate(&self) -> Result<(), ParamError> {
        check_amount("price_each", self.price_each)?;
        check_amount("per_week", self.per_week)?;
        check_amount("annual_rate", self.annual_rate)?;
        if self.years > MAX_HORIZON_YEARS {
            return Err(ParamError::OutOfRange {
                field: "years",
                max: MAX_HORIZON_YEARS,
            });
        }
        Ok(())
    }

    /// Number of monthly compounding steps
    pub fn months(&self) -> u32 {
        self.years * 12
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 12.0
    }
}

fn check_amount(field: &'static str, value: f64) -> Result<f64, ParamError> {
    if !value.is_finite() {
        return Err(ParamError::NotANumber { field });
    }
    if value < 0.0 {
        return Err(ParamError::Negative { field });
    }
    Ok(value)
}

fn parse_amount(field: &'static str, raw: &str) -> Result<f64, ParamError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ParamError::NotANumber { field })?;
    check_amount(field, value)
}

fn json_amount(value: &Value, field: &'static str) -> Result<f64, ParamError> {
    match value.get(field) {
        Some(Value::Number(n)) => check_amount(field, n.as_f64().ok_or(ParamError::NotANumber { field })?),
        Some(Value::String(s)) => parse_amount(field, s),
        _ => Err(ParamError::NotANumber { field }),
    }
}

fn to_years(value: f64) -> Result<u32, ParamError> {
    if value.fract() != 0.0 {
        return Err(ParamError::NotWhole { field: "years" });
    }
    if value > MAX_HORIZON_YEARS as f64 {
        return Err(ParamError::OutOfRange {
            field: "years",
            max: MAX_HORIZON_YEARS,
        });
    }
    Ok(value as u32)
}
