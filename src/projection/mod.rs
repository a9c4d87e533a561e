//! Savings projection: redirect a recurring discretionary spend into a
//! monthly-compounded investment and project its value over time

mod params;
mod growth;
mod state;
mod engine;
mod series;
mod scenario;

pub use params::{ProjectionParameters, ParamError, MAX_HORIZON_YEARS};
pub use growth::{
    future_value_monthly_contrib, monthly_total, occurrences_per_month, round_cents, yearly_total,
};
pub use state::AccumulationState;
pub use engine::{project, project_raw, ProjectionEngine, DEFAULT_ANNUAL_RATE, DEFAULT_HORIZON_YEARS};
pub use series::{write_series_csv, ProjectionResult, YearSample};
pub use scenario::{sweep_rates, RateScenario};
