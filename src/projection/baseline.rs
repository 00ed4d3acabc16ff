//! Baseline record the extrapolation starts from

use super::{
    DEFAULT_ANNUAL_RATE, DEFAULT_DEBT_BILLIONS, DEFAULT_POPULATION, EUROS_PER_BILLION,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

/// Rejected baseline input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("baseline value must be positive and finite, got {0}")]
    InvalidValue(f64),

    #[error("annual rate must be finite, got {0}")]
    InvalidRate(f64),
}

/// Reference debt value and date from which extrapolation starts
///
/// Fields are private so that a constructed baseline always satisfies
/// `value > 0` with a finite annual rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Baseline {
    /// Debt at `timestamp`, in euros
    value: f64,
    timestamp: DateTime<Utc>,
    /// Average annual increase, in percent (3.5 = 3.5%)
    annual_rate: f64,
    population: u64,
}

impl Baseline {
    /// Create a baseline from a value in euros
    pub fn new(
        value: f64,
        timestamp: DateTime<Utc>,
        annual_rate: f64,
        population: u64,
    ) -> Result<Self, ProjectionError> {
        check_value(value)?;
        check_rate(annual_rate)?;
        Ok(Self {
            value,
            timestamp,
            annual_rate,
            population,
        })
    }

    /// Create a baseline from a published figure in billions of euros
    pub fn from_billions(
        billions: f64,
        timestamp: DateTime<Utc>,
        annual_rate: f64,
        population: u64,
    ) -> Result<Self, ProjectionError> {
        Self::new(billions * EUROS_PER_BILLION, timestamp, annual_rate, population)
    }

    /// Published French general government debt at the end of Q2 2025
    pub fn france_q2_2025() -> Self {
        let timestamp = Utc
            .with_ymd_and_hms(2025, 6, 30, 0, 0, 0)
            .single()
            .expect("2025-06-30 is a valid calendar date");
        Self {
            value: DEFAULT_DEBT_BILLIONS * EUROS_PER_BILLION,
            timestamp,
            annual_rate: DEFAULT_ANNUAL_RATE,
            population: DEFAULT_POPULATION,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn value_billions(&self) -> f64 {
        self.value / EUROS_PER_BILLION
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn annual_rate(&self) -> f64 {
        self.annual_rate
    }

    pub fn population(&self) -> u64 {
        self.population
    }

    /// Same baseline with a new value and date; rate and population are kept
    pub(crate) fn rebased(
        &self,
        value: f64,
        timestamp: DateTime<Utc>,
        annual_rate: Option<f64>,
    ) -> Result<Self, ProjectionError> {
        Self::new(
            value,
            timestamp,
            annual_rate.unwrap_or(self.annual_rate),
            self.population,
        )
    }
}

impl Default for Baseline {
    fn default() -> Self {
        Self::france_q2_2025()
    }
}

fn check_value(value: f64) -> Result<(), ProjectionError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ProjectionError::InvalidValue(value))
    }
}

fn check_rate(rate: f64) -> Result<(), ProjectionError> {
    if rate.is_finite() {
        Ok(())
    } else {
        Err(ProjectionError::InvalidRate(rate))
    }
}
