//! Counter configuration
//!
//! Every field has a default so a partial (or empty) JSON object is a valid
//! config.

use crate::projection::loader::{parse_timestamp, LoadError};
use crate::projection::{
    Baseline, ProjectionError, DEFAULT_ANNUAL_RATE, DEFAULT_BASELINE_DATE, DEFAULT_DEBT_BILLIONS,
    DEFAULT_POPULATION,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid baseline date: {0}")]
    Date(#[from] LoadError),

    #[error("invalid baseline: {0}")]
    Baseline(#[from] ProjectionError),

    #[error("refresh interval must be at least 1 ms")]
    ZeroInterval,
}

/// Parameters of the debt counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterConfig {
    /// Published debt at the baseline date, in billions of euros
    #[serde(default = "default_debt_billions")]
    pub debt_billions: f64,

    /// Baseline date (`YYYY-MM-DD` or RFC 3339)
    #[serde(default = "default_baseline_date")]
    pub baseline_date: String,

    /// Average annual increase, in percent
    #[serde(default = "default_annual_rate")]
    pub annual_rate: f64,

    #[serde(default = "default_population")]
    pub population: u64,

    /// Refresh period of the total counter (ms)
    #[serde(default = "default_total_refresh_ms")]
    pub total_refresh_ms: u64,

    /// Refresh period of the per-capita counter (ms)
    #[serde(default = "default_per_capita_refresh_ms")]
    pub per_capita_refresh_ms: u64,

    /// Baseline document applied on startup when present
    #[serde(default)]
    pub baseline_document: Option<PathBuf>,
}

fn default_debt_billions() -> f64 { DEFAULT_DEBT_BILLIONS }
fn default_baseline_date() -> String { DEFAULT_BASELINE_DATE.to_string() }
fn default_annual_rate() -> f64 { DEFAULT_ANNUAL_RATE }
fn default_population() -> u64 { DEFAULT_POPULATION }
fn default_total_refresh_ms() -> u64 { 100 }
fn default_per_capita_refresh_ms() -> u64 { 1000 }

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            debt_billions: DEFAULT_DEBT_BILLIONS,
            baseline_date: DEFAULT_BASELINE_DATE.to_string(),
            annual_rate: DEFAULT_ANNUAL_RATE,
            population: DEFAULT_POPULATION,
            total_refresh_ms: 100,
            per_capita_refresh_ms: 1000,
            baseline_document: None,
        }
    }
}

impl CounterConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Baseline described by this config
    pub fn baseline(&self) -> Result<Baseline, ConfigError> {
        let timestamp = parse_timestamp(&self.baseline_date)?;
        Ok(Baseline::from_billions(
            self.debt_billions,
            timestamp,
            self.annual_rate,
            self.population,
        )?)
    }

    pub fn total_refresh(&self) -> Result<Duration, ConfigError> {
        refresh(self.total_refresh_ms)
    }

    pub fn per_capita_refresh(&self) -> Result<Duration, ConfigError> {
        refresh(self.per_capita_refresh_ms)
    }
}

fn refresh(ms: u64) -> Result<Duration, ConfigError> {
    match ms {
        0 => Err(ConfigError::ZeroInterval),
        ms => Ok(Duration::from_millis(ms)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = CounterConfig::from_json("{}").unwrap();
        let baseline = config.baseline().unwrap();

        assert_eq!(baseline, Baseline::default());
        assert_eq!(config.total_refresh().unwrap(), Duration::from_millis(100));
        assert_eq!(config.per_capita_refresh().unwrap(), Duration::from_secs(1));
        assert!(config.baseline_document.is_none());
    }

    #[test]
    fn test_partial_override() {
        let config = CounterConfig::from_json(
            r#"{"debt_billions": 3482.2, "baseline_date": "2025-09-30", "population": 68400000}"#,
        )
        .unwrap();
        let baseline = config.baseline().unwrap();

        assert_eq!(baseline.value(), 3482.2 * 1e9);
        assert_eq!(baseline.annual_rate(), 3.5);
        assert_eq!(baseline.population(), 68_400_000);
    }

    #[test]
    fn test_invalid_values() {
        let bad_date = CounterConfig::from_json(r#"{"baseline_date": "Q2 2025"}"#).unwrap();
        assert!(matches!(bad_date.baseline(), Err(ConfigError::Date(_))));

        let bad_value = CounterConfig::from_json(r#"{"debt_billions": -1.0}"#).unwrap();
        assert!(matches!(bad_value.baseline(), Err(ConfigError::Baseline(_))));

        let zero = CounterConfig::from_json(r#"{"total_refresh_ms": 0}"#).unwrap();
        assert!(matches!(zero.total_refresh(), Err(ConfigError::ZeroInterval)));

        assert!(matches!(
            CounterConfig::from_json(r#"{"population": -3}"#),
            Err(ConfigError::Json(_))
        ));
    }
}
