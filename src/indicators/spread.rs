//! 10-year OAT-Bund spread snapshot

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Basis points per percentage point
const BP_PER_POINT: f64 = 100.0;

/// Spread above which market stress is considered high (percentage points)
pub const HIGH_SPREAD: f64 = 1.0;
/// Spread above which market stress is considered elevated
pub const ELEVATED_SPREAD: f64 = 0.7;

/// Latest spread reading with its 5-year range, in percentage points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadSnapshot {
    pub current: f64,
    pub mean_5y: f64,
    pub min_5y: f64,
    pub max_5y: f64,
    pub updated: NaiveDate,
}

/// Colour band of the spread gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpreadLevel {
    Contained,
    Elevated,
    High,
}

impl SpreadSnapshot {
    pub fn current_bp(&self) -> f64 {
        self.current * BP_PER_POINT
    }

    /// Distance to the 5-year mean, in basis points
    pub fn deviation_from_mean_bp(&self) -> f64 {
        (self.current - self.mean_5y) * BP_PER_POINT
    }

    pub fn level(&self) -> SpreadLevel {
        if self.current > HIGH_SPREAD {
            SpreadLevel::High
        } else if self.current > ELEVATED_SPREAD {
            SpreadLevel::Elevated
        } else {
            SpreadLevel::Contained
        }
    }

    /// Gauge fill relative to the 5-year maximum, in percent
    pub fn gauge_fill_pct(&self) -> Option<f64> {
        if self.max_5y > 0.0 {
            Some(self.current / self.max_5y * 100.0)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn snapshot(current: f64) -> SpreadSnapshot {
        SpreadSnapshot {
            current,
            mean_5y: 0.52,
            min_5y: 0.25,
            max_5y: 1.15,
            updated: NaiveDate::from_ymd_opt(2025, 10, 14).unwrap(),
        }
    }

    #[test]
    fn test_basis_points() {
        let s = snapshot(0.78);
        assert_relative_eq!(s.current_bp(), 78.0, epsilon = 1e-9);
        assert_relative_eq!(s.deviation_from_mean_bp(), 26.0, epsilon = 1e-9);
        assert_relative_eq!(snapshot(0.40).deviation_from_mean_bp(), -12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_levels() {
        assert_eq!(snapshot(0.78).level(), SpreadLevel::Elevated);
        assert_eq!(snapshot(0.70).level(), SpreadLevel::Contained);
        assert_eq!(snapshot(1.00).level(), SpreadLevel::Elevated);
        assert_eq!(snapshot(1.01).level(), SpreadLevel::High);
    }

    #[test]
    fn test_gauge() {
        assert_relative_eq!(snapshot(0.78).gauge_fill_pct().unwrap(), 0.78 / 1.15 * 100.0);

        let flat = SpreadSnapshot { max_5y: 0.0, ..snapshot(0.5) };
        assert_eq!(flat.gauge_fill_pct(), None);
    }
}
