//! Linear extrapolation of the debt from a baseline

use super::baseline::{Baseline, ProjectionError};
use super::loader::{self, BaselineUpdate, LoadError};
use super::EUROS_PER_BILLION;
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::path::Path;

const DAYS_PER_YEAR: f64 = 365.0;
const HOURS_PER_DAY: f64 = 24.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Debt increments per time unit, in the unit of the baseline value (euros)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateBundle {
    pub per_second: f64,
    pub per_minute: f64,
    pub per_hour: f64,
    pub per_day: f64,
}

impl RateBundle {
    /// Annual increment implied by the bundle
    pub fn per_year(&self) -> f64 {
        self.per_day * DAYS_PER_YEAR
    }
}

/// Instantaneous extrapolated debt
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projection {
    /// Total debt in euros
    pub total: f64,
    /// Total debt in billions of euros
    pub billions: f64,
    /// Debt per resident in euros; `None` when the population is zero
    pub per_capita: Option<f64>,
    /// Seconds since the baseline date (negative before it)
    pub elapsed_seconds: f64,
    pub per_second: f64,
    pub per_minute: f64,
    pub per_hour: f64,
    pub per_day: f64,
}

/// Compute the increment bundle for a baseline
///
/// The annual increase `value * rate / 100` is divided down successively into
/// per-day, per-hour, per-minute and per-second increments.
pub fn rate(baseline: &Baseline) -> RateBundle {
    let per_year = baseline.value() * (baseline.annual_rate() / 100.0);
    let per_day = per_year / DAYS_PER_YEAR;
    let per_hour = per_day / HOURS_PER_DAY;
    let per_minute = per_hour / MINUTES_PER_HOUR;
    let per_second = per_minute / SECONDS_PER_MINUTE;

    RateBundle {
        per_second,
        per_minute,
        per_hour,
        per_day,
    }
}

/// Extrapolate the debt at `now`
pub fn extrapolate(baseline: &Baseline, now: DateTime<Utc>) -> Projection {
    project(baseline, &rate(baseline), now)
}

fn project(baseline: &Baseline, rates: &RateBundle, now: DateTime<Utc>) -> Projection {
    let elapsed_seconds = (now - baseline.timestamp()).num_milliseconds() as f64 / 1000.0;
    let total = baseline.value() + elapsed_seconds * rates.per_second;

    let per_capita = match baseline.population() {
        0 => None,
        population => Some(total / population as f64),
    };

    Projection {
        total,
        billions: total / EUROS_PER_BILLION,
        per_capita,
        elapsed_seconds,
        per_second: rates.per_second,
        per_minute: rates.per_minute,
        per_hour: rates.per_hour,
        per_day: rates.per_day,
    }
}

/// Baseline plus its cached increment bundle
///
/// The bundle is recomputed every time the baseline is replaced, so the two
/// are never observed out of step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionEngine {
    baseline: Baseline,
    rates: RateBundle,
}

impl ProjectionEngine {
    pub fn new(baseline: Baseline) -> Self {
        let rates = rate(&baseline);
        Self { baseline, rates }
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn rates(&self) -> &RateBundle {
        &self.rates
    }

    /// Extrapolate the debt at `now` from the current baseline
    pub fn extrapolate(&self, now: DateTime<Utc>) -> Projection {
        project(&self.baseline, &self.rates, now)
    }

    /// Swap in a new baseline value and date
    ///
    /// On error the engine is left unchanged.
    pub fn replace_baseline(
        &mut self,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<(), ProjectionError> {
        let next = self.baseline.rebased(value, timestamp, None)?;
        self.install(next);
        Ok(())
    }

    /// Apply a parsed baseline document
    pub fn apply(&mut self, update: &BaselineUpdate) -> Result<(), ProjectionError> {
        let next = self
            .baseline
            .rebased(update.value, update.timestamp, update.annual_rate)?;
        self.install(next);
        Ok(())
    }

    /// Parse and apply a JSON baseline document
    pub fn load_document(&mut self, json: &str) -> Result<(), LoadError> {
        let update = loader::parse_baseline_document(json)?;
        self.apply(&update)?;
        Ok(())
    }

    /// Read, parse and apply a JSON baseline document from disk
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let update = loader::read_baseline_document(path)?;
        self.apply(&update)?;
        Ok(())
    }

    fn install(&mut self, baseline: Baseline) {
        self.rates = rate(&baseline);
        self.baseline = baseline;
        info!(
            "Baseline replaced: {:.1} bn EUR at {} (+{:.2}%/yr, {:.0} EUR/s)",
            self.baseline.value_billions(),
            self.baseline.timestamp(),
            self.baseline.annual_rate(),
            self.rates.per_second
        );
    }
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new(Baseline::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn baseline(value: f64, rate: f64, population: u64) -> Baseline {
        let ts = Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();
        Baseline::new(value, ts, rate, population).unwrap()
    }

    #[test]
    fn test_rate_bundle_daily_times_year() {
        for &(value, rate_pct) in &[(3416.3e9, 3.5), (1.0, 0.1), (2.5e6, 12.0), (7.0e11, -2.0)] {
            let b = baseline(value, rate_pct, 1);
            let r = rate(&b);
            assert_relative_eq!(r.per_day * 365.0, value * rate_pct / 100.0, max_relative = 1e-12);
            assert_relative_eq!(r.per_year(), value * rate_pct / 100.0, max_relative = 1e-12);
            assert_relative_eq!(r.per_hour * 24.0, r.per_day, max_relative = 1e-12);
            assert_relative_eq!(r.per_minute * 60.0, r.per_hour, max_relative = 1e-12);
            assert_relative_eq!(r.per_second * 60.0, r.per_minute, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_published_example() {
        let b = baseline(3416.3e9, 3.5, 67_000_000);
        let r = rate(&b);

        // 3416.3e9 * 0.035 / 31_536_000
        assert_relative_eq!(r.per_second, 3791.555682, max_relative = 1e-9);

        let p = extrapolate(&b, b.timestamp() + Duration::seconds(100));
        assert_relative_eq!(p.total, 3416.3e9 + 379_155.5682, max_relative = 1e-12);
        assert_eq!(p.elapsed_seconds, 100.0);
    }

    #[test]
    fn test_zero_elapsed_is_exact() {
        let b = baseline(3416.3e9, 3.5, 67_000_000);
        let p = extrapolate(&b, b.timestamp());

        assert_eq!(p.total, b.value());
        assert_eq!(p.elapsed_seconds, 0.0);
    }

    #[test]
    fn test_monotonic_for_positive_rate() {
        let b = baseline(3416.3e9, 3.5, 67_000_000);
        let mut previous = f64::NEG_INFINITY;
        for step in -10..200 {
            let now = b.timestamp() + Duration::milliseconds(step * 37_123_457);
            let total = extrapolate(&b, now).total;
            assert!(total >= previous, "step {step}: {total} < {previous}");
            previous = total;
        }
    }

    #[test]
    fn test_before_baseline_is_below_value() {
        let b = baseline(1000.0, 10.0, 1);
        let p = extrapolate(&b, b.timestamp() - Duration::days(365));

        assert!(p.elapsed_seconds < 0.0);
        assert_relative_eq!(p.total, 900.0, max_relative = 1e-12);
    }

    #[test]
    fn test_per_capita() {
        let b = baseline(67e9, 3.5, 67_000_000);
        let p = extrapolate(&b, b.timestamp());
        assert_relative_eq!(p.per_capita.unwrap(), 1000.0);
        assert_relative_eq!(p.billions, 67.0);
    }

    #[test]
    fn test_zero_population_yields_no_per_capita() {
        let b = baseline(67e9, 3.5, 0);
        let p = extrapolate(&b, b.timestamp() + Duration::hours(1));
        assert_eq!(p.per_capita, None);
        assert!(p.total > 67e9);
    }

    #[test]
    fn test_engine_matches_free_functions() {
        let b = baseline(3416.3e9, 3.5, 67_000_000);
        let engine = ProjectionEngine::new(b);
        let now = b.timestamp() + Duration::days(120);

        assert_eq!(engine.rates(), &rate(&b));
        assert_eq!(engine.extrapolate(now), extrapolate(&b, now));
    }

    #[test]
    fn test_replace_then_extrapolate_round_trip() {
        let mut engine = ProjectionEngine::default();
        let ts = Utc.with_ymd_and_hms(2025, 9, 30, 0, 0, 0).unwrap();

        engine.replace_baseline(3482.2e9, ts).unwrap();

        assert_eq!(engine.extrapolate(ts).total, 3482.2e9);
        assert_eq!(engine.rates(), &rate(engine.baseline()));
        assert_relative_eq!(engine.rates().per_year(), 3482.2e9 * 0.035, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_replace_keeps_state() {
        let mut engine = ProjectionEngine::default();
        let before = engine;

        let result = engine.replace_baseline(-5.0, Utc::now());

        assert_eq!(result, Err(ProjectionError::InvalidValue(-5.0)));
        assert_eq!(engine, before);
    }
}
