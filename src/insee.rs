//! INSEE series processing for baseline refreshes
//!
//! Turns saved responses of the INSEE BDM series API (debt-to-GDP ratio and
//! debt amount, quarterly) into two documents:
//! - `dette_data.json`: the recent quarterly history with metadata
//! - `dette_insee_latest.json`: the latest figure, in the format accepted by
//!   [`crate::projection::parse_baseline_document`]
//!
//! Fetching the responses is left to the caller.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Quarters kept in the history document
pub const HISTORY_QUARTERS: usize = 22;

/// Annual growth used when the history is too short to estimate one (%)
pub const FALLBACK_ANNUAL_RATE: f64 = 3.5;

/// INSEE publishes quarterly accounts about 90 days after the quarter ends
const PUBLICATION_LAG_DAYS: u64 = 90;

pub const HISTORY_FILE: &str = "dette_data.json";
pub const LATEST_FILE: &str = "dette_insee_latest.json";

const SOURCE: &str = "INSEE - Institut National de la Statistique";

#[derive(Debug, Error)]
pub enum InseeError {
    #[error("malformed INSEE response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("INSEE response contains no series")]
    NoSeries,

    #[error("invalid quarterly period `{0}`")]
    InvalidPeriod(String),

    #[error("invalid value `{value}` for period {period}")]
    InvalidValue { period: String, value: String },

    #[error("neither series could be read")]
    NoData,

    #[error("cannot write documents: {0}")]
    Io(#[from] std::io::Error),
}

/// One quarterly observation
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// INSEE period label, e.g. `2025-Q2`
    pub period: String,
    pub year: i32,
    pub quarter: u8,
    pub value: f64,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    series: Vec<RawSeries>,
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    periode: String,
    value: RawValue,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
}

/// Read the quarterly observations of the first series in a response
///
/// Non-quarterly periods (annual or monthly labels) are skipped.
pub fn parse_series_response(json: &str) -> Result<Vec<Observation>, InseeError> {
    let response: Response = serde_json::from_str(json)?;
    let series = response.series.into_iter().next().ok_or(InseeError::NoSeries)?;

    let mut observations = Vec::with_capacity(series.observations.len());
    for raw in series.observations {
        let Some((year, quarter)) = raw.periode.split_once("-Q") else {
            continue;
        };
        let year: i32 = year
            .parse()
            .map_err(|_| InseeError::InvalidPeriod(raw.periode.clone()))?;
        let quarter: u8 = quarter
            .parse()
            .ok()
            .filter(|q| (1..=4).contains(q))
            .ok_or_else(|| InseeError::InvalidPeriod(raw.periode.clone()))?;

        let value = match raw.value {
            RawValue::Number(v) => v,
            RawValue::Text(text) => text.trim().parse::<f64>().map_err(|_| {
                InseeError::InvalidValue {
                    period: raw.periode.clone(),
                    value: text.clone(),
                }
            })?,
        };

        observations.push(Observation {
            period: raw.periode,
            year,
            quarter,
            value,
        });
    }
    Ok(observations)
}

/// Debt ratio and amount for one quarter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedPeriod {
    pub period: String,
    /// Debt in percent of GDP
    #[serde(rename = "dette_pib")]
    pub debt_to_gdp: f64,
    /// Debt in billions of euros, 0 when the amount series lacks the period
    #[serde(rename = "dette_montant")]
    pub amount: f64,
}

/// Join the amount series onto the ratio series by period
pub fn combine(ratio: &[Observation], amounts: &[Observation]) -> Vec<CombinedPeriod> {
    let by_period: HashMap<&str, f64> = amounts
        .iter()
        .map(|o| (o.period.as_str(), o.value))
        .collect();

    ratio
        .iter()
        .map(|o| CombinedPeriod {
            period: o.period.clone(),
            debt_to_gdp: o.value,
            amount: by_period.get(o.period.as_str()).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Growth of the debt amount over the last four quarters, in percent
///
/// Falls back to [`FALLBACK_ANNUAL_RATE`] with fewer than five quarters or a
/// non-positive starting amount.
pub fn annual_growth_rate(periods: &[CombinedPeriod]) -> f64 {
    if periods.len() < 5 {
        return FALLBACK_ANNUAL_RATE;
    }
    let start = periods[periods.len() - 5].amount;
    let end = periods[periods.len() - 1].amount;
    if start > 0.0 {
        (end - start) / start * 100.0
    } else {
        FALLBACK_ANNUAL_RATE
    }
}

/// Increments of the latest document, in billions of euros
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speed {
    pub par_jour: f64,
    pub par_heure: f64,
    pub par_minute: f64,
}

/// Latest figure for the real-time counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestDocument {
    pub derniere_mise_a_jour: String,
    /// Billions of euros
    pub dette: f64,
    #[serde(rename = "dettePIB")]
    pub dette_pib: f64,
    pub periode: String,
    /// Percent per year
    pub taux_augmentation_annuel: f64,
    pub vitesse: Speed,
}

pub fn latest_document(
    periods: &[CombinedPeriod],
    generated_at: NaiveDateTime,
) -> Option<LatestDocument> {
    let last = periods.last()?;
    let rate = annual_growth_rate(periods);
    let per_day = last.amount * rate / 100.0 / 365.0;

    Some(LatestDocument {
        derniere_mise_a_jour: iso_timestamp(generated_at),
        dette: last.amount,
        dette_pib: last.debt_to_gdp,
        periode: last.period.clone(),
        taux_augmentation_annuel: round_to(rate, 2),
        vitesse: Speed {
            par_jour: round_to(per_day, 2),
            par_heure: round_to(per_day / 24.0, 4),
            par_minute: round_to(per_day / 24.0 / 60.0, 6),
        },
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMetadata {
    pub unite_montant: String,
    pub unite_pib: String,
    pub frequence: String,
    pub prochain_update: Option<String>,
}

/// Recent quarterly history for the charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryDocument {
    pub last_update: String,
    pub source: String,
    pub data: Vec<CombinedPeriod>,
    pub metadata: HistoryMetadata,
}

pub fn history_document(periods: &[CombinedPeriod], generated_at: NaiveDateTime) -> HistoryDocument {
    let keep_from = periods.len().saturating_sub(HISTORY_QUARTERS);
    HistoryDocument {
        last_update: iso_timestamp(generated_at),
        source: SOURCE.to_string(),
        data: periods[keep_from..].to_vec(),
        metadata: HistoryMetadata {
            unite_montant: "milliards_euros".to_string(),
            unite_pib: "pourcentage".to_string(),
            frequence: "trimestrielle".to_string(),
            prochain_update: next_publication(generated_at.date())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        },
    }
}

/// Expected date of the next quarterly publication
///
/// End of the current calendar quarter plus the publication lag.
pub fn next_publication(today: NaiveDate) -> Option<NaiveDate> {
    let (month, day) = match today.month() {
        1..=3 => (3, 31),
        4..=6 => (6, 30),
        7..=9 => (9, 30),
        _ => (12, 31),
    };
    NaiveDate::from_ymd_opt(today.year(), month, day)?
        .checked_add_days(Days::new(PUBLICATION_LAG_DAYS))
}

/// Both documents produced by a refresh
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshOutput {
    pub history: HistoryDocument,
    /// `None` when no quarter could be read
    pub latest: Option<LatestDocument>,
}

/// Build the documents from whichever series could be read
///
/// The ratio series drives the periods; a missing amount series yields zero
/// amounts.
pub fn refresh(
    ratio: Option<Vec<Observation>>,
    amounts: Option<Vec<Observation>>,
    generated_at: NaiveDateTime,
) -> Result<RefreshOutput, InseeError> {
    if ratio.is_none() && amounts.is_none() {
        return Err(InseeError::NoData);
    }
    if ratio.is_none() {
        warn!("Debt-to-GDP series unavailable; history will be empty");
    }

    let periods = combine(
        ratio.as_deref().unwrap_or_default(),
        amounts.as_deref().unwrap_or_default(),
    );
    Ok(RefreshOutput {
        history: history_document(&periods, generated_at),
        latest: latest_document(&periods, generated_at),
    })
}

impl RefreshOutput {
    /// Write the documents into `dir`, returning the written paths
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, InseeError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(2);

        let history_path = dir.join(HISTORY_FILE);
        fs::write(&history_path, serde_json::to_string_pretty(&self.history)?)?;
        info!(
            "{} updated: {} periods",
            history_path.display(),
            self.history.data.len()
        );
        written.push(history_path);

        if let Some(latest) = &self.latest {
            let latest_path = dir.join(LATEST_FILE);
            fs::write(&latest_path, serde_json::to_string_pretty(latest)?)?;
            info!(
                "{} updated: {} bn EUR/day",
                latest_path.display(),
                latest.vitesse.par_jour
            );
            written.push(latest_path);
        }

        Ok(written)
    }
}

fn iso_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
