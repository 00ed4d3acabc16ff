//! Baseline documents published alongside the counter
//!
//! A baseline document is a small JSON object such as
//!
//! ```json
//! { "derniereMiseAJour": "2025-09-30", "dette": 3482.2, "tauxAugmentationAnnuel": 3.9 }
//! ```
//!
//! `dette` is expressed in billions of euros. Documents written by the INSEE
//! refresh carry extra fields (`dettePIB`, `periode`, `vitesse`) which are
//! ignored here.

use super::baseline::ProjectionError;
use super::EUROS_PER_BILLION;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Why a baseline document was rejected
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read baseline document: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed baseline document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("baseline document has no `{0}` field")]
    MissingField(&'static str),

    #[error("unrecognised date `{0}`")]
    InvalidDate(String),

    #[error(transparent)]
    Invalid(#[from] ProjectionError),
}

/// Validated content of a baseline document, in engine units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineUpdate {
    /// New baseline value in euros
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    /// Replacement annual rate in percent, when the document provides one
    pub annual_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BaselineDocument {
    derniere_mise_a_jour: Option<String>,
    dette: Option<f64>,
    taux_augmentation_annuel: Option<f64>,
}

/// Parse and validate a baseline document
pub fn parse_baseline_document(json: &str) -> Result<BaselineUpdate, LoadError> {
    let result = serde_json::from_str::<BaselineDocument>(json)
        .map_err(LoadError::from)
        .and_then(validate);
    if let Err(e) = &result {
        warn!("Rejected baseline document: {}", e);
    }
    result
}

/// Read a baseline document from disk, then parse it
pub fn read_baseline_document(path: impl AsRef<Path>) -> Result<BaselineUpdate, LoadError> {
    let json = fs::read_to_string(path)?;
    parse_baseline_document(&json)
}

fn validate(doc: BaselineDocument) -> Result<BaselineUpdate, LoadError> {
    let date = doc
        .derniere_mise_a_jour
        .ok_or(LoadError::MissingField("derniereMiseAJour"))?;
    let billions = doc.dette.ok_or(LoadError::MissingField("dette"))?;

    let timestamp = parse_timestamp(&date)?;
    let value = billions * EUROS_PER_BILLION;
    if !(value.is_finite() && value > 0.0) {
        return Err(ProjectionError::InvalidValue(value).into());
    }
    if let Some(rate) = doc.taux_augmentation_annuel {
        if !rate.is_finite() {
            return Err(ProjectionError::InvalidRate(rate).into());
        }
    }

    Ok(BaselineUpdate {
        value,
        timestamp,
        annual_rate: doc.taux_augmentation_annuel,
    })
}

/// Parse a date as found in baseline documents and configs
///
/// Accepts `YYYY-MM-DD` (midnight UTC), RFC 3339, and naive
/// `YYYY-MM-DDTHH:MM:SS[.f]`, which is taken as UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, LoadError> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(LoadError::InvalidDate(text.to_string()))
}
