//! Period-aligned series and the derived series built from them

use super::IndicatorError;
use serde::Serialize;

/// Named indicator values aligned on period labels
///
/// `periods` and `values` are parallel arrays of the same length, checked at
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    name: String,
    unit: String,
    source: String,
    periods: Vec<String>,
    values: Vec<f64>,
}

impl Series {
    pub fn new<P: Into<String>>(
        name: impl Into<String>,
        unit: impl Into<String>,
        source: impl Into<String>,
        periods: impl IntoIterator<Item = P>,
        values: Vec<f64>,
    ) -> Result<Self, IndicatorError> {
        let name = name.into();
        let periods: Vec<String> = periods.into_iter().map(Into::into).collect();
        if periods.len() != values.len() {
            return Err(IndicatorError::Misaligned {
                name,
                periods: periods.len(),
                values: values.len(),
            });
        }
        Ok(Self {
            name,
            unit: unit.into(),
            source: source.into(),
            periods,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(period, value)` pairs in period order
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.periods
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Most recent point, `None` for an empty series
    pub fn last(&self) -> Option<(&str, f64)> {
        self.points().last()
    }

    pub fn value_at(&self, period: &str) -> Option<f64> {
        self.points().find(|(p, _)| *p == period).map(|(_, v)| v)
    }

    /// Same data under a different label
    pub fn relabel(
        mut self,
        name: impl Into<String>,
        unit: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        self.name = name.into();
        self.unit = unit.into();
        self.source = source.into();
        self
    }

    fn check_aligned(&self, other: &Series) -> Result<(), IndicatorError> {
        if self.periods != other.periods {
            return Err(IndicatorError::PeriodMismatch {
                left: self.name.clone(),
                right: other.name.clone(),
            });
        }
        Ok(())
    }
}

/// Elementwise `minuend - subtrahend` over shared periods
///
/// The result is labelled `"<minuend> - <subtrahend>"` with the minuend's
/// unit and a `Calcul` source; use [`Series::relabel`] to rename it.
pub fn differential(minuend: &Series, subtrahend: &Series) -> Result<Series, IndicatorError> {
    minuend.check_aligned(subtrahend)?;

    let values = minuend
        .values
        .iter()
        .zip(&subtrahend.values)
        .map(|(a, b)| a - b)
        .collect();

    Ok(Series {
        name: format!("{} - {}", minuend.name, subtrahend.name),
        unit: minuend.unit.clone(),
        source: "Calcul".to_string(),
        periods: minuend.periods.clone(),
        values,
    })
}

/// Elementwise sum of several categories per period (stacked bar total)
pub fn schedule_total(categories: &[Series]) -> Result<Series, IndicatorError> {
    let (first, rest) = categories.split_first().ok_or(IndicatorError::Empty)?;

    let mut values = first.values.clone();
    for category in rest {
        first.check_aligned(category)?;
        for (total, v) in values.iter_mut().zip(&category.values) {
            *total += v;
        }
    }

    Ok(Series {
        name: "Total".to_string(),
        unit: first.unit.clone(),
        source: first.source.clone(),
        periods: first.periods.clone(),
        values,
    })
}

/// Group of series sharing the exact same periods, exported together
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    title: String,
    series: Vec<Series>,
}

impl Dataset {
    pub fn new(title: impl Into<String>, series: Vec<Series>) -> Result<Self, IndicatorError> {
        if let Some((first, rest)) = series.split_first() {
            for s in rest {
                first.check_aligned(s)?;
            }
        }
        Ok(Self {
            title: title.into(),
            series,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn periods(&self) -> &[String] {
        self.series.first().map(Series::periods).unwrap_or(&[])
    }
}
