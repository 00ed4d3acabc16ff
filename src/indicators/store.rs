//! Fixed indicator data behind the debt-dynamics panel

use super::export;
use super::series::{differential, schedule_total, Dataset, Series};
use super::spread::SpreadSnapshot;
use super::IndicatorError;
use chrono::NaiveDate;
use serde::Serialize;

const PCT: &str = "%";
const BILLIONS: &str = "Mds€";

/// Sign of the r-g differential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DebtDynamics {
    /// r - g <= 0: the snowball effect is under control
    Favorable,
    /// r - g > 0: a primary surplus is needed to stabilise the ratio
    Unfavorable,
}

impl DebtDynamics {
    pub fn from_differential(differential: f64) -> Self {
        if differential <= 0.0 {
            DebtDynamics::Favorable
        } else {
            DebtDynamics::Unfavorable
        }
    }
}

/// Most recent r, g and r-g values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferentialReading {
    pub period: String,
    pub r: f64,
    pub g: f64,
    pub differential: f64,
    pub dynamics: DebtDynamics,
}

/// Medium/long-term debt maturing each year, in billions of euros
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepaymentSchedule {
    nominal: Series,
    indexed: Series,
    /// Annual financing programme, in billions of euros
    financing_programme: f64,
}

impl RepaymentSchedule {
    pub fn new(
        nominal: Series,
        indexed: Series,
        financing_programme: f64,
    ) -> Result<Self, IndicatorError> {
        // Validates period alignment up front
        schedule_total(&[nominal.clone(), indexed.clone()])?;
        Ok(Self {
            nominal,
            indexed,
            financing_programme,
        })
    }

    pub fn nominal(&self) -> &Series {
        &self.nominal
    }

    pub fn indexed(&self) -> &Series {
        &self.indexed
    }

    pub fn financing_programme(&self) -> f64 {
        self.financing_programme
    }

    /// Stacked total per year
    pub fn total(&self) -> Result<Series, IndicatorError> {
        Ok(schedule_total(&[self.nominal.clone(), self.indexed.clone()])?
            .relabel("Total", BILLIONS, "AFT"))
    }

    /// Share of the annual financing programme taken by a year's maturities
    pub fn programme_share(&self, year_total: f64) -> Option<f64> {
        if self.financing_programme > 0.0 {
            Some(year_total / self.financing_programme)
        } else {
            None
        }
    }
}

/// In-memory indicator store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorStore {
    effective_rate: Series,
    nominal_growth: Series,
    schedule: RepaymentSchedule,
    spread: SpreadSnapshot,
}

impl IndicatorStore {
    pub fn new(
        effective_rate: Series,
        nominal_growth: Series,
        schedule: RepaymentSchedule,
        spread: SpreadSnapshot,
    ) -> Result<Self, IndicatorError> {
        differential(&effective_rate, &nominal_growth)?;
        Ok(Self {
            effective_rate,
            nominal_growth,
            schedule,
            spread,
        })
    }

    /// Published figures (general government, AFT programme, October 2025)
    pub fn france_2025() -> Result<Self, IndicatorError> {
        let years = ["2020", "2021", "2022", "2023", "2024", "2025"];
        // r: interest charge over average outstanding debt
        let effective_rate = Series::new(
            "Taux effectif (r)",
            PCT,
            "INSEE/DGTrésor",
            years,
            vec![1.4, 1.3, 1.5, 2.1, 2.4, 2.6],
        )?;
        // g: real growth plus inflation
        let nominal_growth = Series::new(
            "Croissance nominale (g)",
            PCT,
            "INSEE",
            years,
            vec![-2.8, 8.5, 5.8, 5.9, 3.2, 2.8],
        )?;

        let maturities = ["2025", "2026", "2027", "2028", "2029"];
        let schedule = RepaymentSchedule::new(
            Series::new(
                "OAT nominales",
                BILLIONS,
                "AFT",
                maturities,
                vec![145.8, 152.3, 148.6, 142.1, 138.5],
            )?,
            Series::new(
                "OAT indexées",
                BILLIONS,
                "AFT",
                maturities,
                vec![12.4, 14.2, 15.8, 13.6, 11.9],
            )?,
            285.0,
        )?;

        let spread = SpreadSnapshot {
            current: 0.78,
            mean_5y: 0.52,
            min_5y: 0.25,
            max_5y: 1.15,
            updated: NaiveDate::from_ymd_opt(2025, 10, 14)
                .expect("2025-10-14 is a valid calendar date"),
        };

        Self::new(effective_rate, nominal_growth, schedule, spread)
    }

    pub fn effective_rate(&self) -> &Series {
        &self.effective_rate
    }

    pub fn nominal_growth(&self) -> &Series {
        &self.nominal_growth
    }

    pub fn schedule(&self) -> &RepaymentSchedule {
        &self.schedule
    }

    pub fn spread(&self) -> &SpreadSnapshot {
        &self.spread
    }

    /// r - g for every period
    pub fn rate_differential(&self) -> Result<Series, IndicatorError> {
        Ok(differential(&self.effective_rate, &self.nominal_growth)?.relabel(
            "Différentiel (r-g)",
            PCT,
            "Calcul",
        ))
    }

    pub fn latest_differential(&self) -> Option<DifferentialReading> {
        let (period, r) = self.effective_rate.last()?;
        let (_, g) = self.nominal_growth.last()?;
        let differential = r - g;
        Some(DifferentialReading {
            period: period.to_string(),
            r,
            g,
            differential,
            dynamics: DebtDynamics::from_differential(differential),
        })
    }

    pub fn schedule_total(&self) -> Result<Series, IndicatorError> {
        self.schedule.total()
    }

    /// Exported groups: r-g inputs with their differential, then maturities
    pub fn datasets(&self) -> Result<Vec<Dataset>, IndicatorError> {
        Ok(vec![
            Dataset::new(
                "Différentiel r-g",
                vec![
                    self.effective_rate.clone(),
                    self.nominal_growth.clone(),
                    self.rate_differential()?,
                ],
            )?,
            Dataset::new(
                "Échéancier de remboursement",
                vec![self.schedule.nominal.clone(), self.schedule.indexed.clone()],
            )?,
        ])
    }

    pub fn export_csv(&self) -> Result<String, IndicatorError> {
        export::export_csv(&self.datasets()?)
    }
}
