//! Debt-dynamics indicators and their CSV export

mod export;
mod series;
pub mod spread;
mod store;

pub use export::{export_csv, export_file_name, write_csv, CSV_HEADER};
pub use series::{differential, schedule_total, Dataset, Series};
pub use spread::{SpreadLevel, SpreadSnapshot};
pub use store::{DebtDynamics, DifferentialReading, IndicatorStore, RepaymentSchedule};

use thiserror::Error;

/// Misaligned or missing indicator data
#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("series `{name}` has {periods} periods but {values} values")]
    Misaligned {
        name: String,
        periods: usize,
        values: usize,
    },

    #[error("series `{left}` and `{right}` do not share the same periods")]
    PeriodMismatch { left: String, right: String },

    #[error("no series to combine")]
    Empty,

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV export failed: {0}")]
    Io(#[from] std::io::Error),
}
