//! Debt Clock - real-time public debt counter and debt-dynamics indicators
//!
//! This library provides:
//! - Linear extrapolation of the public debt from a published baseline
//! - Atomic baseline refresh from an external JSON document
//! - Debt-dynamics indicators (r-g differential, repayment schedule, OAT-Bund spread)
//! - CSV export of the tracked indicator series
//! - A repeating render timer driving a swappable presentation callback
//! - Offline processing of INSEE series into refreshed baseline documents

pub mod config;
pub mod format;
pub mod indicators;
pub mod insee;
pub mod projection;
pub mod ticker;

// Re-export commonly used types
pub use config::CounterConfig;
pub use indicators::{Dataset, IndicatorStore, Series};
pub use projection::{Baseline, Projection, ProjectionEngine, RateBundle};
pub use ticker::{spawn_ticker, EngineFeed, TickerHandle};
