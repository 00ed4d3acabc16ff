//! Projection engine for the real-time debt counter

mod baseline;
mod engine;
pub mod loader;

pub use baseline::{Baseline, ProjectionError};
pub use engine::{extrapolate, rate, Projection, ProjectionEngine, RateBundle};
pub use loader::{parse_baseline_document, BaselineUpdate, LoadError};

// ============================================================================
// Published baseline (INSEE, end of Q2 2025)
// ============================================================================
// The engine works in euros. Published figures and baseline documents carry
// billions of euros; the conversion is applied once, when a baseline is built.

/// Euros per billion, the unit of published debt figures
pub const EUROS_PER_BILLION: f64 = 1_000_000_000.0;

/// Debt at the reference date, in billions of euros (Q2 2025)
pub const DEFAULT_DEBT_BILLIONS: f64 = 3416.3;

/// Reference date of the published figure
pub const DEFAULT_BASELINE_DATE: &str = "2025-06-30";

/// Average annual increase of the debt, in percent
pub const DEFAULT_ANNUAL_RATE: f64 = 3.5;

/// Resident population used for the per-capita figure
pub const DEFAULT_POPULATION: u64 = 67_000_000;
