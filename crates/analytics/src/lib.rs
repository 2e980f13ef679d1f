//! # vendstat Descriptive Statistics
//!
//! This crate turns a numeric sample (order amounts, daily order counts) into
//! the fixed battery of descriptive measures the rest of the engine builds on.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O and no knowledge of where samples come from. It
//!   depends only on `core-types`.
//! - **Stateless calculation:** `StatisticsCalculator` holds no state; every
//!   result is a function of the sample passed in.
//!
//! ## Public API
//!
//! - `StatisticsCalculator`: descriptive statistics, percentiles, Tukey
//!   outliers, mean confidence intervals, robust statistics, correlation.
//! - `summary`: interpretation, alerts, data quality and period comparison.
//! - `math`: the slice-level helpers, reused by the fitter and the insight
//!   generator.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod math;
pub mod report;
pub mod summary;
pub mod zscore;

// Re-export the key components to create a clean, public-facing API.
pub use engine::StatisticsCalculator;
pub use error::AnalyticsError;
pub use report::{
    ConfidenceInterval, DescriptiveStatistics, OutlierReport, PercentileValue, RobustStatistics,
};
pub use summary::{DescriptiveSummary, PeriodComparison, SummaryRequest, compare_periods};
