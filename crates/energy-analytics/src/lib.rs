#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/energy/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Statistics and trend indicators over dataset tables.
//!
//! Every function is pure. Table inputs come from [`energy_core::DatasetTable`];
//! the `*_frame` variants accept any polars `DataFrame` with a `value` column.

/// Dataset availability checks.
pub mod availability;
mod frame;
/// Hour-of-day profile.
pub mod profile;
/// Descriptive statistics.
pub mod stats;
/// Trend indicators.
pub mod trend;

pub use availability::{check_availability, has_both};
pub use profile::{HourlyAverage, hourly_profile};
pub use stats::{DateRange, StatsSummary, summarize, summarize_frame};
pub use trend::{TrendDirection, TrendSummary, analyze, analyze_frame};
