#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/energy/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Energy market data pipeline.
//!
//! This crate ties the workspace together. It re-exports the core types,
//! cache backends, analytics and the OpenElectricity provider, and provides
//! an [`EnergyDataFetcher`] that fetches every configured dataset of a
//! metric through a cache, plus the [`AnalyticsReport`] built from the
//! fetched tables.

// Core types and traits
pub use energy_core::*;

// Cache implementations
pub use energy_cache::{CsvFileCache, InMemoryCache, NoopCache};

// Analytics
pub use energy_analytics::{
    DateRange, HourlyAverage, StatsSummary, TrendDirection, TrendSummary, analyze,
    analyze_frame, check_availability, hourly_profile, summarize, summarize_frame,
};

// Providers
pub use energy_openelectricity::OpenElectricityProvider;

/// TOML configuration.
pub mod config;
mod fetcher;
/// JSON analytics report.
pub mod report;

pub use config::{AppConfig, ConfigError};
pub use fetcher::{DEFAULT_CACHE_EXPIRY, EnergyDataFetcher, PowerAndMarket, ensure_not_empty};
pub use report::{AnalyticsReport, DatasetReport, Section};
