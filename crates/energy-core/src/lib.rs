#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/energy/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the energy market data pipeline.
//!
//! This crate provides the foundational abstractions:
//!
//! - [`DataProvider`](provider::DataProvider) - Base trait for all providers
//! - [`NetworkDataProvider`](provider::NetworkDataProvider) - Network time series
//! - [`TableCache`](cache::TableCache) - Caching abstraction
//! - [`compute_range`](range::compute_range) - Date window per dataset
//! - [`normalize`](normalize::normalize) - Response flattening

/// Cache trait and keys.
pub mod cache;
/// Time sources.
pub mod clock;
/// Dataset specs and keys.
pub mod dataset;
/// Error types for data operations.
pub mod error;
/// API interval codes.
pub mod interval;
/// Response normalization.
pub mod normalize;
/// Provider traits for fetching market data.
pub mod provider;
/// Date window computation.
pub mod range;
/// Raw response tree.
pub mod response;
/// Core data types (NetworkCode, Metric, DatasetTable, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::{CacheFreshness, CacheKey, TableCache};
pub use clock::{Clock, FixedClock, SystemClock};
pub use dataset::{DatasetKey, DatasetSpec, DatasetTables, Lookback};
pub use error::{DataError, Result};
pub use interval::Interval;
pub use normalize::normalize;
pub use provider::{DataProvider, NetworkDataProvider, NetworkDataRequest};
pub use range::compute_range;
pub use response::{DataPoint, NetworkDataResponse, NetworkSeries, SeriesResult};
pub use types::{DatasetTable, Metric, NetworkCode, ObservationRow};
