#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/energy/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Caching implementations for energy dataset tables.
//!
//! This crate provides implementations of the [`TableCache`] trait from `energy-core`:
//!
//! - [`CsvFileCache`] - Persistent directory of CSV files (default)
//! - [`InMemoryCache`] - Simple in-memory cache for testing
//! - [`NoopCache`] - No-op cache that doesn't store anything

/// CSV file cache implementation.
pub mod file;
/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;

// Re-export the trait for convenience
pub use energy_core::TableCache;

// Re-export implementations
pub use file::CsvFileCache;
pub use memory::InMemoryCache;
pub use noop::NoopCache;
