//! Cache trait for storing fetched dataset tables.
//!
//! This module defines the [`TableCache`] trait: a key-value store of
//! [`DatasetTable`]s keyed by (network, metric, dataset) with an age-based
//! freshness check. Backends live in the `energy-cache` crate.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::{
    dataset::DatasetKey,
    error::Result,
    types::{DatasetTable, Metric, NetworkCode},
};

/// Identity of a cache entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    /// Network code.
    pub network: NetworkCode,
    /// Metric.
    pub metric: Metric,
    /// Dataset key.
    pub dataset: DatasetKey,
}

impl CacheKey {
    /// Creates a cache key.
    #[must_use]
    pub const fn new(network: NetworkCode, metric: Metric, dataset: DatasetKey) -> Self {
        Self {
            network,
            metric,
            dataset,
        }
    }

    /// Returns the file stem `{NETWORK}_{METRIC}_{dataset}`.
    ///
    /// Network codes never contain `_` and no metric name followed by `_` is a
    /// prefix of another, so distinct keys always give distinct stems.
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("{}_{}_{}", self.network, self.metric.as_str(), self.dataset)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_stem())
    }
}

/// Age information of a stored entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheFreshness {
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// Age of the entry at the time of the check.
    pub age: TimeDelta,
}

impl CacheFreshness {
    /// Computes freshness of an entry created at `created_at`, seen at `now`.
    #[must_use]
    pub fn at(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            created_at,
            age: now.signed_duration_since(created_at),
        }
    }

    /// Returns true if the entry is older than `max_age`.
    ///
    /// An entry exactly `max_age` old is still fresh.
    #[must_use]
    pub fn is_expired(&self, max_age: Duration) -> bool {
        self.age > TimeDelta::from_std(max_age).unwrap_or(TimeDelta::MAX)
    }
}

/// Trait for caching fetched dataset tables.
///
/// At most one entry exists per [`CacheKey`]; `put` always replaces it.
#[async_trait]
pub trait TableCache: Send + Sync + fmt::Debug {
    /// Retrieves the table for `key` if an entry exists and is no older than
    /// `max_age`.
    ///
    /// Returns `Ok(Some(table))` on a fresh hit, `Ok(None)` on a miss.
    async fn get(&self, key: &CacheKey, max_age: Duration) -> Result<Option<DatasetTable>>;

    /// Stores `table` under `key`, replacing any previous entry.
    async fn put(&self, key: &CacheKey, table: &DatasetTable) -> Result<()>;

    /// Returns the age of the entry for `key`, or `Ok(None)` if absent.
    async fn freshness(&self, key: &CacheKey) -> Result<Option<CacheFreshness>>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
