//! No-op cache implementation.

use async_trait::async_trait;
use energy_core::{CacheFreshness, CacheKey, DatasetTable, Result, TableCache};
use std::time::Duration;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get` and `freshness` return `Ok(None)` and `put` returns `Ok(())`.
/// Useful for disabling caching or testing code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TableCache for NoopCache {
    async fn get(&self, _key: &CacheKey, _max_age: Duration) -> Result<Option<DatasetTable>> {
        trace!("NoopCache: get called, returning None");
        Ok(None)
    }

    async fn put(&self, _key: &CacheKey, _table: &DatasetTable) -> Result<()> {
        trace!("NoopCache: put called, doing nothing");
        Ok(())
    }

    async fn freshness(&self, _key: &CacheKey) -> Result<Option<CacheFreshness>> {
        Ok(None)
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopCache: clear called, doing nothing");
        Ok(())
    }
}
