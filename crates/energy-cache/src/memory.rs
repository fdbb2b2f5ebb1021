//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use energy_core::{CacheFreshness, CacheKey, Clock, DatasetTable, Result, SystemClock, TableCache};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with timestamp for age-based freshness.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    const fn new(data: T, cached_at: DateTime<Utc>) -> Self {
        Self { data, cached_at }
    }
}

/// Simple in-memory cache for testing and development.
///
/// Tables are stored in a `RwLock`-protected `HashMap` and are lost when the
/// cache is dropped. Tables are cloned on get/put operations.
#[derive(Debug)]
pub struct InMemoryCache {
    tables: RwLock<HashMap<CacheKey, CacheEntry<DatasetTable>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a new empty in-memory cache that ages entries against `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Returns the number of stored entries.
    pub async fn len(&self) -> usize {
        self.tables.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.tables.read().await.is_empty()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableCache for InMemoryCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &CacheKey, max_age: Duration) -> Result<Option<DatasetTable>> {
        let cache = self.tables.read().await;
        match cache.get(key) {
            Some(entry) => {
                if CacheFreshness::at(entry.cached_at, self.clock.now()).is_expired(max_age) {
                    debug!("Cache entry expired");
                    return Ok(None);
                }
                debug!("Cache hit for {} rows", entry.data.len());
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, table), fields(key = %key, rows = table.len()))]
    async fn put(&self, key: &CacheKey, table: &DatasetTable) -> Result<()> {
        let mut cache = self.tables.write().await;
        cache.insert(key.clone(), CacheEntry::new(table.clone(), self.clock.now()));
        debug!("Cached {} rows", table.len());
        Ok(())
    }

    async fn freshness(&self, key: &CacheKey) -> Result<Option<CacheFreshness>> {
        let cache = self.tables.read().await;
        Ok(cache
            .get(key)
            .map(|entry| CacheFreshness::at(entry.cached_at, self.clock.now())))
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.tables.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta, TimeZone};
    use energy_core::{DatasetKey, FixedClock, Metric, NetworkCode, ObservationRow};

    fn key(metric: Metric) -> CacheKey {
        CacheKey::new(
            NetworkCode::default(),
            metric,
            DatasetKey::new("hourly_1month").unwrap(),
        )
    }

    fn table() -> DatasetTable {
        let ts = DateTime::parse_from_rfc3339("2024-01-02T00:00:00+10:00").unwrap();
        DatasetTable::new(vec![
            ObservationRow::new(ts, 20_000.0, "power", "MW", "1h", "NEM"),
            ObservationRow::new(ts + TimeDelta::hours(1), 21_000.0, "power", "MW", "1h", "NEM"),
        ])
    }

    #[tokio::test]
    async fn test_memory_cache_round_trip() {
        let cache = InMemoryCache::new();
        let key = key(Metric::Power);

        // Initially no data
        assert!(cache.get(&key, Duration::MAX).await.unwrap().is_none());
        assert!(cache.freshness(&key).await.unwrap().is_none());

        cache.put(&key, &table()).await.unwrap();

        let result = cache.get(&key, Duration::MAX).await.unwrap();
        assert_eq!(result, Some(table()));

        // Different metric, different entry
        assert!(cache.get(&self::key(Metric::MarketValue), Duration::MAX).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_overwrites() {
        let cache = InMemoryCache::new();
        let key = key(Metric::Power);

        cache.put(&key, &table()).await.unwrap();
        cache.put(&key, &DatasetTable::default()).await.unwrap();

        assert_eq!(cache.len().await, 1);
        let result = cache.get(&key, Duration::MAX).await.unwrap().unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_memory_cache_freshness_boundary() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(t0));
        let cache = InMemoryCache::with_clock(clock.clone());
        let key = key(Metric::Power);
        let expiry = Duration::from_secs(60);

        cache.put(&key, &table()).await.unwrap();

        clock.set(t0 + TimeDelta::seconds(59));
        assert!(cache.get(&key, expiry).await.unwrap().is_some());

        clock.set(t0 + TimeDelta::seconds(61));
        assert!(cache.get(&key, expiry).await.unwrap().is_none());

        let freshness = cache.freshness(&key).await.unwrap().unwrap();
        assert_eq!(freshness.created_at, t0);
        assert_eq!(freshness.age, TimeDelta::seconds(61));
    }

    #[tokio::test]
    async fn test_memory_cache_clear() {
        let cache = InMemoryCache::new();
        let key = key(Metric::Power);

        cache.put(&key, &table()).await.unwrap();
        cache.clear().await.unwrap();

        assert!(cache.is_empty().await);
        assert!(cache.get(&key, Duration::MAX).await.unwrap().is_none());
    }
}
