//! CSV file cache implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use energy_core::{
    CacheFreshness, CacheKey, Clock, DataError, DatasetTable, Result, SystemClock, TableCache,
};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Column holding the instant the table was fetched. Informational only.
pub const FETCH_TIMESTAMP_COLUMN: &str = "fetch_timestamp";
/// Column holding the dataset key of the table.
pub const DATASET_TYPE_COLUMN: &str = "dataset_type";

/// Directory-of-files cache for dataset tables.
///
/// Each [`CacheKey`] maps to `{dir}/{NETWORK}_{METRIC}_{dataset}.csv` holding
/// the tidy table plus the `fetch_timestamp` and `dataset_type` columns.
///
/// Freshness is measured from the file's creation time. Every `put` writes a
/// new file and renames it over the old one, so the creation time always
/// reflects the latest save. Filesystems that do not record creation time
/// make every lookup a miss.
#[derive(Debug)]
pub struct CsvFileCache {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl CsvFileCache {
    /// Create a cache rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            DataError::Cache(format!("Cannot create cache dir {}: {e}", dir.display()))
        })?;
        Ok(Self {
            dir,
            clock: Arc::new(SystemClock),
        })
    }

    /// Age entries against `clock` instead of the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file that holds the entry for `key`.
    #[must_use]
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.csv", key.file_stem()))
    }

    fn created_at(path: &Path) -> Result<DateTime<Utc>> {
        let created = fs::metadata(path)
            .and_then(|meta| meta.created())
            .map_err(|e| {
                DataError::Cache(format!("No creation time for {}: {e}", path.display()))
            })?;
        Ok(DateTime::<Utc>::from(created))
    }

    fn read_table(path: &Path) -> Result<DatasetTable> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| DataError::Cache(e.to_string()))?
            .finish()
            .map_err(|e| DataError::Cache(e.to_string()))?;

        DatasetTable::from_dataframe(&df)
    }

    fn write_table(&self, path: &Path, key: &CacheKey, table: &DatasetTable) -> Result<()> {
        let mut df = table.to_dataframe()?;
        let height = df.height();
        let fetched_at = self.clock.now().to_rfc3339();

        df.with_column(Column::new(
            FETCH_TIMESTAMP_COLUMN.into(),
            vec![fetched_at.as_str(); height],
        ))
        .map_err(|e| DataError::Cache(e.to_string()))?;
        df.with_column(Column::new(
            DATASET_TYPE_COLUMN.into(),
            vec![key.dataset.as_str(); height],
        ))
        .map_err(|e| DataError::Cache(e.to_string()))?;

        let tmp = path.with_extension("csv.tmp");
        {
            let mut file = File::create(&tmp).map_err(|e| DataError::Cache(e.to_string()))?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)
                .map_err(|e| DataError::Cache(e.to_string()))?;
        }

        // A fresh inode per save gives the entry a fresh creation time.
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            DataError::Cache(format!("Cannot replace {}: {e}", path.display()))
        })
    }
}

#[async_trait]
impl TableCache for CsvFileCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &CacheKey, max_age: Duration) -> Result<Option<DatasetTable>> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!(path = %path.display(), "Cache file does not exist");
            return Ok(None);
        }

        let created_at = match Self::created_at(&path) {
            Ok(created_at) => created_at,
            Err(e) => {
                warn!(error = %e, "Cannot age cache entry, treating as miss");
                return Ok(None);
            }
        };

        let freshness = CacheFreshness::at(created_at, self.clock.now());
        if freshness.is_expired(max_age) {
            debug!(
                age_secs = freshness.age.num_seconds(),
                max_age_secs = max_age.as_secs(),
                "Cache entry expired"
            );
            return Ok(None);
        }

        match Self::read_table(&path) {
            Ok(table) => {
                debug!("Loaded {} rows from cache", table.len());
                Ok(Some(table))
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Could not load cache entry");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, table), fields(key = %key, rows = table.len()))]
    async fn put(&self, key: &CacheKey, table: &DatasetTable) -> Result<()> {
        let path = self.path_for(key);
        self.write_table(&path, key, table)?;
        debug!(path = %path.display(), "Cached {} rows", table.len());
        Ok(())
    }

    async fn freshness(&self, key: &CacheKey) -> Result<Option<CacheFreshness>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let created_at = Self::created_at(&path)?;
        Ok(Some(CacheFreshness::at(created_at, self.clock.now())))
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn clear(&self) -> Result<()> {
        let entries = fs::read_dir(&self.dir).map_err(|e| DataError::Cache(e.to_string()))?;

        let mut removed = 0usize;
        for entry in entries {
            let path = entry.map_err(|e| DataError::Cache(e.to_string()))?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                fs::remove_file(&path).map_err(|e| DataError::Cache(e.to_string()))?;
                removed += 1;
            }
        }

        debug!("Removed {} cache files", removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use energy_core::{DatasetKey, FixedClock, Metric, NetworkCode, ObservationRow};
    use tempfile::TempDir;

    fn key(metric: Metric, dataset: &str) -> CacheKey {
        CacheKey::new(NetworkCode::default(), metric, DatasetKey::new(dataset).unwrap())
    }

    fn table(values: &[f64]) -> DatasetTable {
        let start = DateTime::parse_from_rfc3339("2024-01-01T00:00:00+10:00").unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                ObservationRow::new(
                    start + TimeDelta::hours(i as i64),
                    value,
                    "power",
                    "MW",
                    "1h",
                    "NEM",
                )
            })
            .collect()
    }

    /// Creation time is not recorded on every filesystem.
    fn supports_creation_time(dir: &TempDir) -> bool {
        let probe = dir.path().join("probe");
        fs::write(&probe, b"x").is_ok()
            && fs::metadata(&probe).and_then(|m| m.created()).is_ok()
    }

    #[tokio::test]
    async fn test_csv_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        if !supports_creation_time(&dir) {
            return;
        }
        let cache = CsvFileCache::new(dir.path()).unwrap();
        let key = key(Metric::Power, "hourly_1month");
        let saved = table(&[20_100.5, 20_250.25, 19_980.0]);

        assert!(cache.get(&key, Duration::MAX).await.unwrap().is_none());

        cache.put(&key, &saved).await.unwrap();

        let loaded = cache.get(&key, Duration::MAX).await.unwrap().unwrap();
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn test_csv_cache_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvFileCache::new(dir.path()).unwrap();
        let key = key(Metric::MarketValue, "fivemin_1week");

        cache.put(&key, &table(&[1.0, 2.0])).await.unwrap();

        let path = dir.path().join("NEM_MARKET_VALUE_fivemin_1week.csv");
        assert_eq!(cache.path_for(&key), path);

        let content = fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(
            header,
            "timestamp,value,metric,unit,interval,network,fetch_timestamp,dataset_type"
        );
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("fivemin_1week"));
        assert!(!dir.path().join("NEM_MARKET_VALUE_fivemin_1week.csv.tmp").exists());
    }

    #[tokio::test]
    async fn test_csv_cache_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        if !supports_creation_time(&dir) {
            return;
        }
        let cache = CsvFileCache::new(dir.path()).unwrap();
        let key = key(Metric::Power, "monthly_24months");

        cache.put(&key, &table(&[1.0, 2.0, 3.0])).await.unwrap();
        cache.put(&key, &table(&[9.0])).await.unwrap();

        let loaded = cache.get(&key, Duration::MAX).await.unwrap().unwrap();
        assert_eq!(loaded.values(), vec![9.0]);
    }

    #[tokio::test]
    async fn test_csv_cache_corrupt_file_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvFileCache::new(dir.path()).unwrap();
        let key = key(Metric::Power, "hourly_1month");

        fs::write(cache.path_for(&key), "not,a,cache\n1,2,3\n").unwrap();

        let result = cache.get(&key, Duration::MAX).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_csv_cache_expiry_boundary() {
        let dir = tempfile::tempdir().unwrap();
        if !supports_creation_time(&dir) {
            return;
        }
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let cache = CsvFileCache::new(dir.path())
            .unwrap()
            .with_clock(clock.clone());
        let key = key(Metric::Power, "hourly_1month");
        let expiry = Duration::from_secs(60);

        cache.put(&key, &table(&[1.0])).await.unwrap();
        let created_at = cache.freshness(&key).await.unwrap().unwrap().created_at;

        clock.set(created_at + TimeDelta::seconds(59));
        assert!(cache.get(&key, expiry).await.unwrap().is_some());

        clock.set(created_at + TimeDelta::seconds(61));
        assert!(cache.get(&key, expiry).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_csv_cache_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvFileCache::new(dir.path()).unwrap();
        let power = key(Metric::Power, "hourly_1month");
        let market = key(Metric::MarketValue, "hourly_1month");

        cache.put(&power, &table(&[1.0])).await.unwrap();
        cache.put(&market, &table(&[2.0])).await.unwrap();
        cache.clear().await.unwrap();

        assert!(!cache.path_for(&power).exists());
        assert!(!cache.path_for(&market).exists());
        assert!(cache.freshness(&power).await.unwrap().is_none());
    }
}
