//! Dataset fetcher with cache-through and per-dataset failure containment.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use energy_analytics::check_availability;
use energy_core::{
    CacheKey, Clock, DataError, DatasetKey, DatasetSpec, DatasetTable, DatasetTables, Metric,
    NetworkCode, NetworkDataProvider, NetworkDataRequest, Result, SystemClock, TableCache,
    compute_range, normalize,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Default maximum age of a cache entry.
pub const DEFAULT_CACHE_EXPIRY: Duration = Duration::from_secs(60);

/// Fetches every configured dataset of a metric for one network.
///
/// Each dataset is looked up in the cache (when asked to), otherwise fetched
/// from the provider, normalized and written back to the cache. A dataset
/// whose fetch or normalization fails is logged and left out of the result;
/// only configuration errors abort a call.
///
/// # Example
///
/// ```rust,ignore
/// use energy::{EnergyDataFetcher, InMemoryCache, OpenElectricityProvider};
/// use std::sync::Arc;
///
/// let fetcher = EnergyDataFetcher::new(
///     Arc::new(OpenElectricityProvider::from_env()?),
///     Arc::new(InMemoryCache::new()),
/// );
/// let power = fetcher.fetch_all("POWER", true).await?;
/// ```
pub struct EnergyDataFetcher {
    provider: Arc<dyn NetworkDataProvider>,
    cache: Arc<dyn TableCache>,
    clock: Arc<dyn Clock>,
    network: NetworkCode,
    datasets: Vec<DatasetSpec>,
    cache_expiry: Duration,
}

impl std::fmt::Debug for EnergyDataFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnergyDataFetcher")
            .field("provider", &self.provider.name())
            .field("cache", &self.cache)
            .field("network", &self.network)
            .field(
                "datasets",
                &self
                    .datasets
                    .iter()
                    .map(|spec| spec.key.as_str())
                    .collect::<Vec<_>>(),
            )
            .field("cache_expiry", &self.cache_expiry)
            .finish()
    }
}

impl EnergyDataFetcher {
    /// Create a fetcher for the default network over the default datasets.
    #[must_use]
    pub fn new(provider: Arc<dyn NetworkDataProvider>, cache: Arc<dyn TableCache>) -> Self {
        Self {
            provider,
            cache,
            clock: Arc::new(SystemClock),
            network: NetworkCode::default(),
            datasets: DatasetSpec::defaults(),
            cache_expiry: DEFAULT_CACHE_EXPIRY,
        }
    }

    /// Set the network to fetch.
    #[must_use]
    pub fn with_network(mut self, network: NetworkCode) -> Self {
        self.network = network;
        self
    }

    /// Replace the dataset specs.
    #[must_use]
    pub fn with_datasets(mut self, datasets: Vec<DatasetSpec>) -> Self {
        self.datasets = datasets;
        self
    }

    /// Set the maximum age of cache entries.
    #[must_use]
    pub const fn with_cache_expiry(mut self, cache_expiry: Duration) -> Self {
        self.cache_expiry = cache_expiry;
        self
    }

    /// Compute date windows against `clock` instead of the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the network being fetched.
    #[must_use]
    pub const fn network(&self) -> &NetworkCode {
        &self.network
    }

    /// Returns the configured dataset specs.
    #[must_use]
    pub fn datasets(&self) -> &[DatasetSpec] {
        &self.datasets
    }

    /// Fetch every dataset for a metric given by name (e.g. `"POWER"`).
    ///
    /// # Errors
    /// Returns [`DataError::InvalidMetric`] for an unknown metric name and
    /// [`DataError::InvalidParameter`] for an unusable dataset lookback.
    /// Per-dataset fetch failures are not errors.
    pub async fn fetch_all(&self, metric: &str, use_cache: bool) -> Result<DatasetTables> {
        let metric = Metric::from_str(metric)?;
        self.fetch_metric(metric, use_cache).await
    }

    /// Fetch every dataset for a metric.
    ///
    /// Datasets are fetched one after another. The result holds only the
    /// datasets that produced a non-empty table.
    ///
    /// # Errors
    /// Returns an error only for configuration errors.
    #[instrument(skip(self), fields(network = %self.network))]
    pub async fn fetch_metric(&self, metric: Metric, use_cache: bool) -> Result<DatasetTables> {
        let mut tables = DatasetTables::new();

        for spec in &self.datasets {
            match self.fetch_dataset(spec, metric, use_cache).await {
                Ok(Some(table)) => {
                    if !spec.meets_minimum(&table) {
                        warn!(
                            dataset = %spec.key,
                            rows = table.len(),
                            min_records = spec.min_records,
                            "Dataset has fewer records than expected"
                        );
                    }
                    tables.insert(spec.key.clone(), table);
                }
                Ok(None) => {
                    warn!(dataset = %spec.key, "No data returned, dataset omitted");
                }
                Err(e) if e.is_configuration() => return Err(e),
                Err(e) => {
                    warn!(dataset = %spec.key, error = %e, "Fetch failed, dataset omitted");
                }
            }
        }

        info!(
            metric = %metric,
            datasets = tables.len(),
            of = self.datasets.len(),
            "Fetched datasets"
        );
        Ok(tables)
    }

    /// Fetch power and market value data in two independent passes.
    ///
    /// # Errors
    /// Returns an error only for configuration errors.
    pub async fn fetch_power_and_market(&self, use_cache: bool) -> Result<PowerAndMarket> {
        let power = self.fetch_metric(Metric::Power, use_cache).await?;
        let market_value = self.fetch_metric(Metric::MarketValue, use_cache).await?;
        Ok(PowerAndMarket {
            power,
            market_value,
        })
    }

    async fn fetch_dataset(
        &self,
        spec: &DatasetSpec,
        metric: Metric,
        use_cache: bool,
    ) -> Result<Option<DatasetTable>> {
        let key = CacheKey::new(self.network.clone(), metric, spec.key.clone());

        if use_cache {
            match self.cache.get(&key, self.cache_expiry).await {
                Ok(Some(table)) => {
                    debug!(key = %key, rows = table.len(), "Using cached data");
                    return Ok(Some(table));
                }
                Ok(None) => debug!(key = %key, "Cache miss"),
                Err(e) => warn!(key = %key, error = %e, "Cache lookup failed"),
            }
        }

        let (start, end) = compute_range(spec, self.clock.now(), self.network.market_offset())?;
        let request = NetworkDataRequest::new(self.network.clone(), metric, spec.interval, start, end);
        debug!(
            dataset = %spec.key,
            interval = %spec.interval,
            start = %start,
            end = %end,
            "Requesting network data"
        );

        let response = self.provider.get_network_data(&request).await?;
        let Some(table) = normalize(&response, spec)? else {
            return Ok(None);
        };

        if let Err(e) = self.cache.put(&key, &table).await {
            warn!(key = %key, error = %e, "Failed to cache dataset");
        }

        info!(dataset = %spec.key, rows = table.len(), "Fetched dataset");
        Ok(Some(table))
    }
}

/// Power and market value tables from one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PowerAndMarket {
    /// Power tables by dataset.
    pub power: DatasetTables,
    /// Market value tables by dataset.
    pub market_value: DatasetTables,
}

impl PowerAndMarket {
    /// Returns true if neither metric produced any dataset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.power.is_empty() && self.market_value.is_empty()
    }

    /// For each spec, whether both metrics have data.
    #[must_use]
    pub fn availability(&self, specs: &[DatasetSpec]) -> BTreeMap<DatasetKey, bool> {
        check_availability(&self.power, &self.market_value, specs)
    }

    /// Returns the tables keyed by metric.
    #[must_use]
    pub fn into_tables(self) -> BTreeMap<Metric, DatasetTables> {
        BTreeMap::from([
            (Metric::Power, self.power),
            (Metric::MarketValue, self.market_value),
        ])
    }
}

/// Returns [`DataError::InsufficientData`] if the run produced nothing.
///
/// # Errors
/// Returns an error when neither power nor market value data was fetched.
pub fn ensure_not_empty(data: &PowerAndMarket) -> Result<()> {
    if data.is_empty() {
        return Err(DataError::InsufficientData(
            "report: no power or market value data was fetched".to_string(),
        ));
    }
    Ok(())
}
