//! JSON analytics report.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use energy_analytics::{
    HourlyAverage, StatsSummary, TrendSummary, analyze, check_availability, hourly_profile,
    summarize,
};
use energy_core::{
    DataError, DatasetKey, DatasetSpec, DatasetTables, Metric, NetworkCode, Result,
};
use serde::Serialize;
use tracing::{debug, warn};

/// A computed value, or the reason it could not be computed.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Section<T> {
    /// The computation succeeded.
    Ready(T),
    /// The computation failed.
    Failed {
        /// Error message.
        error: String,
    },
}

impl<T> Section<T> {
    /// Returns the value, if computed.
    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Failed { .. } => None,
        }
    }
}

/// Analytics of one dataset of one metric.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetReport {
    /// Human-readable dataset name.
    pub display_name: String,
    /// Number of rows.
    pub records: usize,
    /// Descriptive statistics.
    pub stats: Section<StatsSummary>,
    /// Trend indicators.
    pub trend: TrendSummary,
}

/// Analytics of one run, ready to serialize.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalyticsReport {
    /// Network the data belongs to.
    pub network: NetworkCode,
    /// When the report was built.
    pub generated_at: DateTime<Utc>,
    /// Per metric, per dataset analytics.
    pub metrics: BTreeMap<Metric, BTreeMap<DatasetKey, DatasetReport>>,
    /// Whether each dataset has both power and market value data.
    pub availability: BTreeMap<DatasetKey, bool>,
    /// Hour-of-day profile of each metric's hourly dataset.
    pub hourly_profiles: BTreeMap<Metric, Vec<HourlyAverage>>,
    /// Total records per metric across datasets.
    pub totals: BTreeMap<Metric, usize>,
}

impl AnalyticsReport {
    /// Builds the report from fetched tables.
    ///
    /// Datasets are reported in `specs` order; specs without a table are
    /// skipped. A failed statistic is recorded in place and does not affect
    /// its siblings.
    #[must_use]
    pub fn build(
        network: NetworkCode,
        generated_at: DateTime<Utc>,
        tables: &BTreeMap<Metric, DatasetTables>,
        specs: &[DatasetSpec],
    ) -> Self {
        let mut metrics = BTreeMap::new();
        let mut hourly_profiles = BTreeMap::new();
        let mut totals = BTreeMap::new();

        for (&metric, datasets) in tables {
            let mut reports = BTreeMap::new();
            for spec in specs {
                let Some(table) = datasets.get(&spec.key) else {
                    continue;
                };
                let stats = match summarize(table) {
                    Ok(stats) => Section::Ready(stats),
                    Err(e) => {
                        warn!(metric = %metric, dataset = %spec.key, error = %e, "Statistics failed");
                        Section::Failed {
                            error: e.to_string(),
                        }
                    }
                };
                reports.insert(
                    spec.key.clone(),
                    DatasetReport {
                        display_name: spec.display_name.clone(),
                        records: table.len(),
                        stats,
                        trend: analyze(table),
                    },
                );
            }

            if let Some(hourly) = datasets
                .iter()
                .find(|(key, _)| key.as_str() == DatasetSpec::HOURLY_1_MONTH)
                .map(|(_, table)| table)
            {
                hourly_profiles.insert(metric, hourly_profile(hourly));
            }

            totals.insert(metric, datasets.values().map(|t| t.len()).sum());
            metrics.insert(metric, reports);
        }

        let none = DatasetTables::new();
        let availability = check_availability(
            tables.get(&Metric::Power).unwrap_or(&none),
            tables.get(&Metric::MarketValue).unwrap_or(&none),
            specs,
        );

        Self {
            network,
            generated_at,
            metrics,
            availability,
            hourly_profiles,
            totals,
        }
    }

    /// Serializes the report as pretty JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| DataError::Parse(e.to_string()))
    }

    /// Writes the report to `path`, creating parent directories.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                DataError::Other(format!("Cannot create {}: {e}", parent.display()))
            })?;
        }
        fs::write(path, json)
            .map_err(|e| DataError::Other(format!("Cannot write {}: {e}", path.display())))?;
        debug!(path = %path.display(), "Wrote analytics report");
        Ok(())
    }
}
