//! Core data types for energy market data.
//!
//! This module defines the fundamental data structures:
//!
//! - [`NetworkCode`] - Electricity market/region identifier
//! - [`Metric`] - Supported market metrics
//! - [`ObservationRow`] - One sample of one metric
//! - [`DatasetTable`] - Ordered rows for one (network, metric, dataset)

use chrono::{DateTime, FixedOffset, Offset, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DataError, Result};

/// Default network code (Australian National Electricity Market).
pub const DEFAULT_NETWORK: &str = "NEM";

/// Column names of a tidy dataset table, in order.
pub const TABLE_COLUMNS: [&str; 6] = ["timestamp", "value", "metric", "unit", "interval", "network"];

/// An electricity market/region code.
///
/// Codes are uppercased on creation and restricted to ASCII alphanumerics so
/// that they can be embedded in cache file names unambiguously.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NetworkCode(String);

impl NetworkCode {
    /// Creates a network code, converting to uppercase.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] if the code is empty or contains
    /// anything other than ASCII letters and digits.
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into().to_uppercase();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DataError::InvalidParameter(format!(
                "Invalid network code: {code:?}"
            )));
        }
        Ok(Self(code))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the wall-clock offset the market settles in.
    ///
    /// NEM runs on AEST all year round and WEM on AWST; unknown networks fall
    /// back to UTC.
    #[must_use]
    pub fn market_offset(&self) -> FixedOffset {
        let hours = match self.0.as_str() {
            "NEM" => 10,
            "WEM" => 8,
            _ => 0,
        };
        FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix())
    }
}

impl Default for NetworkCode {
    fn default() -> Self {
        Self(DEFAULT_NETWORK.to_string())
    }
}

impl fmt::Display for NetworkCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NetworkCode {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for NetworkCode {
    type Error = DataError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<NetworkCode> for String {
    fn from(code: NetworkCode) -> Self {
        code.0
    }
}

/// A market metric that can be requested from the data API.
///
/// Parsing is exhaustive and fails closed: any name outside this set is a
/// [`DataError::InvalidMetric`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Metric {
    /// Instantaneous power (MW).
    Power,
    /// Energy over the interval (MWh).
    Energy,
    /// Spot price ($/MWh).
    Price,
    /// Market value of generation ($).
    MarketValue,
    /// Emissions volume (tCO2e).
    Emissions,
    /// Share of renewable generation (%).
    RenewableProportion,
}

impl Metric {
    /// All supported metrics.
    pub const ALL: [Self; 6] = [
        Self::Power,
        Self::Energy,
        Self::Price,
        Self::MarketValue,
        Self::Emissions,
        Self::RenewableProportion,
    ];

    /// Returns the upper-case metric name (e.g. `"MARKET_VALUE"`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Power => "POWER",
            Self::Energy => "ENERGY",
            Self::Price => "PRICE",
            Self::MarketValue => "MARKET_VALUE",
            Self::Emissions => "EMISSIONS",
            Self::RenewableProportion => "RENEWABLE_PROPORTION",
        }
    }

    /// Returns the code the API expects in its `metrics` parameter.
    #[must_use]
    pub const fn api_code(&self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Energy => "energy",
            Self::Price => "price",
            Self::MarketValue => "market_value",
            Self::Emissions => "emissions",
            Self::RenewableProportion => "renewable_proportion",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "POWER" => Ok(Self::Power),
            "ENERGY" => Ok(Self::Energy),
            "PRICE" => Ok(Self::Price),
            "MARKET_VALUE" => Ok(Self::MarketValue),
            "EMISSIONS" => Ok(Self::Emissions),
            "RENEWABLE_PROPORTION" => Ok(Self::RenewableProportion),
            _ => Err(DataError::InvalidMetric(s.to_string())),
        }
    }
}

/// A single sample of one metric.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    /// Start of the interval, in the offset reported by the API.
    pub timestamp: DateTime<FixedOffset>,
    /// Observed value.
    pub value: f64,
    /// Metric name as reported by the series.
    pub metric: String,
    /// Unit of `value` (e.g. "MW").
    pub unit: String,
    /// Interval code of the dataset (e.g. "5m").
    pub interval: String,
    /// Network code as reported by the series.
    pub network: String,
}

impl ObservationRow {
    /// Creates a new observation row.
    #[must_use]
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        value: f64,
        metric: impl Into<String>,
        unit: impl Into<String>,
        interval: impl Into<String>,
        network: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            value,
            metric: metric.into(),
            unit: unit.into(),
            interval: interval.into(),
            network: network.into(),
        }
    }
}

/// Ordered observation rows for one (network, metric, dataset) triple.
///
/// Rows are kept sorted ascending by timestamp; construction performs a
/// stable sort so rows sharing a timestamp keep their input order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetTable {
    rows: Vec<ObservationRow>,
}

impl DatasetTable {
    /// Creates a table from rows, sorting them by timestamp.
    #[must_use]
    pub fn new(mut rows: Vec<ObservationRow>) -> Self {
        rows.sort_by_key(|row| row.timestamp);
        Self { rows }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the rows in timestamp order.
    #[must_use]
    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    /// Returns an iterator over the rows.
    pub fn iter(&self) -> impl Iterator<Item = &ObservationRow> {
        self.rows.iter()
    }

    /// Returns the values in table order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.value).collect()
    }

    /// Consumes the table and returns the underlying rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<ObservationRow> {
        self.rows
    }

    /// Returns the time range covered by the table.
    #[must_use]
    pub fn time_range(&self) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        let first = self.rows.first()?;
        let last = self.rows.last()?;
        Some((first.timestamp, last.timestamp))
    }

    /// Converts the table into a tidy DataFrame.
    ///
    /// Columns: timestamp (RFC 3339 string), value, metric, unit, interval, network.
    ///
    /// # Errors
    /// Returns an error if the DataFrame cannot be assembled.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let timestamps: Vec<String> = self
            .rows
            .iter()
            .map(|row| row.timestamp.to_rfc3339())
            .collect();
        let values: Vec<f64> = self.values();
        let metrics: Vec<&str> = self.rows.iter().map(|row| row.metric.as_str()).collect();
        let units: Vec<&str> = self.rows.iter().map(|row| row.unit.as_str()).collect();
        let intervals: Vec<&str> = self.rows.iter().map(|row| row.interval.as_str()).collect();
        let networks: Vec<&str> = self.rows.iter().map(|row| row.network.as_str()).collect();

        let df = DataFrame::new(vec![
            Column::new("timestamp".into(), timestamps),
            Column::new("value".into(), values),
            Column::new("metric".into(), metrics),
            Column::new("unit".into(), units),
            Column::new("interval".into(), intervals),
            Column::new("network".into(), networks),
        ])?;

        Ok(df)
    }

    /// Reconstitutes a table from a tidy DataFrame.
    ///
    /// Extra columns are ignored. Missing text cells become empty strings.
    ///
    /// # Errors
    /// Returns [`DataError::Parse`] if a required column is missing, a value
    /// is null or a timestamp is not RFC 3339.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        for name in TABLE_COLUMNS {
            if df.column(name).is_err() {
                return Err(DataError::Parse(format!("Missing column: {name}")));
            }
        }

        let df = df
            .clone()
            .lazy()
            .with_columns([
                col("timestamp").cast(DataType::String),
                col("value").cast(DataType::Float64),
                col("metric").cast(DataType::String),
                col("unit").cast(DataType::String),
                col("interval").cast(DataType::String),
                col("network").cast(DataType::String),
            ])
            .collect()?;

        let timestamps = df.column("timestamp")?.str()?;
        let values = df.column("value")?.f64()?;
        let metrics = df.column("metric")?.str()?;
        let units = df.column("unit")?.str()?;
        let intervals = df.column("interval")?.str()?;
        let networks = df.column("network")?.str()?;

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let raw_ts = timestamps
                .get(i)
                .ok_or_else(|| DataError::Parse(format!("Missing timestamp in row {i}")))?;
            let timestamp = DateTime::parse_from_rfc3339(raw_ts)
                .map_err(|e| DataError::Parse(format!("Bad timestamp {raw_ts:?}: {e}")))?;
            let value = values
                .get(i)
                .ok_or_else(|| DataError::Parse(format!("Missing value in row {i}")))?;

            rows.push(ObservationRow::new(
                timestamp,
                value,
                metrics.get(i).unwrap_or_default(),
                units.get(i).unwrap_or_default(),
                intervals.get(i).unwrap_or_default(),
                networks.get(i).unwrap_or_default(),
            ));
        }

        Ok(Self::new(rows))
    }
}

impl IntoIterator for DatasetTable {
    type Item = ObservationRow;
    type IntoIter = std::vec::IntoIter<ObservationRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl FromIterator<ObservationRow> for DatasetTable {
    fn from_iter<I: IntoIterator<Item = ObservationRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn row(timestamp: &str, value: f64) -> ObservationRow {
        ObservationRow::new(ts(timestamp), value, "power", "MW", "1h", "NEM")
    }

    #[test]
    fn test_network_code() {
        let code = NetworkCode::new("nem").unwrap();
        assert_eq!(code.as_str(), "NEM");
        assert_eq!(NetworkCode::default(), code);
        assert!(NetworkCode::new("").is_err());
        assert!(NetworkCode::new("NEM_X").is_err());
        assert!(NetworkCode::new("../etc").is_err());
    }

    #[test]
    fn test_market_offset() {
        let nem = NetworkCode::new("NEM").unwrap();
        assert_eq!(nem.market_offset().local_minus_utc(), 10 * 3600);
        let wem = NetworkCode::new("WEM").unwrap();
        assert_eq!(wem.market_offset().local_minus_utc(), 8 * 3600);
        let other = NetworkCode::new("AU1").unwrap();
        assert_eq!(other.market_offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("POWER".parse::<Metric>().unwrap(), Metric::Power);
        assert_eq!("market_value".parse::<Metric>().unwrap(), Metric::MarketValue);
        assert_eq!(Metric::MarketValue.api_code(), "market_value");
        assert_eq!(Metric::MarketValue.to_string(), "MARKET_VALUE");

        let err = "VOLTAGE".parse::<Metric>().unwrap_err();
        assert!(matches!(err, DataError::InvalidMetric(ref m) if m == "VOLTAGE"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_metric_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(metric.as_str().parse::<Metric>().unwrap(), metric);
        }
    }

    #[test]
    fn test_table_sorted_on_creation() {
        let table = DatasetTable::new(vec![
            row("2024-01-01T02:00:00+10:00", 3.0),
            row("2024-01-01T00:00:00+10:00", 1.0),
            row("2024-01-01T01:00:00+10:00", 2.0),
        ]);

        assert_eq!(table.values(), vec![1.0, 2.0, 3.0]);
        let (start, end) = table.time_range().unwrap();
        assert_eq!(start, ts("2024-01-01T00:00:00+10:00"));
        assert_eq!(end, ts("2024-01-01T02:00:00+10:00"));
    }

    #[test]
    fn test_empty_table() {
        let table = DatasetTable::default();
        assert!(table.is_empty());
        assert!(table.time_range().is_none());
        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 0);
    }

    #[test]
    fn test_dataframe_round_trip() {
        let table = DatasetTable::new(vec![
            row("2024-03-01T00:00:00+10:00", 100.5),
            row("2024-03-01T01:00:00+10:00", 101.25),
        ]);

        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), TABLE_COLUMNS.len());

        let back = DatasetTable::from_dataframe(&df).unwrap();
        assert_eq!(back, table);
        assert_eq!(back.rows()[0].timestamp.offset().local_minus_utc(), 36000);
    }

    #[test]
    fn test_from_dataframe_missing_column() {
        let df = DataFrame::new(vec![
            Column::new("timestamp".into(), vec!["2024-01-01T00:00:00+00:00"]),
            Column::new("value".into(), vec![1.0]),
        ])
        .unwrap();

        let err = DatasetTable::from_dataframe(&df).unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }

    #[test]
    fn test_from_dataframe_bad_timestamp() {
        let df = DataFrame::new(vec![
            Column::new("timestamp".into(), vec!["yesterday"]),
            Column::new("value".into(), vec![1.0]),
            Column::new("metric".into(), vec!["power"]),
            Column::new("unit".into(), vec!["MW"]),
            Column::new("interval".into(), vec!["1h"]),
            Column::new("network".into(), vec!["NEM"]),
        ])
        .unwrap();

        assert!(DatasetTable::from_dataframe(&df).is_err());
    }
}
