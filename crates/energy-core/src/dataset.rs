//! Dataset definitions.
//!
//! A [`DatasetSpec`] pairs an [`Interval`] with a lookback window. The pipeline
//! runs over three fixed specs (see [`DatasetSpec::defaults`]).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{DataError, Result};
use crate::interval::Interval;
use crate::types::DatasetTable;

/// Identifier of a dataset spec (e.g. `hourly_1month`).
///
/// Restricted to lowercase ASCII letters, digits and `_`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatasetKey(String);

impl DatasetKey {
    /// Creates a dataset key.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] if the key is empty or contains
    /// characters outside `[a-z0-9_]`.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(DataError::InvalidParameter(format!(
                "Invalid dataset key: {key:?}"
            )));
        }
        Ok(Self(key))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DatasetKey {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for DatasetKey {
    type Error = DataError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<DatasetKey> for String {
    fn from(key: DatasetKey) -> Self {
        key.0
    }
}

/// Tables of one metric keyed by dataset.
pub type DatasetTables = BTreeMap<DatasetKey, DatasetTable>;

/// How far back a dataset reaches from the reference instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lookback {
    /// A rolling window of whole days ending now.
    Days(u32),
    /// Whole calendar months.
    Months {
        /// Number of months before the end month.
        months_back: u32,
        /// End at the start of the previous month instead of now.
        exclude_current_month: bool,
    },
}

/// Immutable description of one dataset granularity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Dataset identifier.
    pub key: DatasetKey,
    /// Interval requested from the API.
    pub interval: Interval,
    /// Lookback window.
    pub lookback: Lookback,
    /// Human-readable name.
    pub display_name: String,
    /// Short label for charts.
    pub short_name: String,
    /// Record count below which the dataset is considered thin.
    pub min_records: usize,
}

impl DatasetSpec {
    /// Key of the monthly dataset.
    pub const MONTHLY_24_MONTHS: &'static str = "monthly_24months";
    /// Key of the hourly dataset.
    pub const HOURLY_1_MONTH: &'static str = "hourly_1month";
    /// Key of the five-minute dataset.
    pub const FIVEMIN_1_WEEK: &'static str = "fivemin_1week";

    /// Creates a dataset spec.
    ///
    /// # Errors
    /// Returns an error if the key is invalid.
    pub fn new(
        key: &str,
        interval: Interval,
        lookback: Lookback,
        display_name: impl Into<String>,
        short_name: impl Into<String>,
        min_records: usize,
    ) -> Result<Self> {
        Ok(Self {
            key: DatasetKey::new(key)?,
            interval,
            lookback,
            display_name: display_name.into(),
            short_name: short_name.into(),
            min_records,
        })
    }

    /// The three fixed datasets: 24 months of monthly data, one month of
    /// hourly data and one week of five-minute data.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                key: DatasetKey(Self::MONTHLY_24_MONTHS.to_string()),
                interval: Interval::Monthly,
                lookback: Lookback::Months {
                    months_back: 23,
                    exclude_current_month: true,
                },
                display_name: "Monthly (24 Months)".to_string(),
                short_name: "Monthly".to_string(),
                min_records: 12,
            },
            Self {
                key: DatasetKey(Self::HOURLY_1_MONTH.to_string()),
                interval: Interval::Hourly,
                lookback: Lookback::Days(30),
                display_name: "Hourly (1 Month)".to_string(),
                short_name: "Hourly".to_string(),
                min_records: 24,
            },
            Self {
                key: DatasetKey(Self::FIVEMIN_1_WEEK.to_string()),
                interval: Interval::FiveMinute,
                lookback: Lookback::Days(7),
                display_name: "5-Minute (1 Week)".to_string(),
                short_name: "5-Minute".to_string(),
                // one day of five-minute intervals
                min_records: 288,
            },
        ]
    }

    /// Returns true if the table holds at least `min_records` rows.
    #[must_use]
    pub fn meets_minimum(&self, table: &DatasetTable) -> bool {
        table.len() >= self.min_records
    }
}
