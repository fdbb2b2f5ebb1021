//! Interval definitions for time series data.
//!
//! [`Interval`] is the bucket size requested from the upstream API. Its string
//! form is the code the API expects and the value stored in the `interval`
//! column of every observation row.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

/// Granularity of a time series as understood by the market data API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// Five-minute buckets.
    #[serde(rename = "5m")]
    FiveMinute,
    /// Hourly buckets.
    #[serde(rename = "1h")]
    Hourly,
    /// Daily buckets.
    #[serde(rename = "1d")]
    Daily,
    /// Weekly buckets.
    #[serde(rename = "7d")]
    Weekly,
    /// Calendar month buckets.
    #[serde(rename = "1M")]
    Monthly,
    /// Calendar quarter buckets.
    #[serde(rename = "3M")]
    Quarterly,
    /// Calendar year buckets.
    #[serde(rename = "1y")]
    Yearly,
}

impl Interval {
    /// Returns the API code for this interval (e.g. `"5m"`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FiveMinute => "5m",
            Self::Hourly => "1h",
            Self::Daily => "1d",
            Self::Weekly => "7d",
            Self::Monthly => "1M",
            Self::Quarterly => "3M",
            Self::Yearly => "1y",
        }
    }

    /// Returns true if this is an intraday interval.
    #[must_use]
    pub const fn is_intraday(&self) -> bool {
        matches!(self, Self::FiveMinute | Self::Hourly)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Case matters: "1m" would be one minute, "1M" one month.
        match s {
            "5m" => Ok(Self::FiveMinute),
            "1h" => Ok(Self::Hourly),
            "1d" => Ok(Self::Daily),
            "7d" => Ok(Self::Weekly),
            "1M" => Ok(Self::Monthly),
            "3M" => Ok(Self::Quarterly),
            "1y" => Ok(Self::Yearly),
            other => Err(DataError::InvalidParameter(format!(
                "Unknown interval: {other}"
            ))),
        }
    }
}
