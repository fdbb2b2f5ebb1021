//! Response tree returned by network data providers.
//!
//! The upstream API nests data as series → results → points. Points are kept
//! as raw JSON arrays so that [`normalize`](crate::normalize::normalize) is the
//! single place where timestamps and values are validated.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A network data response: zero or more series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDataResponse {
    /// Series in the response, absent when the API returned nothing.
    #[serde(default)]
    pub data: Option<Vec<NetworkSeries>>,
}

impl NetworkDataResponse {
    /// Creates a response from series.
    #[must_use]
    pub fn new(series: Vec<NetworkSeries>) -> Self {
        Self { data: Some(series) }
    }

    /// Creates a response without any series.
    #[must_use]
    pub const fn empty() -> Self {
        Self { data: None }
    }
}

/// One metric series for a network.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSeries {
    /// Network the series belongs to.
    pub network_code: String,
    /// Metric name as reported by the API (e.g. "power").
    pub metric: String,
    /// Unit of the values (e.g. "MW").
    #[serde(default)]
    pub unit: String,
    /// Interval code reported by the API.
    #[serde(default)]
    pub interval: Option<String>,
    /// Result groups of the series.
    #[serde(default)]
    pub results: Option<Vec<SeriesResult>>,
}

/// A group of points within a series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesResult {
    /// Result name (e.g. "power_NEM").
    #[serde(default)]
    pub name: Option<String>,
    /// Raw data points.
    #[serde(default)]
    pub data: Vec<DataPoint>,
}

/// A raw `[timestamp, value]` point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataPoint(pub Vec<Value>);

impl DataPoint {
    /// Creates a well-formed point from a timestamp string and a value.
    #[must_use]
    pub fn new(timestamp: impl Into<String>, value: f64) -> Self {
        Self(vec![Value::String(timestamp.into()), Value::from(value)])
    }
}
