//! Provider traits for fetching market data.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`NetworkDataProvider`] - Network-level time series (power, market value, ...)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use crate::{
    error::Result,
    interval::Interval,
    response::NetworkDataResponse,
    types::{Metric, NetworkCode},
};

/// Base trait for all data providers.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "OpenElectricity").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;

    /// Returns the intervals supported by this provider.
    fn supported_intervals(&self) -> &[Interval];
}

/// Parameters of one network data request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkDataRequest {
    /// Network to query.
    pub network: NetworkCode,
    /// Metrics to fetch.
    pub metrics: Vec<Metric>,
    /// Bucket size.
    pub interval: Interval,
    /// Inclusive start of the window.
    pub date_start: DateTime<Utc>,
    /// End of the window.
    pub date_end: DateTime<Utc>,
}

impl NetworkDataRequest {
    /// Creates a request for a single metric.
    #[must_use]
    pub fn new(
        network: NetworkCode,
        metric: Metric,
        interval: Interval,
        date_start: DateTime<Utc>,
        date_end: DateTime<Utc>,
    ) -> Self {
        Self {
            network,
            metrics: vec![metric],
            interval,
            date_start,
            date_end,
        }
    }
}

/// Provider for network-level time series.
///
/// Implementations issue one upstream call per request and return the raw
/// series tree; normalization happens in the caller.
#[async_trait]
pub trait NetworkDataProvider: DataProvider {
    /// Fetches network data for the request.
    async fn get_network_data(&self, request: &NetworkDataRequest) -> Result<NetworkDataResponse>;
}
