#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/energy/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! OpenElectricity data provider.
//!
//! This crate provides an OpenElectricity provider that implements the
//! [`DataProvider`] and [`NetworkDataProvider`] traits from `energy-core`.
//!
//! # Example
//!
//! ```no_run
//! use energy_openelectricity::OpenElectricityProvider;
//! use energy_core::{Interval, Metric, NetworkCode, NetworkDataProvider, NetworkDataRequest};
//! use chrono::{TimeDelta, Utc};
//!
//! # async fn example() -> energy_core::Result<()> {
//! let provider = OpenElectricityProvider::from_env()?;
//! let end = Utc::now();
//! let request = NetworkDataRequest::new(
//!     NetworkCode::default(),
//!     Metric::Power,
//!     Interval::Hourly,
//!     end - TimeDelta::days(1),
//!     end,
//! );
//!
//! let response = provider.get_network_data(&request).await?;
//! println!("Fetched {} series", response.data.map_or(0, |d| d.len()));
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use energy_core::{
    DataError, DataProvider, Interval, NetworkDataProvider, NetworkDataRequest,
    NetworkDataResponse, NetworkSeries, Result,
};
use serde::Deserialize;
use tracing::debug;

/// OpenElectricity v4 API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openelectricity.org.au/v4";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENELECTRICITY_API_KEY";

/// Provider name used in errors and logs.
const PROVIDER_NAME: &str = "OpenElectricity";

/// User agent for HTTP requests.
const USER_AGENT: &str = concat!("energy-openelectricity/", env!("CARGO_PKG_VERSION"));

/// Layout of `date_start`/`date_end`; the API reads them as network time.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// OpenElectricity data provider.
///
/// Implements [`DataProvider`] and [`NetworkDataProvider`].
#[derive(Debug)]
pub struct OpenElectricityProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenElectricityProvider {
    /// Create a new provider with default settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(client, api_key))
    }

    /// Create a provider reading the API key from `OPENELECTRICITY_API_KEY`.
    ///
    /// # Errors
    /// Returns [`DataError::AuthenticationFailed`] if the variable is unset.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| DataError::AuthenticationFailed(format!("{PROVIDER_NAME} ({API_KEY_ENV} not set)")))?;
        Self::new(api_key)
    }

    /// Create a new provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the provider at another API root (e.g. a mock server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the network data URL for a request.
    fn build_url(&self, request: &NetworkDataRequest) -> String {
        let offset = request.network.market_offset();
        let start = request.date_start.with_timezone(&offset).format(DATE_FORMAT);
        let end = request.date_end.with_timezone(&offset).format(DATE_FORMAT);

        let metrics: String = request
            .metrics
            .iter()
            .map(|metric| format!("metrics={}&", metric.api_code()))
            .collect();

        format!(
            "{}/data/network/{}?{}interval={}&date_start={}&date_end={}",
            self.base_url,
            request.network.as_str(),
            metrics,
            request.interval.as_str(),
            start,
            end
        )
    }
}

impl DataProvider for OpenElectricityProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "OpenElectricity network data for the Australian electricity markets"
    }

    fn supported_intervals(&self) -> &[Interval] {
        &[
            Interval::FiveMinute,
            Interval::Hourly,
            Interval::Daily,
            Interval::Weekly,
            Interval::Monthly,
            Interval::Quarterly,
            Interval::Yearly,
        ]
    }
}

#[async_trait]
impl NetworkDataProvider for OpenElectricityProvider {
    async fn get_network_data(&self, request: &NetworkDataRequest) -> Result<NetworkDataResponse> {
        if request.date_start > request.date_end {
            return Err(DataError::InvalidParameter(format!(
                "Start {} is after end {}",
                request.date_start, request.date_end
            )));
        }
        if request.metrics.is_empty() {
            return Err(DataError::InvalidParameter(
                "At least one metric is required".to_string(),
            ));
        }

        let url = self.build_url(request);
        debug!("Fetching network data: {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(DataError::RateLimited {
                provider: PROVIDER_NAME.to_string(),
                retry_after,
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(DataError::AuthenticationFailed(PROVIDER_NAME.to_string()));
        }

        if !status.is_success() {
            return Err(DataError::Network(format!(
                "HTTP {} for {} {}",
                status, request.network, request.interval
            )));
        }

        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|e| DataError::Parse(e.to_string()))?;

        // Check for API-level errors
        if envelope.success == Some(false) || envelope.error.is_some() {
            return Err(DataError::Api {
                provider: PROVIDER_NAME.to_string(),
                message: envelope
                    .error
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }

        Ok(NetworkDataResponse {
            data: envelope.data,
        })
    }
}

// ============================================================================
// OpenElectricity API Response Types
// ============================================================================

/// Response envelope around the series list.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<Vec<NetworkSeries>>,
}
