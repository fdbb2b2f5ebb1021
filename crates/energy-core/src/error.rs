//! Error types for data operations.
//!
//! This module defines [`DataError`] which covers all error cases that can occur
//! when fetching, normalizing, caching or summarizing energy market data.

use thiserror::Error;

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Network-related errors (connection failures, timeouts, HTTP status).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// Authentication failed for a provider.
    #[error("Authentication failed for provider {0}")]
    AuthenticationFailed(String),

    /// The upstream API answered but reported a failure.
    #[error("API error from {provider}: {message}")]
    Api {
        /// The provider that reported the error.
        provider: String,
        /// Message returned by the API.
        message: String,
    },

    /// Error decoding a payload from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A response point could not be turned into an observation row.
    #[error("Normalization error: {0}")]
    Normalization(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// A metric name outside the supported set.
    #[error("Invalid metric: {0}")]
    InvalidMetric(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Not enough data to carry out the requested computation.
    #[error("Insufficient data for {0}")]
    InsufficientData(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl DataError {
    /// Returns true for configuration errors, which must reach the caller
    /// instead of being contained per dataset.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidMetric(_) | Self::InvalidParameter(_))
    }
}

impl From<polars::prelude::PolarsError> for DataError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::Other(err.to_string())
    }
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors() {
        assert!(DataError::InvalidMetric("FOO".to_string()).is_configuration());
        assert!(DataError::InvalidParameter("x".to_string()).is_configuration());
        assert!(!DataError::Network("down".to_string()).is_configuration());
        assert!(!DataError::Normalization("bad point".to_string()).is_configuration());
    }

    #[test]
    fn test_display() {
        let err = DataError::InvalidMetric("VOLTAGE".to_string());
        assert_eq!(err.to_string(), "Invalid metric: VOLTAGE");
    }
}
