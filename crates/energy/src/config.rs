//! Pipeline configuration loaded from TOML.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use energy_core::{Metric, NetworkCode};
use energy_openelectricity::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};

/// Config file read when no path is given, if it exists.
pub const DEFAULT_CONFIG_PATH: &str = "energy.toml";

/// Pipeline settings. Every field has a default, so an empty file is valid.
///
/// ```toml
/// network = "NEM"
/// cache_dir = "data"
/// cache_expiry_minutes = 1
/// metrics = ["POWER", "MARKET_VALUE"]
/// output = "docs/analytics_report.json"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Network to fetch.
    pub network: NetworkCode,
    /// Directory holding cached CSV tables.
    pub cache_dir: PathBuf,
    /// Maximum age of a cache entry, in minutes.
    pub cache_expiry_minutes: u64,
    /// Metrics included in the report. Power and market value are always
    /// fetched; other metrics are fetched in addition.
    pub metrics: Vec<Metric>,
    /// Base URL of the OpenElectricity API.
    pub api_base_url: String,
    /// Where the JSON report is written.
    pub output: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: NetworkCode::default(),
            cache_dir: PathBuf::from("data"),
            cache_expiry_minutes: 1,
            metrics: vec![Metric::Power, Metric::MarketValue],
            api_base_url: DEFAULT_BASE_URL.to_string(),
            output: PathBuf::from("docs/analytics_report.json"),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file is not valid TOML or has wrong field types.
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    /// The file could not be read.
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// A value parsed but is unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl AppConfig {
    /// Load configuration.
    ///
    /// With an explicit `path` the file must exist. Without one,
    /// [`DEFAULT_CONFIG_PATH`] is read if present, otherwise defaults apply.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Path::new(DEFAULT_CONFIG_PATH),
            None => return Ok(Self::default()),
        };
        let s = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&s)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML is invalid or a value is unusable.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let cfg = toml::from_str::<Self>(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.metrics.is_empty() {
            return Err(ConfigError::Invalid("metrics must not be empty".to_string()));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_base_url must not be empty".to_string()));
        }
        Ok(())
    }

    /// Maximum age of a cache entry.
    #[must_use]
    pub const fn cache_expiry(&self) -> Duration {
        Duration::from_secs(self.cache_expiry_minutes.saturating_mul(60))
    }
}
