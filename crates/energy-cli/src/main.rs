//! `energy-report`: fetch, cache and summarize energy market data.
//!
//! Runs one pass of the pipeline:
//! - fetch power and market value data for every dataset
//! - fetch any further configured metrics
//! - write the JSON analytics report

#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use clap::Parser;
use energy::{
    AnalyticsReport, AppConfig, CsvFileCache, EnergyDataFetcher, Metric, NetworkCode,
    OpenElectricityProvider, ensure_not_empty,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "energy-report", version)]
#[command(about = "Fetch energy market data and write an analytics report", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "ENERGY_CONFIG")]
    config: Option<PathBuf>,

    /// Network code (e.g. NEM, WEM)
    #[arg(short, long)]
    network: Option<NetworkCode>,

    /// Directory for cached CSV tables
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Path of the JSON report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Reuse cached tables that have not expired
    #[arg(long)]
    use_cache: bool,

    /// OpenElectricity API key
    #[arg(long, env = "OPENELECTRICITY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

impl Cli {
    fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(network) = &self.network {
            config.network = network.clone();
        }
        if let Some(cache_dir) = &self.cache_dir {
            config.cache_dir = cache_dir.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    tokio::select! {
        result = run(cli) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted");
            bail!("Run interrupted before the report was written")
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let config = cli.apply(config);
    info!(network = %config.network, cache_dir = %config.cache_dir.display(), "Starting");

    let api_key = cli
        .api_key
        .clone()
        .ok_or_else(|| anyhow!("OPENELECTRICITY_API_KEY is not set"))?;
    let provider = OpenElectricityProvider::new(api_key)
        .context("Failed to build API client")?
        .with_base_url(config.api_base_url.clone());
    let cache = CsvFileCache::new(&config.cache_dir).context("Failed to open cache directory")?;

    let fetcher = EnergyDataFetcher::new(Arc::new(provider), Arc::new(cache))
        .with_network(config.network.clone())
        .with_cache_expiry(config.cache_expiry());

    let data = fetcher
        .fetch_power_and_market(cli.use_cache)
        .await
        .context("Fetch failed")?;
    ensure_not_empty(&data).context("No data available")?;

    let mut tables: BTreeMap<Metric, _> = data.into_tables();
    for &metric in &config.metrics {
        if tables.contains_key(&metric) {
            continue;
        }
        let fetched = fetcher
            .fetch_metric(metric, cli.use_cache)
            .await
            .with_context(|| format!("Fetch of {metric} failed"))?;
        tables.insert(metric, fetched);
    }

    let report = AnalyticsReport::build(
        config.network.clone(),
        Utc::now(),
        &tables,
        fetcher.datasets(),
    );
    report
        .write_json(&config.output)
        .context("Failed to write report")?;

    for (metric, total) in &report.totals {
        println!("{metric}: {total} records");
    }
    for (dataset, available) in &report.availability {
        let status = if *available { "available" } else { "missing" };
        println!("{dataset}: {status}");
    }
    println!("Report written to {}", config.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "energy-report",
            "--network",
            "wem",
            "--cache-dir",
            "/tmp/cache",
            "--use-cache",
        ])
        .unwrap();
        assert!(cli.use_cache);

        let config = cli.apply(AppConfig::default());
        assert_eq!(config.network.as_str(), "WEM");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(config.output, AppConfig::default().output);
    }

    #[test]
    fn test_rejects_bad_network() {
        assert!(Cli::try_parse_from(["energy-report", "--network", "N-E-M"]).is_err());
    }
}
