//! Trend indicators.

use chrono::Datelike;
use energy_core::{DatasetTable, Result};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::frame::FrameSeries;
use crate::stats::mean;

/// Month reported when no timestamps are available.
pub const FALLBACK_MONTH: u32 = 1;

/// Direction of a series, comparing the mean of its second half to its first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Second half mean is strictly greater.
    Increasing,
    /// Second half mean is less or equal.
    Decreasing,
    /// Fewer than two values.
    InsufficientData,
}

impl TrendDirection {
    /// Returns the snake case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::InsufficientData => "insufficient_data",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trend indicators of one table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    /// Half-over-half direction.
    pub trend_direction: TrendDirection,
    /// Calendar month (1-12) with the highest mean, pooled across years.
    pub peak_month: u32,
    /// Calendar month (1-12) with the lowest mean, pooled across years.
    pub low_month: u32,
    /// Coefficient of variation (population std over |mean|).
    pub volatility: f64,
}

/// Computes trend indicators for a table.
#[must_use]
pub fn analyze(table: &DatasetTable) -> TrendSummary {
    analyze_series(&FrameSeries::from_table(table))
}

/// Computes trend indicators for a frame with a `value` column and an
/// optional `timestamp` column.
///
/// # Errors
/// Returns [`energy_core::DataError::InsufficientData`] if the `value`
/// column is missing.
pub fn analyze_frame(df: &DataFrame) -> Result<TrendSummary> {
    Ok(analyze_series(&FrameSeries::from_frame(df, "trend")?))
}

fn analyze_series(series: &FrameSeries) -> TrendSummary {
    let monthly = monthly_means(series.dated().map(|(ts, value)| (ts.month(), value)));

    TrendSummary {
        trend_direction: trend_direction(&series.values),
        peak_month: extreme_month(&monthly, |candidate, best| candidate > best),
        low_month: extreme_month(&monthly, |candidate, best| candidate < best),
        volatility: volatility(&series.values),
    }
}

/// Compares the mean of the second half of `values` with the first half.
/// The split point is `len / 2`.
#[must_use]
pub fn trend_direction(values: &[f64]) -> TrendDirection {
    if values.len() < 2 {
        return TrendDirection::InsufficientData;
    }
    let (first, second) = values.split_at(values.len() / 2);
    if mean(second) > mean(first) {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    }
}

/// Mean value per calendar month, pooling the same month across years.
#[must_use]
pub fn monthly_means(samples: impl IntoIterator<Item = (u32, f64)>) -> BTreeMap<u32, f64> {
    let mut buckets: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for (month, value) in samples {
        let bucket = buckets.entry(month).or_insert((0.0, 0));
        bucket.0 += value;
        bucket.1 += 1;
    }
    buckets
        .into_iter()
        .map(|(month, (sum, n))| (month, sum / n as f64))
        .collect()
}

// First month in ascending order wins ties.
fn extreme_month(monthly: &BTreeMap<u32, f64>, better: impl Fn(f64, f64) -> bool) -> u32 {
    let mut best: Option<(u32, f64)> = None;
    for (&month, &value) in monthly {
        if best.is_none_or(|(_, current)| better(value, current)) {
            best = Some((month, value));
        }
    }
    best.map_or(FALLBACK_MONTH, |(month, _)| month)
}

/// Population standard deviation divided by the absolute mean.
///
/// Returns `0.0` for fewer than two values or a mean of exactly zero.
#[must_use]
pub fn volatility(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean(values);
    if mean == 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt() / mean.abs()
}
