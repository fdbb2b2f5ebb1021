//! Descriptive statistics.

use chrono::{DateTime, FixedOffset};
use energy_core::{DataError, DatasetTable, Result};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::frame::FrameSeries;

/// First and last timestamp of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest timestamp.
    pub start: DateTime<FixedOffset>,
    /// Latest timestamp.
    pub end: DateTime<FixedOffset>,
}

/// Summary statistics of the `value` column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    /// Number of values. Points with a null value never become rows, so
    /// they are not counted.
    pub count: usize,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (n - 1); `0.0` for a single value.
    pub std: f64,
    /// Covered time range, when timestamps are known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

/// Summarizes a dataset table.
///
/// # Errors
/// Returns [`DataError::InsufficientData`] if the table is empty.
pub fn summarize(table: &DatasetTable) -> Result<StatsSummary> {
    summarize_series(&FrameSeries::from_table(table))
}

/// Summarizes a frame with a `value` column and an optional `timestamp`
/// column. Null values are ignored.
///
/// # Errors
/// Returns [`DataError::InsufficientData`] if the `value` column is missing
/// or holds no values.
pub fn summarize_frame(df: &DataFrame) -> Result<StatsSummary> {
    summarize_series(&FrameSeries::from_frame(df, "statistics")?)
}

fn summarize_series(series: &FrameSeries) -> Result<StatsSummary> {
    let values = &series.values;
    if values.is_empty() {
        return Err(DataError::InsufficientData("statistics: no values".to_string()));
    }

    let count = values.len();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = mean(values);
    let std = if count < 2 {
        0.0
    } else {
        let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (sum_sq / (count - 1) as f64).sqrt()
    };

    let date_range = series
        .dated()
        .map(|(ts, _)| ts)
        .fold(None, |range: Option<DateRange>, ts| match range {
            None => Some(DateRange { start: ts, end: ts }),
            Some(r) => Some(DateRange {
                start: r.start.min(ts),
                end: r.end.max(ts),
            }),
        });

    Ok(StatsSummary {
        count,
        min,
        max,
        mean,
        std,
        date_range,
    })
}

/// Arithmetic mean; `NaN` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use energy_core::{
        DataPoint, DatasetSpec, NetworkDataResponse, NetworkSeries, ObservationRow,
        SeriesResult, normalize,
    };
    use polars::df;
    use serde_json::json;

    fn table(values: &[f64]) -> DatasetTable {
        let start = DateTime::parse_from_rfc3339("2024-03-01T00:00:00+10:00").unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                ObservationRow::new(
                    start + TimeDelta::hours(i as i64),
                    value,
                    "power",
                    "MW",
                    "1h",
                    "NEM",
                )
            })
            .collect()
    }

    #[test]
    fn test_summarize() {
        let stats = summarize(&table(&[1.0, 2.0, 3.0, 4.0])).unwrap();

        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert!((stats.mean - 2.5).abs() < 1e-12);
        assert!((stats.std - 1.290_994_448_735_805_6).abs() < 1e-9);

        let range = stats.date_range.unwrap();
        assert_eq!(range.start.to_rfc3339(), "2024-03-01T00:00:00+10:00");
        assert_eq!(range.end.to_rfc3339(), "2024-03-01T03:00:00+10:00");
    }

    #[test]
    fn test_summarize_single_value() {
        let stats = summarize(&table(&[42.0])).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.min, stats.max);
    }

    #[test]
    fn test_summarize_empty() {
        let err = summarize(&DatasetTable::default()).unwrap_err();
        assert!(matches!(err, DataError::InsufficientData(_)));
    }

    #[test]
    fn test_summarize_frame_without_timestamps() {
        let df = df! { "value" => [10.0, 20.0] }.unwrap();
        let stats = summarize_frame(&df).unwrap();

        assert_eq!(stats.count, 2);
        assert!(stats.date_range.is_none());

        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("date_range").is_none());
    }

    #[test]
    fn test_summarize_frame_missing_value_column() {
        let df = df! { "timestamp" => ["2024-01-01T00:00:00Z"] }.unwrap();
        assert!(matches!(
            summarize_frame(&df),
            Err(DataError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_count_excludes_null_points() {
        let response = NetworkDataResponse::new(vec![NetworkSeries {
            network_code: "NEM".to_string(),
            metric: "power".to_string(),
            unit: "MW".to_string(),
            interval: Some("1h".to_string()),
            results: Some(vec![SeriesResult {
                name: None,
                data: vec![
                    DataPoint::new("2024-05-01T10:00:00+10:00", 4.0),
                    DataPoint(vec![json!("2024-05-01T11:00:00+10:00"), json!(null)]),
                    DataPoint::new("2024-05-01T12:00:00+10:00", 8.0),
                ],
            }]),
        }]);
        let spec = &DatasetSpec::defaults()[1];
        let table = normalize(&response, spec).unwrap().unwrap();

        let stats = summarize(&table).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 6.0);
    }

    #[test]
    fn test_summarize_frame_matches_table() {
        let table = table(&[5.0, 1.0, 3.0]);
        let from_table = summarize(&table).unwrap();
        let from_frame = summarize_frame(&table.to_dataframe().unwrap()).unwrap();
        assert_eq!(from_table, from_frame);
    }
}
