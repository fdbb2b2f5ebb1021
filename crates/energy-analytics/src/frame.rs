//! Column extraction from loosely typed frames.

use chrono::{DateTime, FixedOffset};
use energy_core::{DataError, DatasetTable, Result};
use polars::prelude::*;

/// Non-null values of a frame, with the timestamp of each value's row when
/// the frame carries a `timestamp` column.
#[derive(Debug, Default)]
pub(crate) struct FrameSeries {
    pub(crate) values: Vec<f64>,
    /// Aligned with `values`; `None` for unparsable or missing cells.
    pub(crate) timestamps: Option<Vec<Option<DateTime<FixedOffset>>>>,
}

impl FrameSeries {
    pub(crate) fn from_table(table: &DatasetTable) -> Self {
        Self {
            values: table.values(),
            timestamps: Some(table.iter().map(|row| Some(row.timestamp)).collect()),
        }
    }

    /// Reads the `value` column (cast to float) and the optional
    /// `timestamp` column (RFC 3339 strings).
    pub(crate) fn from_frame(df: &DataFrame, context: &str) -> Result<Self> {
        let Ok(value_column) = df.column("value") else {
            return Err(DataError::InsufficientData(format!(
                "{context}: no value column"
            )));
        };
        let values = value_column.cast(&DataType::Float64)?;
        let values = values.f64()?;

        let timestamps = match df.column("timestamp") {
            Ok(column) => {
                let column = column.cast(&DataType::String)?;
                let column = column.str()?;
                let parsed = column
                    .into_iter()
                    .zip(values)
                    .filter(|(_, value)| value.is_some())
                    .map(|(raw, _)| raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok()))
                    .collect();
                Some(parsed)
            }
            Err(_) => None,
        };

        Ok(Self {
            values: values.into_iter().flatten().collect(),
            timestamps,
        })
    }

    /// Pairs of (timestamp, value) for rows with a parsable timestamp.
    pub(crate) fn dated(&self) -> impl Iterator<Item = (DateTime<FixedOffset>, f64)> + '_ {
        self.timestamps
            .iter()
            .flatten()
            .zip(&self.values)
            .filter_map(|(ts, &value)| ts.as_ref().map(|&ts| (ts, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_from_frame_skips_null_values() {
        let df = df! {
            "timestamp" => ["2024-01-01T00:00:00+10:00", "2024-02-01T00:00:00+10:00", "garbage"],
            "value" => [Some(1.0), None, Some(3.0)],
        }
        .unwrap();

        let series = FrameSeries::from_frame(&df, "test").unwrap();
        assert_eq!(series.values, vec![1.0, 3.0]);

        let timestamps = series.timestamps.as_ref().unwrap();
        assert_eq!(timestamps.len(), 2);
        assert!(timestamps[0].is_some());
        assert!(timestamps[1].is_none());
        assert_eq!(series.dated().count(), 1);
    }

    #[test]
    fn test_from_frame_requires_value_column() {
        let df = df! { "other" => [1.0, 2.0] }.unwrap();
        let err = FrameSeries::from_frame(&df, "test").unwrap_err();
        assert!(matches!(err, DataError::InsufficientData(_)));
    }

    #[test]
    fn test_from_frame_integer_values() {
        let df = df! { "value" => [1i64, 2, 3] }.unwrap();
        let series = FrameSeries::from_frame(&df, "test").unwrap();
        assert_eq!(series.values, vec![1.0, 2.0, 3.0]);
        assert!(series.timestamps.is_none());
    }
}
