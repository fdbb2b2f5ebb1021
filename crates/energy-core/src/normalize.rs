//! Flattening of network data responses into dataset tables.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde_json::Value;

use crate::{
    dataset::DatasetSpec,
    error::{DataError, Result},
    response::{DataPoint, NetworkDataResponse, NetworkSeries},
    types::{DatasetTable, NetworkCode, ObservationRow},
};

/// Epoch values above this are read as milliseconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e11;

/// Layouts accepted for timestamps without an offset.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Flattens every point of every series/result into one sorted table.
///
/// Returns `Ok(None)` when the response has no series or yields no rows, and
/// an error when any point is malformed; a partial table is never returned.
/// Metric, unit and network come from the owning series, the interval from
/// `spec`. A point whose value is JSON `null` is a gap and produces no row.
///
/// # Errors
/// Returns [`DataError::Normalization`] for a point that is not a
/// `[timestamp, value]` pair, has an unparsable timestamp or a non-numeric
/// value.
pub fn normalize(response: &NetworkDataResponse, spec: &DatasetSpec) -> Result<Option<DatasetTable>> {
    let Some(series) = response.data.as_deref() else {
        return Ok(None);
    };

    let rows = series
        .iter()
        .flat_map(|s| {
            s.results
                .iter()
                .flatten()
                .flat_map(move |result| result.data.iter().map(move |point| (s, point)))
        })
        .filter_map(|(s, point)| to_row(s, point, spec).transpose())
        .collect::<Result<Vec<_>>>()?;

    if rows.is_empty() {
        return Ok(None);
    }

    Ok(Some(DatasetTable::new(rows)))
}

fn to_row(series: &NetworkSeries, point: &DataPoint, spec: &DatasetSpec) -> Result<Option<ObservationRow>> {
    let [raw_ts, raw_value] = point.0.as_slice() else {
        return Err(DataError::Normalization(format!(
            "Expected [timestamp, value], got {} elements in {} series",
            point.0.len(),
            series.metric
        )));
    };

    let offset = NetworkCode::new(series.network_code.as_str())
        .map(|code| code.market_offset())
        .unwrap_or_else(|_| Utc.fix());

    let value = match raw_value {
        Value::Null => return Ok(None),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| DataError::Normalization(format!("Value out of range: {n}")))?,
        other => {
            return Err(DataError::Normalization(format!(
                "Non-numeric value: {other}"
            )));
        }
    };

    Ok(Some(ObservationRow::new(
        parse_timestamp(raw_ts, offset)?,
        value,
        series.metric.as_str(),
        series.unit.as_str(),
        spec.interval.as_str(),
        series.network_code.as_str(),
    )))
}

/// Parses an API timestamp.
///
/// Strings are RFC 3339, or naive date-times/dates read as wall-clock time
/// in `offset`. Numbers are Unix epoch seconds, or milliseconds when large.
///
/// # Errors
/// Returns [`DataError::Normalization`] if the value is not a recognizable
/// timestamp.
pub fn parse_timestamp(raw: &Value, offset: FixedOffset) -> Result<DateTime<FixedOffset>> {
    let parsed = match raw {
        Value::String(s) => parse_timestamp_str(s.trim(), offset),
        Value::Number(n) => n.as_f64().and_then(|epoch| {
            let utc = if epoch.abs() > EPOCH_MILLIS_THRESHOLD {
                DateTime::<Utc>::from_timestamp_millis(epoch as i64)
            } else {
                let secs = epoch.floor();
                let nanos = ((epoch - secs) * 1e9).round() as u32;
                DateTime::<Utc>::from_timestamp(secs as i64, nanos.min(999_999_999))
            };
            utc.map(|dt| dt.with_timezone(&offset))
        }),
        _ => None,
    };

    parsed.ok_or_else(|| DataError::Normalization(format!("Unparsable timestamp: {raw}")))
}

fn parse_timestamp_str(s: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    offset.from_local_datetime(&naive).single()
}
