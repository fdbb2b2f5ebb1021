//! Hour-of-day profile.

use chrono::Timelike;
use energy_core::DatasetTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean value of one hour of the day.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HourlyAverage {
    /// Hour of day (0-23) in the reported offset.
    pub hour: u32,
    /// Mean of all samples in that hour.
    pub mean: f64,
    /// Number of samples pooled.
    pub samples: usize,
}

/// Average value by hour of day, pooling the same hour across days.
///
/// Hours are ascending and only hours with samples appear.
#[must_use]
pub fn hourly_profile(table: &DatasetTable) -> Vec<HourlyAverage> {
    let mut buckets: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for row in table.iter() {
        let bucket = buckets.entry(row.timestamp.hour()).or_insert((0.0, 0));
        bucket.0 += row.value;
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(hour, (sum, samples))| HourlyAverage {
            hour,
            mean: sum / samples as f64,
            samples,
        })
        .collect()
}
