//! Date window computation per dataset.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeDelta, TimeZone, Utc};

use crate::dataset::{DatasetSpec, Lookback};
use crate::error::{DataError, Result};

/// Computes the `[start, end)` window to request for `spec` relative to `now`.
///
/// - `Lookback::Days(d)`: `end = now`, `start = now - d days`.
/// - `Lookback::Months { months_back, exclude_current_month: true }`: `end` is
///   midnight on the first of the month before `now`'s month and `start` is the
///   first of the month `months_back` months before that.
///
/// Calendar months are those of the market clock `offset`: both the month of
/// `now` and the month boundaries are taken in that offset.
///
/// # Errors
/// Returns [`DataError::InvalidParameter`] for a month lookback that does not
/// exclude the current month; that combination has no defined window.
pub fn compute_range(
    spec: &DatasetSpec,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    match spec.lookback {
        Lookback::Days(days) => {
            let start = now - TimeDelta::days(i64::from(days));
            Ok((start, now))
        }
        Lookback::Months {
            months_back,
            exclude_current_month: true,
        } => {
            let now = now.with_timezone(&offset);
            let (end_year, end_month) = if now.month() == 1 {
                (now.year() - 1, 12)
            } else {
                (now.year(), now.month() - 1)
            };
            let end = month_start(end_year, end_month, offset)?;

            let total = i64::from(end_year) * 12 + i64::from(end_month) - i64::from(months_back);
            let mut start_year = total.div_euclid(12);
            let mut start_month = total.rem_euclid(12);
            if start_month == 0 {
                start_month = 12;
                start_year -= 1;
            }
            let start_year = i32::try_from(start_year)
                .map_err(|_| DataError::InvalidParameter(format!("Year out of range: {start_year}")))?;
            // rem_euclid(12) keeps this within 1..=12
            let start = month_start(start_year, start_month as u32, offset)?;

            Ok((start, end))
        }
        Lookback::Months {
            exclude_current_month: false,
            ..
        } => Err(DataError::InvalidParameter(format!(
            "Dataset {} uses a month lookback that includes the current month",
            spec.key
        ))),
    }
}

/// Midnight in `offset` on the first day of the given month.
fn month_start(year: i32, month: u32, offset: FixedOffset) -> Result<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|dt| offset.from_local_datetime(&dt).single())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| DataError::InvalidParameter(format!("Invalid month: {year}-{month:02}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;
    use chrono::TimeZone;

    fn months_spec(months_back: u32) -> DatasetSpec {
        DatasetSpec::new(
            "monthly",
            Interval::Monthly,
            Lookback::Months {
                months_back,
                exclude_current_month: true,
            },
            "Monthly",
            "Monthly",
            1,
        )
        .unwrap()
    }

    fn days_spec(days: u32) -> DatasetSpec {
        DatasetSpec::new("daily", Interval::Hourly, Lookback::Days(days), "Days", "Days", 1).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn zero() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn nem() -> FixedOffset {
        FixedOffset::east_opt(10 * 3600).unwrap()
    }

    #[test]
    fn test_day_lookback() {
        let now = utc(2024, 3, 15, 13, 45);
        for days in [0, 1, 7, 30, 365] {
            let (start, end) = compute_range(&days_spec(days), now, zero()).unwrap();
            assert_eq!(end, now);
            assert_eq!(end - start, TimeDelta::days(i64::from(days)));
        }
    }

    #[test]
    fn test_month_lookback_mid_year() {
        let now = utc(2026, 10, 16, 9, 30);
        let (start, end) = compute_range(&months_spec(23), now, zero()).unwrap();
        assert_eq!(end, utc(2026, 9, 1, 0, 0));
        assert_eq!(start, utc(2024, 10, 1, 0, 0));
    }

    #[test]
    fn test_month_lookback_january_rolls_back_a_year() {
        let now = utc(2025, 1, 15, 0, 0);
        let (start, end) = compute_range(&months_spec(23), now, zero()).unwrap();
        assert_eq!(end, utc(2024, 12, 1, 0, 0));
        assert_eq!(start, utc(2023, 1, 1, 0, 0));
    }

    #[test]
    fn test_month_lookback_end_is_previous_month_for_every_month() {
        for month in 1..=12 {
            let now = utc(2024, month, 20, 12, 0);
            let (_, end) = compute_range(&months_spec(3), now, zero()).unwrap();
            let expected = if month == 1 {
                utc(2023, 12, 1, 0, 0)
            } else {
                utc(2024, month - 1, 1, 0, 0)
            };
            assert_eq!(end, expected, "now in month {month}");
        }
    }

    #[test]
    fn test_month_index_zero_decodes_to_december() {
        // end = 2024-12, twelve months back lands on month index 0
        let now = utc(2025, 1, 2, 0, 0);
        let (start, end) = compute_range(&months_spec(12), now, zero()).unwrap();
        assert_eq!(end, utc(2024, 12, 1, 0, 0));
        assert_eq!(start, utc(2023, 12, 1, 0, 0));
    }

    #[test]
    fn test_zero_months_back() {
        let now = utc(2024, 6, 10, 8, 0);
        let (start, end) = compute_range(&months_spec(0), now, zero()).unwrap();
        assert_eq!(start, end);
        assert_eq!(end, utc(2024, 5, 1, 0, 0));
    }

    #[test]
    fn test_month_boundaries_in_market_offset() {
        let now = utc(2024, 5, 15, 0, 0);
        let (start, end) = compute_range(&months_spec(23), now, nem()).unwrap();

        assert_eq!(end.with_timezone(&nem()).to_rfc3339(), "2024-04-01T00:00:00+10:00");
        assert_eq!(start.with_timezone(&nem()).to_rfc3339(), "2022-05-01T00:00:00+10:00");
        assert_eq!(end, utc(2024, 3, 31, 14, 0));
    }

    #[test]
    fn test_month_of_now_follows_market_calendar() {
        // still May in UTC, already June 1st in +10:00
        let now = utc(2024, 5, 31, 20, 0);

        let (_, end) = compute_range(&months_spec(3), now, nem()).unwrap();
        assert_eq!(end.with_timezone(&nem()).to_rfc3339(), "2024-05-01T00:00:00+10:00");

        let (_, end) = compute_range(&months_spec(3), now, zero()).unwrap();
        assert_eq!(end, utc(2024, 4, 1, 0, 0));
    }

    #[test]
    fn test_day_lookback_ignores_offset() {
        let now = utc(2024, 5, 31, 20, 0);
        assert_eq!(
            compute_range(&days_spec(7), now, nem()).unwrap(),
            compute_range(&days_spec(7), now, zero()).unwrap()
        );
    }

    #[test]
    fn test_month_lookback_including_current_month_is_rejected() {
        let spec = DatasetSpec::new(
            "monthly",
            Interval::Monthly,
            Lookback::Months {
                months_back: 3,
                exclude_current_month: false,
            },
            "Monthly",
            "Monthly",
            1,
        )
        .unwrap();

        let err = compute_range(&spec, utc(2024, 6, 10, 8, 0), zero()).unwrap_err();
        assert!(err.is_configuration());
    }
}
