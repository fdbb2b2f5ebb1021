//! Dataset availability.

use energy_core::{DatasetKey, DatasetSpec, DatasetTables};
use std::collections::BTreeMap;

/// Reports, for each spec, whether both the power and the market value
/// tables are present and non-empty.
#[must_use]
pub fn check_availability(
    power: &DatasetTables,
    market: &DatasetTables,
    specs: &[DatasetSpec],
) -> BTreeMap<DatasetKey, bool> {
    specs
        .iter()
        .map(|spec| (spec.key.clone(), has_both(power, market, &spec.key)))
        .collect()
}

/// Returns true if both maps hold a non-empty table for `key`.
#[must_use]
pub fn has_both(power: &DatasetTables, market: &DatasetTables, key: &DatasetKey) -> bool {
    let present = |tables: &DatasetTables| tables.get(key).is_some_and(|t| !t.is_empty());
    present(power) && present(market)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use energy_core::{DatasetTable, ObservationRow};

    fn one_row() -> DatasetTable {
        DatasetTable::new(vec![ObservationRow::new(
            DateTime::parse_from_rfc3339("2024-05-01T00:00:00+10:00").unwrap(),
            1.0,
            "power",
            "MW",
            "1h",
            "NEM",
        )])
    }

    fn key(s: &str) -> DatasetKey {
        DatasetKey::new(s).unwrap()
    }

    #[test]
    fn test_availability_requires_both() {
        let specs = DatasetSpec::defaults();
        let mut power = DatasetTables::new();
        let mut market = DatasetTables::new();

        power.insert(key(DatasetSpec::HOURLY_1_MONTH), one_row());
        market.insert(key(DatasetSpec::HOURLY_1_MONTH), one_row());
        power.insert(key(DatasetSpec::MONTHLY_24_MONTHS), one_row());
        market.insert(key(DatasetSpec::FIVEMIN_1_WEEK), DatasetTable::default());
        power.insert(key(DatasetSpec::FIVEMIN_1_WEEK), one_row());

        let availability = check_availability(&power, &market, &specs);
        assert_eq!(availability.len(), 3);
        assert!(availability[&key(DatasetSpec::HOURLY_1_MONTH)]);
        assert!(!availability[&key(DatasetSpec::MONTHLY_24_MONTHS)]);
        assert!(!availability[&key(DatasetSpec::FIVEMIN_1_WEEK)]);
    }

    #[test]
    fn test_availability_empty_inputs() {
        let specs = DatasetSpec::defaults();
        let availability =
            check_availability(&DatasetTables::new(), &DatasetTables::new(), &specs);
        assert!(availability.values().all(|&ok| !ok));
    }
}
