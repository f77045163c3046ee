use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::models::PeriodKey;

/// Land-area averages keyed by the anchor date of their month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    values: BTreeMap<NaiveDate, f64>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the value of a period. A later value for the same period replaces the earlier one.
    pub fn insert(&mut self, period: PeriodKey, value: f64) -> Option<f64> {
        let previous = self.values.insert(period.anchor_date(), value);
        if let Some(old) = previous {
            warn!(
                "Period {} appeared twice; replacing area average {} with {}",
                period, old, value
            );
        }
        previous
    }

    pub fn get(&self, period: PeriodKey) -> Option<f64> {
        self.values.get(&period.anchor_date()).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in ascending date order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values.iter().map(|(date, value)| (*date, *value))
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            values: self
                .values
                .iter()
                .map(|(date, value)| (*date, value * factor))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_sorted_by_date() {
        let mut series = TimeSeries::new();
        series.insert(PeriodKey::new(2001, 3).unwrap(), 3.0);
        series.insert(PeriodKey::new(2000, 12).unwrap(), 1.0);
        series.insert(PeriodKey::new(2001, 1).unwrap(), 2.0);

        let dates: Vec<String> = series.iter().map(|(d, _)| d.to_string()).collect();
        assert_eq!(dates, vec!["2000-12-15", "2001-01-15", "2001-03-15"]);
    }

    #[test]
    fn test_duplicate_period_overwrites() {
        let mut series = TimeSeries::new();
        let key = PeriodKey::new(1999, 7).unwrap();
        assert_eq!(series.insert(key, 1.0), None);
        assert_eq!(series.insert(key, 5.0), Some(1.0));
        assert_eq!(series.len(), 1);
        assert_eq!(series.get(key), Some(5.0));
    }

    #[test]
    fn test_scaled() {
        let mut series = TimeSeries::new();
        series.insert(PeriodKey::new(1999, 7).unwrap(), 2.0);
        let scaled = series.scaled(1000.0);
        assert_eq!(scaled.get(PeriodKey::new(1999, 7).unwrap()), Some(2000.0));
        assert_eq!(series.get(PeriodKey::new(1999, 7).unwrap()), Some(2.0));
    }
}
