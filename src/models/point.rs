use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Grid indices of a single column, plus the vertical level to sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPoint {
    pub ix: usize,
    pub iy: usize,
    pub level: usize,
}

impl GridPoint {
    pub fn new(ix: usize, iy: usize) -> Self {
        Self { ix, iy, level: 0 }
    }

    pub fn with_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }
}

/// Values of one variable at one grid point, ordered by record date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSeries {
    values: BTreeMap<NaiveDateTime, f64>,
}

impl PointSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the value at `date`; a repeated date keeps the later value and is logged.
    pub fn insert(&mut self, date: NaiveDateTime, value: f64) -> Option<f64> {
        let previous = self.values.insert(date, value);
        if let Some(old) = previous {
            warn!(
                "Record date {} appeared twice; replacing {} with {}",
                date, old, value
            );
        }
        previous
    }

    pub fn extend(&mut self, other: PointSeries) {
        for (date, value) in other.values {
            self.insert(date, value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.values.iter().map(|(date, value)| (*date, *value))
    }
}
