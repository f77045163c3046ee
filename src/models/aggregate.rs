use ndarray::Array2;

use crate::error::{ProcessingError, Result};
use crate::models::PeriodKey;

/// Contribution of one month partition to a run
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionResult {
    pub period_key: PeriodKey,
    /// Mean of the partition's samples, present iff `sample_count > 0`
    pub spatial_mean: Option<Array2<f64>>,
    pub sample_count: usize,
    /// Mean over the partition's samples of their land-masked means
    pub area_average: Option<f64>,
}

impl PartitionResult {
    pub fn empty(period_key: PeriodKey) -> Self {
        Self {
            period_key,
            spatial_mean: None,
            sample_count: 0,
            area_average: None,
        }
    }
}

/// Sample-weighted running mean of the climatological field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningAggregate {
    mean_field: Option<Array2<f64>>,
    total_count: usize,
}

impl RunningAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mean_field(&self) -> Option<&Array2<f64>> {
        self.mean_field.as_ref()
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Fold the mean of `count` further samples into the aggregate.
    ///
    /// With `w = n / (n + count)` the new mean is `mean * w + other * (1 - w)`, which is the exact
    /// mean of the union of both sample sets. A zero `count` leaves the aggregate unchanged.
    pub fn merge(&mut self, mean: &Array2<f64>, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }

        match self.mean_field.as_mut() {
            None => {
                self.mean_field = Some(mean.clone());
            }
            Some(current) => {
                if current.dim() != mean.dim() {
                    let (er, ec) = current.dim();
                    let (ar, ac) = mean.dim();
                    return Err(ProcessingError::ShapeMismatch {
                        context: "climatological mean merge".to_string(),
                        expected: vec![er, ec],
                        actual: vec![ar, ac],
                    });
                }

                let w = self.total_count as f64 / (self.total_count + count) as f64;
                current.zip_mut_with(mean, |acc, &m| *acc = *acc * w + m * (1.0 - w));
            }
        }

        self.total_count += count;
        Ok(())
    }

    pub fn merge_partition(&mut self, result: &PartitionResult) -> Result<()> {
        match &result.spatial_mean {
            Some(mean) if result.sample_count > 0 => self.merge(mean, result.sample_count),
            _ => Ok(()),
        }
    }

    /// Consume the aggregate, yielding the mean field and its total sample count
    pub fn into_parts(self) -> (Option<Array2<f64>>, usize) {
        (self.mean_field, self.total_count)
    }
}
