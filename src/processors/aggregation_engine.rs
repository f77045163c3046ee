use ndarray::Array2;
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::error::Result;
use crate::masking::OceanMasker;
use crate::models::{GridSlot, RunningAggregate, TimeSeries};
use crate::processors::PartitionProcessor;
use crate::readers::{FieldSource, MonthPartition};
use crate::utils::progress::ProgressReporter;

/// What to aggregate in one run
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationSettings {
    pub variable: String,
    pub file_prefix: String,
    pub climatology_months: BTreeSet<u32>,
}

impl AggregationSettings {
    pub fn new(
        variable: impl Into<String>,
        file_prefix: impl Into<String>,
        climatology_months: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            variable: variable.into(),
            file_prefix: file_prefix.into(),
            climatology_months: climatology_months.into_iter().collect(),
        }
    }

    pub fn is_climatology_month(&self, month: u32) -> bool {
        self.climatology_months.contains(&month)
    }
}

/// Mutable state of a single run; built fresh by every [`AggregationEngine::run`] call
#[derive(Debug, Default)]
struct RunState {
    grid: GridSlot,
    aggregate: RunningAggregate,
    series: TimeSeries,
}

/// Final products of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    /// Climatological mean, absent when no partition contributed samples
    pub mean_field: Option<Array2<f64>>,
    pub sample_count: usize,
    pub time_series: TimeSeries,
    pub partitions_processed: usize,
    pub partitions_skipped: usize,
}

impl RunOutput {
    /// Apply a unit conversion factor to both products
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            mean_field: self.mean_field.as_ref().map(|field| field * factor),
            sample_count: self.sample_count,
            time_series: self.time_series.scaled(factor),
            partitions_processed: self.partitions_processed,
            partitions_skipped: self.partitions_skipped,
        }
    }
}

/// Walks the partitions of an archive and folds them into a climatology and a time series
pub struct AggregationEngine<'a> {
    source: &'a dyn FieldSource,
    masker: &'a dyn OceanMasker,
    settings: &'a AggregationSettings,
}

impl<'a> AggregationEngine<'a> {
    pub fn new(
        source: &'a dyn FieldSource,
        masker: &'a dyn OceanMasker,
        settings: &'a AggregationSettings,
    ) -> Self {
        Self {
            source,
            masker,
            settings,
        }
    }

    /// Aggregate `partitions` into a fresh run state and return its products.
    ///
    /// Partitions are visited in the order yielded; the weighted merge makes the result
    /// independent of that order up to rounding. On error the partial state is dropped, so a
    /// later call on the same engine starts from scratch.
    pub fn run<I>(
        &self,
        partitions: I,
        progress: Option<&ProgressReporter>,
    ) -> Result<RunOutput>
    where
        I: IntoIterator<Item = Result<MonthPartition>>,
    {
        let processor = PartitionProcessor::new(
            self.source,
            self.masker,
            &self.settings.variable,
            &self.settings.file_prefix,
        );

        let mut state = RunState::default();
        let mut partitions_processed = 0;
        let mut partitions_skipped = 0;

        for partition in partitions {
            let partition = partition?;

            if partition.is_hidden() {
                debug!("Skipping hidden partition {}", partition.name());
                partitions_skipped += 1;
                continue;
            }

            if let Some(p) = progress {
                p.set_message(partition.name());
            }

            let is_climatology_month =
                self.settings.is_climatology_month(partition.period()?.month);
            let result = processor.process(&partition, is_climatology_month, &mut state.grid)?;

            state.aggregate.merge_partition(&result)?;
            if let Some(area_average) = result.area_average {
                state.series.insert(result.period_key, area_average);
            }

            partitions_processed += 1;
            if let Some(p) = progress {
                p.increment(1);
            }
        }

        let (mean_field, sample_count) = state.aggregate.into_parts();
        let time_series = state.series;

        info!(
            "Aggregated {} over {} partitions: {} climatology samples, {} series points",
            self.settings.variable,
            partitions_processed,
            sample_count,
            time_series.len()
        );

        Ok(RunOutput {
            mean_field,
            sample_count,
            time_series,
            partitions_processed,
            partitions_skipped,
        })
    }
}
