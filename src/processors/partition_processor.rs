use ndarray::Array2;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{ProcessingError, Result};
use crate::masking::OceanMasker;
use crate::models::{normalize_field, FieldSample, GridContext, GridSlot, PartitionResult, PeriodKey};
use crate::readers::{FieldFile, FieldSource, FieldVariable, MonthPartition};

/// Reduces the sample files of one month partition to a [`PartitionResult`]
pub struct PartitionProcessor<'a> {
    source: &'a dyn FieldSource,
    masker: &'a dyn OceanMasker,
    variable: &'a str,
    file_prefix: &'a str,
}

impl<'a> PartitionProcessor<'a> {
    pub fn new(
        source: &'a dyn FieldSource,
        masker: &'a dyn OceanMasker,
        variable: &'a str,
        file_prefix: &'a str,
    ) -> Self {
        Self {
            source,
            masker,
            variable,
            file_prefix,
        }
    }

    /// Process every prefix-matching file of `partition`.
    ///
    /// Files that cannot be opened or lack the variable are skipped. The grid context is derived
    /// from the first file that yields a sample when `grid` is still empty.
    pub fn process(
        &self,
        partition: &MonthPartition,
        is_climatology_month: bool,
        grid: &mut GridSlot,
    ) -> Result<PartitionResult> {
        let period_key = partition.period()?;
        let files = partition.files_with_prefix(self.file_prefix)?;

        debug!(
            "Working on {} ({} files, climatology month: {})",
            partition.name(),
            files.len(),
            is_climatology_month
        );

        let mut accumulator = PartitionAccumulator::new(is_climatology_month);

        for path in &files {
            let Some((file, variable)) = self.open_variable(path) else {
                continue;
            };

            let samples = normalize_field(variable.values, path)?;
            if samples.is_empty() {
                debug!("{} holds no records of {}", path.display(), self.variable);
                continue;
            }

            let context = grid.get_or_derive(file.as_ref(), path, self.masker)?;
            for sample in &samples {
                accumulator.add(sample, context, path)?;
            }
        }

        let result = accumulator.finish(period_key);
        debug!(
            "Processed {}: {} climatology samples, area average {:?}",
            partition.name(),
            result.sample_count,
            result.area_average
        );
        Ok(result)
    }

    /// Open `path` and pull out the requested variable; `None` means the file is skipped.
    fn open_variable(&self, path: &Path) -> Option<(Box<dyn FieldFile>, FieldVariable)> {
        let file = match self.source.open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Skipping unreadable file {}: {}", path.display(), e);
                return None;
            }
        };

        match file.variable(self.variable) {
            Ok(Some(variable)) => Some((file, variable)),
            Ok(None) => {
                warn!("Could not find {} in {}", self.variable, path.display());
                None
            }
            Err(e) => {
                warn!(
                    "Skipping {}: variable {} could not be decoded: {}",
                    path.display(),
                    self.variable,
                    e
                );
                None
            }
        }
    }
}

/// Running sums of one partition, so individual fields are not retained
struct PartitionAccumulator {
    is_climatology_month: bool,
    field_sum: Option<Array2<f64>>,
    field_count: usize,
    area_sum: f64,
    area_count: usize,
}

impl PartitionAccumulator {
    fn new(is_climatology_month: bool) -> Self {
        Self {
            is_climatology_month,
            field_sum: None,
            field_count: 0,
            area_sum: 0.0,
            area_count: 0,
        }
    }

    fn add(&mut self, sample: &FieldSample, context: &GridContext, path: &Path) -> Result<()> {
        if sample.shape() != context.shape() {
            return Err(ProcessingError::ShapeMismatch {
                context: format!("field in {}", path.display()),
                expected: context.shape().to_vec(),
                actual: sample.shape().to_vec(),
            });
        }

        if self.is_climatology_month {
            match self.field_sum.as_mut() {
                Some(sum) => *sum += &sample.values,
                None => self.field_sum = Some(sample.values.clone()),
            }
            self.field_count += 1;
        }

        if let Some(land_mean) = sample.masked_mean(&context.land_mask) {
            self.area_sum += land_mean;
            self.area_count += 1;
        }

        Ok(())
    }

    fn finish(self, period_key: PeriodKey) -> PartitionResult {
        let spatial_mean = match self.field_sum {
            Some(sum) if self.field_count > 0 => Some(sum / self.field_count as f64),
            _ => None,
        };
        let area_average = if self.area_count > 0 {
            Some(self.area_sum / self.area_count as f64)
        } else {
            None
        };

        PartitionResult {
            period_key,
            sample_count: if spatial_mean.is_some() {
                self.field_count
            } else {
                0
            },
            spatial_mean,
            area_average,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::masking::{LandRegion, RegionOceanMasker};
    use crate::models::ProjectionParams;
    use crate::readers::{JsonFieldDocument, JsonFieldSource};
    use ndarray::{array, Array3};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // 2x2 grid; only the western column is land
    fn write_sample(dir: &Path, name: &str, variable: Option<(&str, ndarray::ArrayD<f64>)>) {
        let lons = array![[260.0, 10.0], [260.0, 10.0]];
        let lats = array![[40.0, 40.0], [41.0, 41.0]];
        let mut document = JsonFieldDocument::new().with_grid(&lons, &lats, ProjectionParams::new());
        if let Some((var_name, values)) = variable {
            document = document.with_variable(var_name, &values, vec![]);
        }
        document.write_to(&dir.join(name)).unwrap();
    }

    fn masker() -> RegionOceanMasker {
        RegionOceanMasker::new(vec![LandRegion::new(-180.0, 0.0, -90.0, 90.0)])
    }

    fn partition(root: &Path, name: &str) -> (MonthPartition, PathBuf) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        (MonthPartition::new(dir.clone()).unwrap(), dir)
    }

    #[test]
    fn test_climatology_month_mean_and_area_average() {
        let temp_dir = TempDir::new().unwrap();
        let (partition, dir) = partition(temp_dir.path(), "Samples_200101");
        write_sample(&dir, "pm_a", Some(("PR", array![[1.0, 100.0], [3.0, 100.0]].into_dyn())));
        let stack = Array3::from_shape_vec((2, 2, 2), vec![3.0, 0.0, 5.0, 0.0, 5.0, 0.0, 7.0, 0.0])
            .unwrap();
        write_sample(&dir, "pm_b", Some(("PR", stack.into_dyn())));

        let source = JsonFieldSource::new();
        let masker = masker();
        let processor = PartitionProcessor::new(&source, &masker, "PR", "pm");
        let mut grid = GridSlot::new();

        let result = processor.process(&partition, true, &mut grid).unwrap();

        assert_eq!(result.period_key, PeriodKey::new(2001, 1).unwrap());
        assert_eq!(result.sample_count, 3);
        assert_eq!(
            result.spatial_mean,
            Some(array![[3.0, 100.0 / 3.0], [5.0, 100.0 / 3.0]])
        );
        // land means per sample are 2, 4 and 6
        assert_eq!(result.area_average, Some(4.0));
        assert!(grid.is_derived());
    }

    #[test]
    fn test_non_climatology_month_only_feeds_area_average() {
        let temp_dir = TempDir::new().unwrap();
        let (partition, dir) = partition(temp_dir.path(), "Samples_200103");
        write_sample(&dir, "pm_a", Some(("PR", array![[2.0, 9.0], [4.0, 9.0]].into_dyn())));

        let source = JsonFieldSource::new();
        let masker = masker();
        let processor = PartitionProcessor::new(&source, &masker, "PR", "pm");
        let mut grid = GridSlot::new();

        let result = processor.process(&partition, false, &mut grid).unwrap();
        assert_eq!(result.sample_count, 0);
        assert_eq!(result.spatial_mean, None);
        assert_eq!(result.area_average, Some(3.0));
    }

    #[test]
    fn test_bad_files_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let (partition, dir) = partition(temp_dir.path(), "Samples_200102");
        write_sample(&dir, "pm_missing_var", None);
        write_sample(&dir, "pm_other_var", Some(("TT", array![[1.0, 1.0], [1.0, 1.0]].into_dyn())));
        fs::write(dir.join("pm_corrupt"), "garbage").unwrap();
        write_sample(&dir, "dm_wrong_stream", Some(("PR", array![[50.0, 50.0], [50.0, 50.0]].into_dyn())));
        write_sample(&dir, "pm_good", Some(("PR", array![[1.0, 2.0], [3.0, 4.0]].into_dyn())));

        let source = JsonFieldSource::new();
        let masker = masker();
        let processor = PartitionProcessor::new(&source, &masker, "PR", "pm");
        let mut grid = GridSlot::new();

        let result = processor.process(&partition, true, &mut grid).unwrap();
        assert_eq!(result.sample_count, 1);
        assert_eq!(result.area_average, Some(2.0));
    }

    #[test]
    fn test_empty_partition_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let (partition, dir) = partition(temp_dir.path(), "Samples_200102");
        write_sample(&dir, "pm_missing_var", None);

        let source = JsonFieldSource::new();
        let masker = masker();
        let processor = PartitionProcessor::new(&source, &masker, "PR", "pm");
        let mut grid = GridSlot::new();

        let result = processor.process(&partition, true, &mut grid).unwrap();
        assert_eq!(result, PartitionResult::empty(PeriodKey::new(2001, 2).unwrap()));
        assert!(!grid.is_derived());
    }

    #[test]
    fn test_unsupported_rank_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let (partition, dir) = partition(temp_dir.path(), "Samples_200101");
        write_sample(&dir, "pm_flat", Some(("PR", array![1.0, 2.0, 3.0].into_dyn())));

        let source = JsonFieldSource::new();
        let masker = masker();
        let processor = PartitionProcessor::new(&source, &masker, "PR", "pm");

        let err = processor
            .process(&partition, true, &mut GridSlot::new())
            .unwrap_err();
        assert!(matches!(err, ProcessingError::UnsupportedRank { ref shape, .. } if shape == &vec![3]));
    }

    #[test]
    fn test_field_not_matching_grid_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let (partition, dir) = partition(temp_dir.path(), "Samples_200101");
        write_sample(&dir, "pm_wide", Some(("PR", array![[1.0, 2.0, 3.0]].into_dyn())));

        let source = JsonFieldSource::new();
        let masker = masker();
        let processor = PartitionProcessor::new(&source, &masker, "PR", "pm");

        let err = processor
            .process(&partition, true, &mut GridSlot::new())
            .unwrap_err();
        assert!(matches!(err, ProcessingError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_malformed_partition_name_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let (partition, _) = partition(temp_dir.path(), "foo_bar");

        let source = JsonFieldSource::new();
        let masker = masker();
        let processor = PartitionProcessor::new(&source, &masker, "PR", "pm");

        let err = processor
            .process(&partition, true, &mut GridSlot::new())
            .unwrap_err();
        assert!(err.to_string().contains("foo_bar"));
    }
}
