use ndarray::{ArrayD, IxDyn};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{ProcessingError, Result};
use crate::models::{GridPoint, PointSeries};
use crate::readers::{FieldSource, FieldVariable, MonthPartition};
use crate::utils::progress::ProgressReporter;

/// Collects the values of one variable at one grid column across a whole archive
pub struct PointExtractor<'a> {
    source: &'a dyn FieldSource,
    variable: &'a str,
    file_prefix: &'a str,
    point: GridPoint,
}

impl<'a> PointExtractor<'a> {
    pub fn new(
        source: &'a dyn FieldSource,
        variable: &'a str,
        file_prefix: &'a str,
        point: GridPoint,
    ) -> Self {
        Self {
            source,
            variable,
            file_prefix,
            point,
        }
    }

    pub fn extract<I>(
        &self,
        partitions: I,
        progress: Option<&ProgressReporter>,
    ) -> Result<PointSeries>
    where
        I: IntoIterator<Item = Result<MonthPartition>>,
    {
        let mut series = PointSeries::new();

        for partition in partitions {
            let partition = partition?;
            if partition.is_hidden() {
                continue;
            }

            debug!("Working on {}", partition.name());
            if let Some(progress) = progress {
                progress.set_message(partition.name());
            }
            for path in partition.files_with_prefix(self.file_prefix)? {
                let file = match self.source.open(&path) {
                    Ok(file) => file,
                    Err(e) => {
                        warn!("Skipping unreadable file {}: {}", path.display(), e);
                        continue;
                    }
                };

                match file.variable(self.variable) {
                    Ok(Some(variable)) => series.extend(self.sample_variable(&variable, &path)?),
                    Ok(None) => warn!("Could not find {} in {}", self.variable, path.display()),
                    Err(e) => warn!(
                        "Skipping {}: variable {} could not be decoded: {}",
                        path.display(),
                        self.variable,
                        e
                    ),
                }
            }

            if let Some(progress) = progress {
                progress.increment(1);
            }
        }

        info!(
            "Extracted {} values of {} at ({}, {}, level {})",
            series.len(),
            self.variable,
            self.point.ix,
            self.point.iy,
            self.point.level
        );
        Ok(series)
    }

    /// Pick the point out of every record of `variable`.
    ///
    /// Layouts: `(t, level, x, y)`, `(t, x, y)` or a single `(x, y)` record.
    fn sample_variable(&self, variable: &FieldVariable, path: &Path) -> Result<PointSeries> {
        let values = &variable.values;
        let shape = values.shape();
        let GridPoint { ix, iy, level } = self.point;

        let records = match shape.len() {
            4 => shape[0],
            3 if level == 0 => shape[0],
            2 if level == 0 => 1,
            3 | 2 => return Err(self.out_of_bounds(path, shape)),
            _ => {
                return Err(ProcessingError::UnsupportedRank {
                    path: path.to_path_buf(),
                    shape: shape.to_vec(),
                })
            }
        };

        if variable.dates.len() != records {
            return Err(ProcessingError::InvalidFormat(format!(
                "{} in {} has {} records but {} dates",
                self.variable,
                path.display(),
                records,
                variable.dates.len()
            )));
        }

        let mut series = PointSeries::new();
        for (t, date) in variable.dates.iter().enumerate() {
            let index = match shape.len() {
                4 => vec![t, level, ix, iy],
                3 => vec![t, ix, iy],
                _ => vec![ix, iy],
            };
            let value = lookup(values, &index).ok_or_else(|| self.out_of_bounds(path, shape))?;
            series.insert(*date, value);
        }
        Ok(series)
    }

    fn out_of_bounds(&self, path: &Path, shape: &[usize]) -> ProcessingError {
        ProcessingError::PointOutOfBounds {
            path: path.to_path_buf(),
            ix: self.point.ix,
            iy: self.point.iy,
            level: self.point.level,
            shape: shape.to_vec(),
        }
    }
}

fn lookup(values: &ArrayD<f64>, index: &[usize]) -> Option<f64> {
    values.get(IxDyn(index)).copied()
}
