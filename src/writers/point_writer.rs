use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::models::PointSeries;
use crate::utils::constants::{PANEL_MARGIN, PANEL_SIZE};
use crate::utils::filename::{point_series_csv_path, point_series_stem};
use crate::writers::chart::line_chart;

#[derive(Debug, Serialize)]
struct PointRow {
    date: NaiveDateTime,
    value: f64,
}

/// Writes a point series as raw CSV under `selected_data/` plus a line chart
pub struct PointSeriesWriter {
    output_dir: PathBuf,
    width: u32,
    height: u32,
}

impl PointSeriesWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            width: 2 * PANEL_SIZE,
            height: PANEL_SIZE,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(2 * PANEL_MARGIN + 2);
        self.height = height.max(2 * PANEL_MARGIN + 2);
        self
    }

    /// Returns the CSV and image paths that were written
    pub fn write(
        &self,
        variable: &str,
        ix: usize,
        iy: usize,
        series: &PointSeries,
    ) -> Result<(PathBuf, PathBuf)> {
        let csv_path = point_series_csv_path(&self.output_dir, variable, ix, iy);
        if let Some(parent) = csv_path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.write_csv(series, &csv_path)?;

        let image_path = self
            .output_dir
            .join(format!("{}.png", point_series_stem(variable, ix, iy)));
        let points: Vec<(f64, f64)> = match series.iter().next() {
            Some((origin, _)) => series
                .iter()
                .map(|(date, value)| ((date - origin).num_seconds() as f64 / 86_400.0, value))
                .collect(),
            None => Vec::new(),
        };
        line_chart(&points, self.width, self.height, PANEL_MARGIN).save(&image_path)?;

        info!(
            "Saved {} values to {} and {}",
            series.len(),
            csv_path.display(),
            image_path.display()
        );
        Ok((csv_path, image_path))
    }

    fn write_csv(&self, series: &PointSeries, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for (date, value) in series.iter() {
            writer.serialize(PointRow { date, value })?;
        }
        writer.flush()?;
        Ok(())
    }
}
