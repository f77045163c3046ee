use chrono::NaiveDate;
use ndarray::Array2;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::TimeSeries;
use crate::processors::{DiagnosticsSink, RunOutput, RunSpec};
use crate::utils::constants::{CONTOUR_LEVELS, PANEL_MARGIN, PANEL_SIZE};
use crate::utils::filename::{
    default_diagnostics_dir, diagnostics_image_filename, mean_field_csv_filename,
    series_csv_filename,
};
use crate::writers::chart::{heat_map, line_chart, no_data_panel, side_by_side, ColorScale};

#[derive(Debug, Serialize)]
struct SeriesRow {
    date: NaiveDate,
    value: f64,
}

/// Writes the image and CSV products of each run
#[derive(Debug, Clone)]
pub struct DiagnosticsWriter {
    output_dir: Option<PathBuf>,
    panel_size: u32,
    levels: usize,
}

impl DiagnosticsWriter {
    pub fn new() -> Self {
        Self {
            output_dir: None,
            panel_size: PANEL_SIZE,
            levels: CONTOUR_LEVELS,
        }
    }

    /// Send every run's products to `dir` instead of the archive's `diag_plots` sibling
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_panel_size(mut self, size: u32) -> Self {
        self.panel_size = size.max(2 * PANEL_MARGIN + 2);
        self
    }

    pub fn output_dir_for(&self, spec: &RunSpec) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => default_diagnostics_dir(&spec.source_root),
        }
    }

    /// Mean field as a headerless grid, one CSV row per field row
    pub fn write_mean_field_csv(&self, field: &Array2<f64>, path: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        for row in field.rows() {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_series_csv(&self, series: &TimeSeries, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for (date, value) in series.iter() {
            writer.serialize(SeriesRow { date, value })?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Two panels: the mean field heat map and the time series chart
    pub fn write_image(&self, output: &RunOutput, path: &Path) -> Result<()> {
        let size = self.panel_size;
        let scale = output
            .mean_field
            .as_ref()
            .and_then(|field| ColorScale::spanning(field.iter(), self.levels));
        let field_panel = match (&output.mean_field, scale) {
            (Some(field), Some(scale)) => heat_map(field, &scale, size, size),
            _ => no_data_panel(size, size),
        };

        let points = series_points(&output.time_series);
        let series_panel = line_chart(&points, size, size, PANEL_MARGIN);

        side_by_side(&[field_panel, series_panel])?.save(path)?;
        Ok(())
    }
}

impl Default for DiagnosticsWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticsSink for DiagnosticsWriter {
    fn render(&mut self, spec: &RunSpec, output: &RunOutput) -> Result<()> {
        let dir = self.output_dir_for(spec);
        fs::create_dir_all(&dir)?;

        match &output.mean_field {
            Some(field) => self.write_mean_field_csv(
                field,
                &dir.join(mean_field_csv_filename(&spec.variable, &spec.label)),
            )?,
            None => warn!(
                "No climatology samples for {} in '{}'; mean field left blank",
                spec.variable, spec.label
            ),
        }
        self.write_series_csv(
            &output.time_series,
            &dir.join(series_csv_filename(&spec.variable, &spec.label)),
        )?;

        let image_path = dir.join(diagnostics_image_filename(&spec.variable, &spec.label));
        self.write_image(output, &image_path)?;
        info!("Saved diagnostics to {}", image_path.display());
        Ok(())
    }
}

/// Days since the first entry against value
fn series_points(series: &TimeSeries) -> Vec<(f64, f64)> {
    let mut iter = series.iter().peekable();
    let Some(&(origin, _)) = iter.peek() else {
        return Vec::new();
    };
    iter.map(|(date, value)| ((date - origin).num_days() as f64, value))
        .collect()
}
