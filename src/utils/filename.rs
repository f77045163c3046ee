use std::path::{Path, PathBuf};

use crate::utils::constants::{DIAG_PLOTS_DIR, SELECTED_DATA_DIR};

/// Directory receiving diagnostics for a sample archive: a `diag_plots` sibling of the archive root
pub fn default_diagnostics_dir(source_root: &Path) -> PathBuf {
    source_root
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(DIAG_PLOTS_DIR)
}

/// Image file name with format: {variable}_{label}.png
pub fn diagnostics_image_filename(variable: &str, label: &str) -> String {
    format!("{}_{}.png", variable, label)
}

/// Time series file name with format: {variable}_{label}_series.csv
pub fn series_csv_filename(variable: &str, label: &str) -> String {
    format!("{}_{}_series.csv", variable, label)
}

/// Mean field file name with format: {variable}_{label}_mean.csv
pub fn mean_field_csv_filename(variable: &str, label: &str) -> String {
    format!("{}_{}_mean.csv", variable, label)
}

/// Base name for a point series: {variable}_{ix}_{iy}
pub fn point_series_stem(variable: &str, ix: usize, iy: usize) -> String {
    format!("{}_{}_{}", variable, ix, iy)
}

/// Location of the raw values of a point series under `output_dir/selected_data`
pub fn point_series_csv_path(output_dir: &Path, variable: &str, ix: usize, iy: usize) -> PathBuf {
    output_dir
        .join(SELECTED_DATA_DIR)
        .join(format!("{}.csv", point_series_stem(variable, ix, iy)))
}
