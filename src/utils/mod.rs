pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use coordinates::{wrap_longitude, wrap_longitudes};
pub use filename::{
    default_diagnostics_dir, diagnostics_image_filename, mean_field_csv_filename,
    point_series_csv_path, point_series_stem, series_csv_filename,
};
pub use progress::ProgressReporter;
