use chrono::NaiveDateTime;
use ndarray::{Array2, ArrayD};
use std::path::Path;

use crate::error::Result;
use crate::models::ProjectionParams;

/// Decoded values of one variable with the valid date of each leading record
#[derive(Debug, Clone, PartialEq)]
pub struct FieldVariable {
    pub values: ArrayD<f64>,
    pub dates: Vec<NaiveDateTime>,
}

/// An opened sample file. Dropping the handle releases the underlying resource.
pub trait FieldFile {
    /// Values of `name`, or `None` when the file does not carry that variable
    fn variable(&self, name: &str) -> Result<Option<FieldVariable>>;

    /// 2D longitude and latitude arrays of the file's grid
    fn coordinates(&self) -> Result<(Array2<f64>, Array2<f64>)>;

    fn projection_params(&self) -> Result<ProjectionParams>;
}

/// Opens sample files of one storage format
pub trait FieldSource {
    fn open(&self, path: &Path) -> Result<Box<dyn FieldFile>>;
}
