use ndarray::{Array2, ArrayD, Axis, Ix2, Ix3};
use std::path::Path;

use crate::error::{ProcessingError, Result};

/// One decoded 2D spatial snapshot of a variable at one timestep
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSample {
    pub values: Array2<f64>,
}

impl FieldSample {
    pub fn new(values: Array2<f64>) -> Self {
        Self { values }
    }

    pub fn shape(&self) -> [usize; 2] {
        let (rows, cols) = self.values.dim();
        [rows, cols]
    }

    /// Arithmetic mean over the cells where `mask` is true.
    ///
    /// Returns `None` when the mask selects no cell.
    pub fn masked_mean(&self, mask: &Array2<bool>) -> Option<f64> {
        let (sum, count) = self
            .values
            .iter()
            .zip(mask.iter())
            .filter(|(_, selected)| **selected)
            .fold((0.0, 0usize), |(sum, count), (&v, _)| (sum + v, count + 1));

        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }
}

/// Remove length-1 axes that precede the two spatial axes.
///
/// A `(1, 1, ny, nx)` record collapses to `(ny, nx)`; spatial axes are kept even when they have length 1.
pub fn squeeze_leading(values: ArrayD<f64>) -> ArrayD<f64> {
    let mut values = values;
    let mut axis = 0;
    while values.ndim() > 2 && axis < values.ndim() - 2 {
        if values.len_of(Axis(axis)) == 1 {
            values = values.index_axis_move(Axis(axis), 0);
        } else {
            axis += 1;
        }
    }
    values
}

/// Split a decoded variable into 2D samples.
///
/// Rank 2 `(y, x)` gives one sample, rank 3 `(t, y, x)` gives one sample per leading index.
/// Any other rank after squeezing is an error naming the file and the shape.
pub fn normalize_field(values: ArrayD<f64>, path: &Path) -> Result<Vec<FieldSample>> {
    let original_shape = values.shape().to_vec();
    let values = squeeze_leading(values);

    match values.ndim() {
        2 => {
            let field = values
                .into_dimensionality::<Ix2>()
                .map_err(|_| unsupported(path, &original_shape))?;
            Ok(vec![FieldSample::new(field)])
        }
        3 => {
            let stack = values
                .into_dimensionality::<Ix3>()
                .map_err(|_| unsupported(path, &original_shape))?;
            Ok(stack
                .outer_iter()
                .map(|field| FieldSample::new(field.to_owned()))
                .collect())
        }
        _ => Err(unsupported(path, &original_shape)),
    }
}

fn unsupported(path: &Path, shape: &[usize]) -> ProcessingError {
    ProcessingError::UnsupportedRank {
        path: path.to_path_buf(),
        shape: shape.to_vec(),
    }
}
