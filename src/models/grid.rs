use ndarray::Array2;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{ProcessingError, Result};
use crate::masking::OceanMasker;
use crate::readers::FieldFile;
use crate::utils::coordinates::wrap_longitudes;

/// Projection parameters of the grid (e.g. rotated-pole coordinates)
pub type ProjectionParams = BTreeMap<String, f64>;

/// Grid geometry and land mask shared by every field of one run
#[derive(Debug, Clone, PartialEq)]
pub struct GridContext {
    pub longitudes: Array2<f64>,
    pub latitudes: Array2<f64>,
    pub projection_params: ProjectionParams,
    pub land_mask: Array2<bool>,
}

impl GridContext {
    /// Build the context from the coordinates of a file that just yielded a field.
    ///
    /// Any failure here is fatal for the run: there is no fallback geometry.
    pub fn derive(file: &dyn FieldFile, path: &Path, masker: &dyn OceanMasker) -> Result<Self> {
        let derivation_error = |reason: String| ProcessingError::GridDerivation {
            path: path.to_path_buf(),
            reason,
        };

        let (longitudes, latitudes) = file
            .coordinates()
            .map_err(|e| derivation_error(format!("coordinates unreadable: {}", e)))?;
        let projection_params = file
            .projection_params()
            .map_err(|e| derivation_error(format!("projection parameters unreadable: {}", e)))?;

        if longitudes.dim() != latitudes.dim() {
            return Err(derivation_error(format!(
                "longitude grid {:?} and latitude grid {:?} differ in shape",
                longitudes.dim(),
                latitudes.dim()
            )));
        }

        let ocean = masker
            .ocean_mask(&wrap_longitudes(&longitudes), &latitudes, &projection_params)
            .map_err(|e| derivation_error(format!("land mask derivation failed: {}", e)))?;
        if ocean.dim() != longitudes.dim() {
            return Err(derivation_error(format!(
                "ocean mask shape {:?} does not match grid {:?}",
                ocean.dim(),
                longitudes.dim()
            )));
        }
        let land_mask = ocean.mapv(|is_ocean| !is_ocean);

        Ok(Self {
            longitudes,
            latitudes,
            projection_params,
            land_mask,
        })
    }

    pub fn shape(&self) -> [usize; 2] {
        let (rows, cols) = self.land_mask.dim();
        [rows, cols]
    }

    pub fn land_cell_count(&self) -> usize {
        self.land_mask.iter().filter(|&&land| land).count()
    }
}

/// One-shot holder for the run's [`GridContext`]
#[derive(Debug, Default)]
pub struct GridSlot {
    context: Option<GridContext>,
}

impl GridSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_derived(&self) -> bool {
        self.context.is_some()
    }

    pub fn get(&self) -> Option<&GridContext> {
        self.context.as_ref()
    }

    /// Derive the context on first call; later calls return the memoized value untouched.
    pub fn get_or_derive(
        &mut self,
        file: &dyn FieldFile,
        path: &Path,
        masker: &dyn OceanMasker,
    ) -> Result<&GridContext> {
        if self.context.is_none() {
            let context = GridContext::derive(file, path, masker)?;
            info!(
                "Derived grid {:?} with {} land cells from {}",
                context.shape(),
                context.land_cell_count(),
                path.display()
            );
            if context.land_cell_count() == 0 {
                warn!("Land mask selects no cell; area averages will be absent");
            }
            self.context = Some(context);
        } else {
            debug!("Reusing grid context for {}", path.display());
        }

        self.context.as_ref().ok_or_else(|| {
            ProcessingError::MissingData("grid context missing after derivation".to_string())
        })
    }

    pub fn reset(&mut self) {
        self.context = None;
    }
}
