use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::ProjectionParams;

/// Classifies grid cells as ocean from their geographic coordinates.
///
/// Longitudes passed in are already continuous, in [-180, 180].
pub trait OceanMasker {
    /// `true` marks an ocean cell; the result has the shape of `lons`
    fn ocean_mask(
        &self,
        lons: &Array2<f64>,
        lats: &Array2<f64>,
        projection: &ProjectionParams,
    ) -> Result<Array2<bool>>;
}

/// A lon/lat box considered land
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LandRegion {
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon_min: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lon_max: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat_min: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat_max: f64,
}

impl LandRegion {
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.lon_min && lon <= self.lon_max && lat >= self.lat_min && lat <= self.lat_max
    }

    /// Range checks plus ordering of the bounds
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        if self.lon_min > self.lon_max || self.lat_min > self.lat_max {
            return Err(ProcessingError::Config(format!(
                "Land region bounds are inverted: lon [{}, {}], lat [{}, {}]",
                self.lon_min, self.lon_max, self.lat_min, self.lat_max
            )));
        }
        Ok(())
    }
}

/// Everything outside the configured land boxes is ocean
#[derive(Debug, Clone, Default)]
pub struct RegionOceanMasker {
    regions: Vec<LandRegion>,
}

impl RegionOceanMasker {
    pub fn new(regions: Vec<LandRegion>) -> Self {
        Self { regions }
    }

    pub fn regions(&self) -> &[LandRegion] {
        &self.regions
    }
}

impl OceanMasker for RegionOceanMasker {
    fn ocean_mask(
        &self,
        lons: &Array2<f64>,
        lats: &Array2<f64>,
        _projection: &ProjectionParams,
    ) -> Result<Array2<bool>> {
        if lons.dim() != lats.dim() {
            let (lr, lc) = lons.dim();
            let (ar, ac) = lats.dim();
            return Err(ProcessingError::ShapeMismatch {
                context: "ocean mask coordinates".to_string(),
                expected: vec![lr, lc],
                actual: vec![ar, ac],
            });
        }

        Ok(Zip::from(lons)
            .and(lats)
            .map_collect(|&lon, &lat| !self.regions.iter().any(|r| r.contains(lon, lat))))
    }
}
