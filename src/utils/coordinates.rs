use crate::utils::constants::LONGITUDE_WRAP_THRESHOLD;
use ndarray::Array2;

/// Map a longitude in [0, 360) onto the continuous [-180, 180] range.
///
/// # Examples
/// ```
/// use sample_diagnostics::utils::wrap_longitude;
///
/// assert_eq!(wrap_longitude(270.0), -90.0);
/// assert_eq!(wrap_longitude(45.0), 45.0);
/// ```
pub fn wrap_longitude(lon: f64) -> f64 {
    if lon > LONGITUDE_WRAP_THRESHOLD {
        lon - 360.0
    } else {
        lon
    }
}

/// Apply [`wrap_longitude`] to every cell of a 2D longitude grid
pub fn wrap_longitudes(lons: &Array2<f64>) -> Array2<f64> {
    lons.mapv(wrap_longitude)
}
